//! Cart commands.

use std::future::Future;

use anyhow::Result;
use serde_json::json;
use tokio::sync::broadcast::Receiver;
use turbo_cart::{Cart, CartError, CartStore, Notification};

use super::{AddArgs, RemoveArgs, UpdateArgs};
use crate::context::Context;
use crate::output::{format_price, Output};

const WIDTHS: [usize; 5] = [6, 36, 10, 6, 10];

/// Print the saved cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    print_cart(&ctx.output, &store.cart());
    Ok(())
}

/// Add one unit of a product.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let id = args.id;
    apply(ctx, &store, store.add_product(id), &format!("Added product {}", id)).await
}

/// Remove a product.
pub async fn remove(args: RemoveArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let id = args.id;
    apply(ctx, &store, store.remove_product(id), &format!("Removed product {}", id)).await
}

/// Set the amount of a product.
pub async fn update(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    if args.amount <= 0 {
        ctx.output
            .warn(&format!("Amount {} ignored, cart unchanged", args.amount));
        print_cart(&ctx.output, &store.cart());
        return Ok(());
    }
    let done = format!("Set product {} to {}", args.id, args.amount);
    apply(ctx, &store, store.update_product_amount(args.id, args.amount), &done).await
}

/// Empty the cart.
pub async fn clear(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    apply(ctx, &store, store.clear(), "Cart cleared").await
}

/// Run one store operation, surface its notifications and print the result.
async fn apply<F>(ctx: &Context, store: &CartStore, op: F, done: &str) -> Result<()>
where
    F: Future<Output = Result<(), CartError>>,
{
    let mut notes = store.notifications();
    let result = op.await;

    for note in drain(&mut notes) {
        ctx.output.warn(&note.to_string());
    }
    result?;

    ctx.output.success(done);
    print_cart(&ctx.output, &store.cart());
    Ok(())
}

fn drain(notes: &mut Receiver<Notification>) -> Vec<Notification> {
    let mut drained = Vec::new();
    while let Ok(note) = notes.try_recv() {
        drained.push(note);
    }
    drained
}

fn total(cart: &Cart) -> f64 {
    cart.iter().map(|item| item.subtotal()).sum()
}

fn print_cart(output: &Output, cart: &Cart) {
    if output.is_json() {
        output.json(&json!({
            "items": cart,
            "item_count": cart.item_count(),
            "total": total(cart),
        }));
        return;
    }

    output.header("Cart");
    if cart.is_empty() {
        output.info("Your cart is empty");
        return;
    }

    output.table_row(&["ID", "PRODUCT", "PRICE", "QTY", "SUBTOTAL"], &WIDTHS);
    for item in cart.iter() {
        let id = item.id.to_string();
        let price = format_price(item.price);
        let amount = item.amount.to_string();
        let subtotal = format_price(item.subtotal());
        output.table_row(
            &[
                id.as_str(),
                item.title.as_str(),
                price.as_str(),
                amount.as_str(),
                subtotal.as_str(),
            ],
            &WIDTHS,
        );
    }
    output.kv("items", &cart.item_count().to_string());
    output.kv("total", &format_price(total(cart)));
}
