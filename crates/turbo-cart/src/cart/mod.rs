//! Shopping cart module.
//!
//! Contains the cart and line item types.

mod cart;

pub use cart::{Cart, LineItem};
