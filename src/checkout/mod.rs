//! Cart-to-order conversion.
//!
//! [`snapshot`] reads the cart, [`pricing`] and [`coupon`] compute amounts,
//! [`splitter`] groups lines per seller, and [`transaction`] with [`stock`]
//! writes the orders and reserves inventory inside one database transaction.

pub mod coupon;
pub mod pricing;
pub mod snapshot;
pub mod splitter;
pub mod stock;
pub mod transaction;
