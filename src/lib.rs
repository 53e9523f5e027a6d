//! Multi-vendor checkout service: turns an account's cart into one combined
//! order with a sub-order per seller, reserving stock in the same database
//! transaction.

pub mod audit;
pub mod checkout;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod money;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
