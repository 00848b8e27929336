// src/relay/mod.rs
mod products;

pub use products::{ProductsRelay, RelayError, FAILURE_LOG_TAG, FAILURE_MESSAGE};
