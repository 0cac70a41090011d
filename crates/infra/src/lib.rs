//! Infrastructure layer: stores (in-memory and Postgres) and the application
//! services built on top of them.

pub mod services;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use services::{ServiceError, Services};
pub use store::{InMemoryStore, PostgresStore, StoreError, Stores};
