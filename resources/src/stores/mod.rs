//! Production provider implementations.

pub mod postgres;

pub use postgres::PgPlatform;
