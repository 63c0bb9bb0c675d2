//! In-memory provider implementations for testing and demos.
//!
//! [`MemoryPlatform`] stands in for the whole hosted persistence platform:
//! one value implements every provider trait over shared in-memory tables,
//! so the reaction counter, bookmark rows, catalog, and comments all see the
//! same data, just as they would against the real backend. Failure switches
//! let tests exercise the rollback and compensation paths.

mod identity;
mod platform;

pub use identity::StaticIdentity;
pub use platform::MemoryPlatform;
