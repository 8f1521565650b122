//! Root crate wiring the A2A messaging fabric's layers into one explicit
//! lifecycle object: [`FabricContext`].
//!
//! Nothing here is a global or a singleton — a process that needs more
//! than one fabric (for tests, or for multi-tenant hosting) constructs
//! more than one `FabricContext`.

pub mod config;
pub mod context;
pub mod error;
pub mod health;

pub use config::{FabricConfig, FabricFileConfig};
pub use context::FabricContext;
pub use error::{FabricError, FabricResult};
