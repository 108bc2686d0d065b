// bicflow-core/src/domain/mod.rs

pub mod configuration;
pub mod error;
pub mod numeric;
pub mod record;
pub mod schema;
pub mod text;

// Re-exports so callers can import from `domain` directly
pub use error::DomainError;
