// bicflow-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
pub mod memory;
pub mod placeholder;

pub use self::duckdb::DuckDbGateway;
pub use memory::InMemoryGateway;
pub use placeholder::PlaceholderPredictor;
