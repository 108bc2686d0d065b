// bicflow-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)] // Public docs are not enforced yet

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: contracts of the store and of the predictor.
pub mod ports;

// 2. Domain: schema, text and numeric normalization.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure: DuckDB / in-memory stores, CSV reader, config files.
pub mod infrastructure;

// 4. Application: the ingestion use case.
pub mod application;

pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use application::{IngestPipeline, IngestResponse};
pub use error::{BicflowError, ErrorClass};
