// bicflow-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum BicflowError {
    // --- DOMAIN ERRORS (Schema, Coercion, Config rules) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (Parsing, IO, Storage) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- PERSISTENCE (raised by the orchestrator, after rollback) ---
    #[error("Persistence failed at row {row} ({committed_rows} rows committed): {message}")]
    #[diagnostic(
        code(bicflow::pipeline::persistence),
        help("The in-flight transaction was rolled back. Rows reported as committed remain stored.")
    )]
    Persistence {
        row: usize,
        committed_rows: usize,
        message: String,
    },

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

/// Who is at fault for a failed upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    Client,
    Server,
}

impl BicflowError {
    pub fn class(&self) -> ErrorClass {
        match self {
            BicflowError::Domain(DomainError::Schema { .. })
            | BicflowError::Domain(DomainError::Coercion { .. })
            | BicflowError::Infrastructure(InfrastructureError::InputFormat(_))
            | BicflowError::Infrastructure(InfrastructureError::InputNotFound(_)) => {
                ErrorClass::Client
            }
            _ => ErrorClass::Server,
        }
    }
}

impl From<std::io::Error> for BicflowError {
    fn from(err: std::io::Error) -> Self {
        BicflowError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for BicflowError {
    fn from(err: duckdb::Error) -> Self {
        BicflowError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(err)))
    }
}
