// bicflow-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB rejected the operation: {0}")]
    #[diagnostic(
        code(bicflow::infra::database::duckdb),
        help("Constraint violations mean a raw/derived pair was incomplete or duplicated; the transaction was rolled back.")
    )]
    DuckDB(#[from] duckdb::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- UPLOAD PARSING ---
    #[error("Invalid CSV file: {0}")]
    #[diagnostic(
        code(bicflow::infra::input_format),
        help("The upload must be a comma-delimited table with a header row.")
    )]
    InputFormat(String),

    #[error("Upload not found: {0}")]
    #[diagnostic(
        code(bicflow::infra::input_missing),
        help("Pass an existing CSV file, or a directory holding CSV files, to --input.")
    )]
    InputNotFound(String),

    // --- STORE ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("Cannot access file: {0}")]
    #[diagnostic(
        code(bicflow::infra::io),
        help("Check that the upload, config and database paths exist and are readable.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("bicflow.yaml is not valid YAML: {0}")]
    #[diagnostic(
        code(bicflow::infra::yaml),
        help("Sections are `columns`, `text` and `persistence`; every key is optional.")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Cannot load configuration: {0}")]
    #[diagnostic(code(bicflow::infra::config))]
    ConfigError(String),

    #[error("Pipeline configuration not found at '{0}'")]
    #[diagnostic(code(bicflow::infra::config_missing))]
    ConfigNotFound(String),
}

// `?` on raw duckdb calls inside the adapters
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<csv::Error> for InfrastructureError {
    fn from(err: csv::Error) -> Self {
        InfrastructureError::InputFormat(err.to_string())
    }
}
