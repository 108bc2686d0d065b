// bicflow-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Missing columns: {}", format_columns(.missing))]
    #[diagnostic(
        code(bicflow::domain::schema),
        help("The upload header must contain every required column (see `columns` in bicflow.yaml).")
    )]
    Schema { missing: Vec<String> },

    #[error("Columns cannot be read as numbers: {}", format_columns(.columns))]
    #[diagnostic(
        code(bicflow::domain::coercion),
        help("Every non-empty cell of these columns failed to parse. Individual bad cells are tolerated, whole columns are not.")
    )]
    Coercion { columns: Vec<String> },

    #[error("Invalid pipeline configuration: {0}")]
    #[diagnostic(code(bicflow::domain::config))]
    InvalidConfig(String),
}

fn format_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ")
}
