// bicflow-core/src/domain/configuration.rs

use crate::domain::error::DomainError;
use crate::domain::record::ChurnMetric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Everything a pipeline instance needs. Passed by value into the
/// orchestrator; nothing here is global.
#[derive(Debug, Deserialize, Serialize, Validate, Clone, Default)]
pub struct PipelineConfig {
    #[validate(nested)]
    #[serde(default)]
    pub columns: ColumnMapping,

    #[validate(nested)]
    #[serde(default)]
    pub text: TextConfig,

    #[validate(nested)]
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl PipelineConfig {
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))
    }
}

/// Header names of the upload. Defaults are the canonical names; a
/// mapping lets older exports (`BFC_message`, `revd`, `self`, `BIC`) load as is.
#[derive(Debug, Deserialize, Serialize, Validate, Clone, PartialEq)]
pub struct ColumnMapping {
    #[validate(length(min = 1))]
    #[serde(default = "default_title")]
    pub title: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_description")]
    pub description: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_change_message")]
    pub change_message: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_la")]
    pub la: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_ld")]
    pub ld: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_nf")]
    pub nf: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_nd")]
    pub nd: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_ns")]
    pub ns: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_ent")]
    pub ent: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_is_reviewed")]
    pub is_reviewed: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_is_self_authored")]
    pub is_self_authored: String,

    #[validate(length(min = 1))]
    #[serde(default = "default_label")]
    pub label: String,
}

impl ColumnMapping {
    pub fn metric(&self, metric: ChurnMetric) -> &str {
        match metric {
            ChurnMetric::LinesAdded => &self.la,
            ChurnMetric::LinesDeleted => &self.ld,
            ChurnMetric::FilesTouched => &self.nf,
            ChurnMetric::DirectoriesTouched => &self.nd,
            ChurnMetric::SubsystemsTouched => &self.ns,
            ChurnMetric::Entropy => &self.ent,
        }
    }

    /// The eleven required headers, in declaration order. `label` is optional.
    pub fn required(&self) -> Vec<&str> {
        let mut cols = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.change_message.as_str(),
        ];
        cols.extend(ChurnMetric::ALL.iter().map(|m| self.metric(*m)));
        cols.push(self.is_reviewed.as_str());
        cols.push(self.is_self_authored.as_str());
        cols
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            change_message: default_change_message(),
            la: default_la(),
            ld: default_ld(),
            nf: default_nf(),
            nd: default_nd(),
            ns: default_ns(),
            ent: default_ent(),
            is_reviewed: default_is_reviewed(),
            is_self_authored: default_is_self_authored(),
            label: default_label(),
        }
    }
}

fn default_title() -> String {
    "title".to_string()
}
fn default_description() -> String {
    "description".to_string()
}
fn default_change_message() -> String {
    "change_message".to_string()
}
fn default_la() -> String {
    "la".to_string()
}
fn default_ld() -> String {
    "ld".to_string()
}
fn default_nf() -> String {
    "nf".to_string()
}
fn default_nd() -> String {
    "nd".to_string()
}
fn default_ns() -> String {
    "ns".to_string()
}
fn default_ent() -> String {
    "ent".to_string()
}
fn default_is_reviewed() -> String {
    "is_reviewed".to_string()
}
fn default_is_self_authored() -> String {
    "is_self_authored".to_string()
}
fn default_label() -> String {
    "label".to_string()
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, PartialEq)]
pub struct TextConfig {
    /// Token substituted for URL-like tokens.
    #[validate(custom(function = "validate_placeholder"))]
    #[serde(default = "default_url_placeholder")]
    pub url_placeholder: String,

    #[serde(default = "default_true")]
    pub lemmatize: bool,

    /// Replaces the built-in English stop-word list when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_words: Option<Vec<String>>,

    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            url_placeholder: default_url_placeholder(),
            lemmatize: true,
            stop_words: None,
            extra_stop_words: Vec::new(),
        }
    }
}

fn default_url_placeholder() -> String {
    "url".to_string()
}

fn default_true() -> bool {
    true
}

// Anything but lowercase letters would be rewritten by the later stages.
fn validate_placeholder(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("url_placeholder_not_lowercase_word"))
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone, PartialEq)]
pub struct PersistenceConfig {
    /// DuckDB file path, or `:memory:`.
    #[validate(length(min = 1))]
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default)]
    pub commit_policy: CommitPolicy,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            commit_policy: CommitPolicy::default(),
        }
    }
}

fn default_database() -> String {
    "bicflow.duckdb".to_string()
}

/// Transaction boundary used while persisting an upload.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// One transaction per raw/derived pair. Rows committed before a
    /// failing row stay committed.
    #[default]
    PerRow,
    /// One transaction around the whole upload: all rows or none.
    Batch,
}

impl CommitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerRow => "per_row",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommitPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_row" | "row" => Ok(Self::PerRow),
            "batch" => Ok(Self::Batch),
            other => Err(DomainError::InvalidConfig(format!(
                "Unknown commit policy '{}'. Expected one of: per_row, batch.",
                other
            ))),
        }
    }
}
