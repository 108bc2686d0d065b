// bicflow-core/src/domain/record.rs

use crate::domain::numeric::NormalizedFeatures;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parsed upload: a header row plus data rows, cells kept as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The six churn metrics of a change, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChurnMetric {
    LinesAdded,
    LinesDeleted,
    FilesTouched,
    DirectoriesTouched,
    SubsystemsTouched,
    Entropy,
}

impl ChurnMetric {
    pub const ALL: [ChurnMetric; 6] = [
        ChurnMetric::LinesAdded,
        ChurnMetric::LinesDeleted,
        ChurnMetric::FilesTouched,
        ChurnMetric::DirectoriesTouched,
        ChurnMetric::SubsystemsTouched,
        ChurnMetric::Entropy,
    ];

    /// Canonical column name (`la`, `ld`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinesAdded => "la",
            Self::LinesDeleted => "ld",
            Self::FilesTouched => "nf",
            Self::DirectoriesTouched => "nd",
            Self::SubsystemsTouched => "ns",
            Self::Entropy => "ent",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::LinesAdded => 0,
            Self::LinesDeleted => 1,
            Self::FilesTouched => 2,
            Self::DirectoriesTouched => 3,
            Self::SubsystemsTouched => 4,
            Self::Entropy => 5,
        }
    }
}

impl fmt::Display for ChurnMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Churn metrics after coercion. `None` marks a missing or unparseable cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChurnMetrics {
    pub la: Option<f64>,
    pub ld: Option<f64>,
    pub nf: Option<f64>,
    pub nd: Option<f64>,
    pub ns: Option<f64>,
    pub ent: Option<f64>,
}

impl ChurnMetrics {
    pub fn get(&self, metric: ChurnMetric) -> Option<f64> {
        match metric {
            ChurnMetric::LinesAdded => self.la,
            ChurnMetric::LinesDeleted => self.ld,
            ChurnMetric::FilesTouched => self.nf,
            ChurnMetric::DirectoriesTouched => self.nd,
            ChurnMetric::SubsystemsTouched => self.ns,
            ChurnMetric::Entropy => self.ent,
        }
    }

    pub fn set(&mut self, metric: ChurnMetric, value: Option<f64>) {
        let slot = match metric {
            ChurnMetric::LinesAdded => &mut self.la,
            ChurnMetric::LinesDeleted => &mut self.ld,
            ChurnMetric::FilesTouched => &mut self.nf,
            ChurnMetric::DirectoriesTouched => &mut self.nd,
            ChurnMetric::SubsystemsTouched => &mut self.ns,
            ChurnMetric::Entropy => &mut self.ent,
        };
        *slot = value;
    }

    /// Value used for scaling: missing counts as 0.
    pub fn value_or_zero(&self, metric: ChurnMetric) -> f64 {
        self.get(metric).unwrap_or(0.0)
    }
}

/// One upload row after type coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    pub title: String,
    pub description: String,
    pub change_message: String,
    pub metrics: ChurnMetrics,
    pub is_reviewed: bool,
    pub is_self_authored: bool,
    pub label: Option<String>,
}

/// Store-generated identifier of a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What was submitted, as owned by the store once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPersistedRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub record: ValidatedRecord,
}

/// Feature representation paired one-to-one with a raw record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatureRecord {
    pub clean_text: String,
    pub la_norm: f64,
    pub ld_norm: f64,
    pub nf_norm: f64,
    pub nd_norm: f64,
    pub ns_norm: f64,
    pub ent_norm: f64,
    pub is_reviewed_norm: u8,
    pub is_self_authored_norm: u8,
    pub label: Option<String>,
}

impl DerivedFeatureRecord {
    pub fn assemble(
        clean_text: String,
        features: &NormalizedFeatures,
        label: Option<String>,
    ) -> Self {
        let m = &features.metrics;
        Self {
            clean_text,
            la_norm: m[ChurnMetric::LinesAdded.index()],
            ld_norm: m[ChurnMetric::LinesDeleted.index()],
            nf_norm: m[ChurnMetric::FilesTouched.index()],
            nd_norm: m[ChurnMetric::DirectoriesTouched.index()],
            ns_norm: m[ChurnMetric::SubsystemsTouched.index()],
            ent_norm: m[ChurnMetric::Entropy.index()],
            is_reviewed_norm: features.is_reviewed,
            is_self_authored_norm: features.is_self_authored,
            label,
        }
    }

    pub fn metric_norm(&self, metric: ChurnMetric) -> f64 {
        match metric {
            ChurnMetric::LinesAdded => self.la_norm,
            ChurnMetric::LinesDeleted => self.ld_norm,
            ChurnMetric::FilesTouched => self.nf_norm,
            ChurnMetric::DirectoriesTouched => self.nd_norm,
            ChurnMetric::SubsystemsTouched => self.ns_norm,
            ChurnMetric::Entropy => self.ent_norm,
        }
    }
}
