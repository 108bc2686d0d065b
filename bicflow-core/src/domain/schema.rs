// bicflow-core/src/domain/schema.rs

use crate::domain::configuration::ColumnMapping;
use crate::domain::error::DomainError;
use crate::domain::record::{ChurnMetric, ChurnMetrics, RawTable, ValidatedRecord};
use tracing::{debug, instrument};

/// Positions of the pipeline columns inside an upload header.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIndex {
    pub title: usize,
    pub description: usize,
    pub change_message: usize,
    pub metrics: [usize; 6],
    pub is_reviewed: usize,
    pub is_self_authored: usize,
    pub label: Option<usize>,
}

pub struct SchemaValidator<'a> {
    columns: &'a ColumnMapping,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(columns: &'a ColumnMapping) -> Self {
        Self { columns }
    }

    /// Locates every required column. Fails with the full list of absent ones.
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnIndex, DomainError> {
        let normalized: Vec<&str> = headers.iter().map(|h| clean_header(h)).collect();
        let position = |name: &str| normalized.iter().position(|h| *h == name);

        let missing: Vec<String> = self
            .columns
            .required()
            .into_iter()
            .filter(|name| position(*name).is_none())
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            return Err(DomainError::Schema { missing });
        }

        // Every lookup below succeeded in the check above.
        let find = |name: &str| position(name).unwrap_or_default();

        let mut metrics = [0usize; 6];
        for metric in ChurnMetric::ALL {
            metrics[metric.index()] = find(self.columns.metric(metric));
        }

        Ok(ColumnIndex {
            title: find(self.columns.title.as_str()),
            description: find(self.columns.description.as_str()),
            change_message: find(self.columns.change_message.as_str()),
            metrics,
            is_reviewed: find(self.columns.is_reviewed.as_str()),
            is_self_authored: find(self.columns.is_self_authored.as_str()),
            label: position(self.columns.label.as_str()),
        })
    }

    /// Checks the header, then coerces every row. Extra columns are ignored.
    #[instrument(skip_all, fields(rows = table.len()))]
    pub fn validate(&self, table: &RawTable) -> Result<Vec<ValidatedRecord>, DomainError> {
        let index = self.resolve(&table.headers)?;
        self.check_numeric_columns(table, &index)?;

        let records: Vec<ValidatedRecord> = table
            .rows
            .iter()
            .map(|row| coerce_row(row, &index))
            .collect();

        debug!(records = records.len(), "Upload validated");
        Ok(records)
    }

    // A column fails as a whole only when it has content and none of it parses.
    fn check_numeric_columns(
        &self,
        table: &RawTable,
        index: &ColumnIndex,
    ) -> Result<(), DomainError> {
        let mut failing = Vec::new();

        for metric in ChurnMetric::ALL {
            let col = index.metrics[metric.index()];
            let mut present = 0usize;
            let mut parsed = 0usize;
            for row in &table.rows {
                let raw = cell(row, col);
                if is_missing(raw) {
                    continue;
                }
                present += 1;
                if parse_numeric(raw).is_some() {
                    parsed += 1;
                }
            }
            if present > 0 && parsed == 0 {
                failing.push(self.columns.metric(metric).to_string());
            }
        }

        if failing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Coercion { columns: failing })
        }
    }
}

fn coerce_row(row: &[String], index: &ColumnIndex) -> ValidatedRecord {
    let mut metrics = ChurnMetrics::default();
    for metric in ChurnMetric::ALL {
        metrics.set(metric, parse_numeric(cell(row, index.metrics[metric.index()])));
    }

    let label = index
        .label
        .map(|col| cell(row, col))
        .filter(|raw| !is_missing(raw))
        .map(str::to_string);

    ValidatedRecord {
        title: cell(row, index.title).to_string(),
        description: cell(row, index.description).to_string(),
        change_message: cell(row, index.change_message).to_string(),
        metrics,
        is_reviewed: parse_truthy(cell(row, index.is_reviewed)),
        is_self_authored: parse_truthy(cell(row, index.is_self_authored)),
        label,
    }
}

fn clean_header(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

fn is_missing(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Numeric cell coercion. Unparseable and non-finite values are missing.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// `"true"` and `"1"` (any case, surrounding blanks ignored) are true.
pub fn parse_truthy(raw: &str) -> bool {
    let value = raw.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const HEADER: [&str; 11] = [
        "title",
        "description",
        "change_message",
        "la",
        "ld",
        "nf",
        "nd",
        "ns",
        "ent",
        "is_reviewed",
        "is_self_authored",
    ];

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_missing_columns_are_all_named() {
        let columns = ColumnMapping::default();
        let validator = SchemaValidator::new(&columns);
        let t = table(&["title", "la", "ld", "nf", "ns"], &[]);

        let err = validator.validate(&t).unwrap_err();
        match err {
            DomainError::Schema { missing } => {
                assert_eq!(
                    missing,
                    vec![
                        "description",
                        "change_message",
                        "nd",
                        "ent",
                        "is_reviewed",
                        "is_self_authored"
                    ]
                );
            }
            other => panic!("Expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_extra_columns_ignored_and_text_kept() {
        let columns = ColumnMapping::default();
        let validator = SchemaValidator::new(&columns);
        let mut headers = vec!["commit_hash"];
        headers.extend(HEADER);
        let t = table(
            &headers,
            &[&[
                "abc123", "Fix crash", "Null check", "Guard parser", "10", "2", "1", "1", "1",
                "0.5", "TRUE", "0",
            ]],
        );

        let records = validator.validate(&t).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title, "Fix crash");
        assert_eq!(r.change_message, "Guard parser");
        assert_eq!(r.metrics.la, Some(10.0));
        assert_eq!(r.metrics.ent, Some(0.5));
        assert!(r.is_reviewed);
        assert!(!r.is_self_authored);
        assert_eq!(r.label, None);
    }

    #[test]
    fn test_cell_level_anomalies_resolve_to_defaults() {
        let columns = ColumnMapping::default();
        let validator = SchemaValidator::new(&columns);
        let mut headers = HEADER.to_vec();
        headers.push("label");
        let t = table(
            &headers,
            &[
                &["a", "", "", "n/a", "3", "", "1", "1", "1", "yes", "", "1"],
                &["b", "", "", "7", "3", "2", "1", "1", "NaN", "1", "True", ""],
            ],
        );

        let records = validator.validate(&t).unwrap();
        assert_eq!(records[0].metrics.la, None);
        assert_eq!(records[0].metrics.nf, None);
        assert!(!records[0].is_reviewed);
        assert!(!records[0].is_self_authored);
        assert_eq!(records[0].label.as_deref(), Some("1"));
        assert_eq!(records[0].description, "");

        assert_eq!(records[1].metrics.la, Some(7.0));
        assert_eq!(records[1].metrics.ent, None);
        assert!(records[1].is_reviewed);
        assert!(records[1].is_self_authored);
        assert_eq!(records[1].label, None);
    }

    #[test]
    fn test_uncoercible_column_is_rejected() {
        let columns = ColumnMapping::default();
        let validator = SchemaValidator::new(&columns);
        let t = table(
            &HEADER,
            &[
                &["a", "", "", "ten", "1", "1", "1", "1", "x", "0", "0"],
                &["b", "", "", "twenty", "2", "1", "1", "1", "", "0", "0"],
            ],
        );

        match validator.validate(&t).unwrap_err() {
            DomainError::Coercion { columns } => assert_eq!(columns, vec!["la", "ent"]),
            other => panic!("Expected coercion error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_numeric_column_is_accepted() {
        let columns = ColumnMapping::default();
        let validator = SchemaValidator::new(&columns);
        let t = table(&HEADER, &[&["a", "", "", "", "", "", "", "", "", "", ""]]);
        let records = validator.validate(&t).unwrap();
        assert_eq!(records[0].metrics, ChurnMetrics::default());
    }

    #[test]
    fn test_mapped_legacy_headers() {
        let columns = ColumnMapping {
            change_message: "BFC_message".into(),
            is_reviewed: "revd".into(),
            is_self_authored: "self".into(),
            label: "BIC".into(),
            ..ColumnMapping::default()
        };
        let validator = SchemaValidator::new(&columns);
        let t = table(
            &[
                "\u{feff}title",
                "description",
                " BFC_message ",
                "la",
                "ld",
                "nf",
                "nd",
                "ns",
                "ent",
                "revd",
                "self",
                "BIC",
            ],
            &[&["t", "d", "m", "1", "1", "1", "1", "1", "1", "true", "false", "0"]],
        );
        let records = validator.validate(&t).unwrap();
        assert_eq!(records[0].change_message, "m");
        assert!(records[0].is_reviewed);
        assert_eq!(records[0].label.as_deref(), Some("0"));
    }

    #[test]
    fn test_truthy_rule() {
        assert!(parse_truthy("true"));
        assert!(parse_truthy(" TRUE "));
        assert!(parse_truthy("1"));
        assert!(!parse_truthy("yes"));
        assert!(!parse_truthy("1.0"));
        assert!(!parse_truthy(""));
    }

    #[test]
    fn test_numeric_rule() {
        assert_eq!(parse_numeric(" 12.5 "), Some(12.5));
        assert_eq!(parse_numeric("-3"), Some(-3.0));
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("abc"), None);
    }
}
