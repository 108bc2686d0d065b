// bicflow-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::{Config, Connection, params};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument, warn};

// Hexagonal imports
use crate::domain::record::{DerivedFeatureRecord, RecordId, ValidatedRecord};
use crate::error::BicflowError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::persistence::{PairingReport, PersistenceGateway, Transaction};

const SCHEMA: &str = r#"
CREATE SEQUENCE IF NOT EXISTS raw_records_id_seq START 1;

CREATE TABLE IF NOT EXISTS raw_records (
    id BIGINT PRIMARY KEY DEFAULT nextval('raw_records_id_seq'),
    title VARCHAR NOT NULL,
    description VARCHAR NOT NULL,
    change_message VARCHAR NOT NULL,
    la DOUBLE,
    ld DOUBLE,
    nf DOUBLE,
    nd DOUBLE,
    ns DOUBLE,
    ent DOUBLE,
    is_reviewed BOOLEAN NOT NULL,
    is_self_authored BOOLEAN NOT NULL,
    label VARCHAR,
    created_at TIMESTAMPTZ NOT NULL DEFAULT current_timestamp
);

CREATE TABLE IF NOT EXISTS derived_features (
    raw_id BIGINT NOT NULL UNIQUE REFERENCES raw_records(id),
    clean_text VARCHAR NOT NULL,
    la_norm DOUBLE NOT NULL CHECK (la_norm BETWEEN 0 AND 1),
    ld_norm DOUBLE NOT NULL CHECK (ld_norm BETWEEN 0 AND 1),
    nf_norm DOUBLE NOT NULL CHECK (nf_norm BETWEEN 0 AND 1),
    nd_norm DOUBLE NOT NULL CHECK (nd_norm BETWEEN 0 AND 1),
    ns_norm DOUBLE NOT NULL CHECK (ns_norm BETWEEN 0 AND 1),
    ent_norm DOUBLE NOT NULL CHECK (ent_norm BETWEEN 0 AND 1),
    is_reviewed_norm INTEGER NOT NULL CHECK (is_reviewed_norm IN (0, 1)),
    is_self_authored_norm INTEGER NOT NULL CHECK (is_self_authored_norm IN (0, 1)),
    label VARCHAR,
    created_at TIMESTAMPTZ NOT NULL DEFAULT current_timestamp
);
"#;

/// Derived row read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFeatures {
    pub raw_id: RecordId,
    pub features: DerivedFeatureRecord,
}

/// DuckDB-backed gateway. The connection sits behind an async mutex; an open
/// transaction owns the lock, so units of work never interleave.
pub struct DuckDbGateway {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbGateway {
    /// Opens (or creates) the database and makes sure both tables exist.
    pub fn open(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };
        conn.execute_batch(SCHEMA)?;
        debug!(path = db_path, "DuckDB store ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn pairing_report(&self) -> Result<PairingReport, BicflowError> {
        let conn = self.conn.lock().await;
        let count = |sql: &str| -> Result<u64, BicflowError> {
            let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
            Ok(u64::try_from(n).unwrap_or_default())
        };

        Ok(PairingReport {
            raw_records: count("SELECT count(*) FROM raw_records")?,
            derived_records: count("SELECT count(*) FROM derived_features")?,
            orphan_raw: count(
                "SELECT count(*) FROM raw_records r \
                 LEFT JOIN derived_features d ON d.raw_id = r.id WHERE d.raw_id IS NULL",
            )?,
            orphan_derived: count(
                "SELECT count(*) FROM derived_features d \
                 LEFT JOIN raw_records r ON r.id = d.raw_id WHERE r.id IS NULL",
            )?,
        })
    }

    /// Latest derived rows, newest first.
    pub async fn sample_features(&self, limit: usize) -> Result<Vec<StoredFeatures>, BicflowError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT raw_id, clean_text, la_norm, ld_norm, nf_norm, nd_norm, ns_norm, ent_norm, \
             is_reviewed_norm, is_self_authored_norm, label \
             FROM derived_features ORDER BY raw_id DESC LIMIT ?",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok(StoredFeatures {
                raw_id: RecordId(row.get(0)?),
                features: DerivedFeatureRecord {
                    clean_text: row.get(1)?,
                    la_norm: row.get(2)?,
                    ld_norm: row.get(3)?,
                    nf_norm: row.get(4)?,
                    nd_norm: row.get(5)?,
                    ns_norm: row.get(6)?,
                    ent_norm: row.get(7)?,
                    is_reviewed_norm: u8::from(row.get::<_, i32>(8)? != 0),
                    is_self_authored_norm: u8::from(row.get::<_, i32>(9)? != 0),
                    label: row.get(10)?,
                },
            })
        })?;

        let mut samples = Vec::new();
        for row in rows {
            samples.push(row?);
        }
        Ok(samples)
    }
}

#[async_trait]
impl PersistenceGateway for DuckDbGateway {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn Transaction>, BicflowError> {
        let conn = self.conn.clone().lock_owned().await;
        conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(Box::new(DuckDbTransaction {
            conn,
            finished: false,
        }))
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

struct DuckDbTransaction {
    conn: OwnedMutexGuard<Connection>,
    finished: bool,
}

#[async_trait]
impl Transaction for DuckDbTransaction {
    async fn insert_raw(&mut self, record: &ValidatedRecord) -> Result<RecordId, BicflowError> {
        let m = &record.metrics;
        let id: i64 = self.conn.query_row(
            "INSERT INTO raw_records \
             (title, description, change_message, la, ld, nf, nd, ns, ent, \
              is_reviewed, is_self_authored, label) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
            params![
                record.title,
                record.description,
                record.change_message,
                m.la,
                m.ld,
                m.nf,
                m.nd,
                m.ns,
                m.ent,
                record.is_reviewed,
                record.is_self_authored,
                record.label,
            ],
            |row| row.get(0),
        )?;
        Ok(RecordId(id))
    }

    async fn insert_derived(
        &mut self,
        raw_id: RecordId,
        features: &DerivedFeatureRecord,
    ) -> Result<(), BicflowError> {
        self.conn.execute(
            "INSERT INTO derived_features \
             (raw_id, clean_text, la_norm, ld_norm, nf_norm, nd_norm, ns_norm, ent_norm, \
              is_reviewed_norm, is_self_authored_norm, label) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                raw_id.0,
                features.clean_text,
                features.la_norm,
                features.ld_norm,
                features.nf_norm,
                features.nd_norm,
                features.ns_norm,
                features.ent_norm,
                i32::from(features.is_reviewed_norm),
                i32::from(features.is_self_authored_norm),
                features.label,
            ],
        )?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), BicflowError> {
        let mut tx = self;
        tx.conn.execute_batch("COMMIT")?;
        tx.finished = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), BicflowError> {
        let mut tx = self;
        tx.finished = true;
        tx.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Drop for DuckDbTransaction {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Transaction dropped before commit, rolling back");
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!(error = %e, "Rollback on drop failed");
            }
        }
    }
}
