use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Copy of the fixture directory in a scratch dir, so the store files
/// created by a test never leak into the source tree.
struct BicflowTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl BicflowTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

        let dest = tmp.path().join("fixtures");
        Self::copy_dir(&fixtures, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn db(&self) -> String {
        self.path("store.duckdb").to_string_lossy().into_owned()
    }

    fn bicflow(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bicflow"));
        cmd.current_dir(&self.root);
        for key in [
            "BICFLOW_DATABASE",
            "BICFLOW_COMMIT_POLICY",
            "BICFLOW_LEMMATIZE",
            "RUST_LOG",
        ] {
            cmd.env_remove(key);
        }
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> Result<serde_json::Value> {
    serde_json::from_slice(&output.stdout).context("stdout is not JSON")
}

#[test]
fn test_ingest_single_file() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    let output = env
        .bicflow()
        .args(["ingest", "--input", "uploads/changes.csv", "--db", &env.db()])
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    assert_eq!(json["total_records"], 3);
    let results = json["results"].as_array().context("results")?;
    assert_eq!(results.len(), 3);
    for (i, ack) in results.iter().enumerate() {
        assert_eq!(ack["row"], i);
        assert_eq!(ack["accepted"], true);
        assert_eq!(ack["prediction"], 1);
        assert_eq!(ack["confidence"], 0.85);
        assert_eq!(ack["explanation"].as_array().map(Vec::len), Some(3));
    }

    env.bicflow()
        .args(["inspect", "--db", &env.db()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Every raw record has exactly one derived record"))
        .stdout(predicate::str::contains("fix crash parser"));
    Ok(())
}

#[test]
fn test_ingest_directory_one_batch_per_file() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    let output = env
        .bicflow()
        .args(["ingest", "--input", "uploads", "--db", &env.db(), "--commit-policy", "batch"])
        .output()?;
    assert!(output.status.success());

    // README.txt is not an upload.
    let json = stdout_json(&output)?;
    let uploads = json.as_array().context("array of uploads")?;
    assert_eq!(uploads.len(), 2);
    assert!(uploads[0]["file"].as_str().is_some_and(|f| f.ends_with("changes.csv")));
    assert_eq!(uploads[0]["total_records"], 3);
    assert_eq!(uploads[1]["total_records"], 2);
    Ok(())
}

#[test]
fn test_missing_columns_is_client_error() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    env.bicflow()
        .args(["ingest", "--input", "bad/missing_columns.csv", "--db", &env.db()])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Missing columns"))
        .stderr(predicate::str::contains("'change_message'"))
        .stderr(predicate::str::contains("'is_self_authored'"))
        .stderr(predicate::str::contains(r#""class":"client""#));
    Ok(())
}

#[test]
fn test_uncoercible_column_is_client_error() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    env.bicflow()
        .args(["ingest", "--input", "bad/bad_numeric.csv", "--db", &env.db()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'la'"));

    // Rejected before any write.
    env.bicflow()
        .args(["inspect", "--db", &env.db()])
        .assert()
        .success()
        .stdout(predicate::str::contains("│ 0"));
    Ok(())
}

#[test]
fn test_malformed_csv_is_client_error() -> Result<()> {
    let env = BicflowTestEnv::new()?;
    std::fs::write(env.path("wide.csv"), "title,la\na,1,2,3\n")?;

    env.bicflow()
        .args(["ingest", "--input", "wide.csv", "--dry-run"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid CSV file"));
    Ok(())
}

#[test]
fn test_missing_input_is_client_error() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    env.bicflow()
        .args(["ingest", "--input", "nowhere.csv", "--db", &env.db()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Upload not found"))
        .stderr(predicate::str::contains(r#""class":"client""#));
    assert!(!env.path("store.duckdb").exists());

    env.bicflow()
        .args(["check", "--input", "nowhere.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(r#""class":"client""#));
    Ok(())
}

#[test]
fn test_legacy_headers_through_config() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    // bicflow.yaml is picked up from the working directory.
    let mut cmd = env.bicflow();
    cmd.current_dir(env.path("legacy"));
    let output = cmd.args(["ingest", "--input", "export.csv"]).output()?;
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)?["total_records"], 2);
    assert!(env.path("legacy/legacy.duckdb").exists());

    let mut cmd = env.bicflow();
    cmd.current_dir(env.path("legacy"));
    cmd.args(["check", "--input", "export.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fix login link"));
    Ok(())
}

#[test]
fn test_check_writes_nothing() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    let output = env
        .bicflow()
        .args(["check", "--input", "uploads/changes.csv"])
        .output()?;
    assert!(output.status.success());

    let json = stdout_json(&output)?;
    let rows = json["rows"].as_array().context("rows")?;
    let la: Vec<f64> = rows
        .iter()
        .filter_map(|r| r["features"]["la_norm"].as_f64())
        .collect();
    assert_eq!(la, vec![0.0, 1.0, 0.5]);
    assert!(!env.path("bicflow.duckdb").exists());
    Ok(())
}

#[test]
fn test_dry_run_and_output_file() -> Result<()> {
    let env = BicflowTestEnv::new()?;
    let out = env.path("out/response.json");
    std::fs::create_dir_all(env.path("out"))?;

    env.bicflow()
        .args(["ingest", "--input", "uploads/more.csv", "--dry-run", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out)?)?;
    assert_eq!(json["total_records"], 2);
    assert!(!env.path("bicflow.duckdb").exists());
    Ok(())
}

#[test]
fn test_inspect_missing_database() -> Result<()> {
    let env = BicflowTestEnv::new()?;

    env.bicflow()
        .args(["inspect", "--db", "nowhere.duckdb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Database not found"))
        .stderr(predicate::str::contains(r#""class":"server""#));
    Ok(())
}
