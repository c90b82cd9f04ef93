//! Binary-level tests of the `prepay` command.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use prepay_core::Date;
use tempfile::TempDir;

const PORTFOLIO_HEADER: &str =
    "id,amortization,category,principal,rate,installments,disbursement,maturity,currency,frequency";

fn prepay() -> Command {
    let mut cmd = Command::cargo_bin("prepay").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("PREPAY_CONFIG");
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn portfolio(dir: &Path, rows: &[&str]) -> PathBuf {
    let mut contents = String::from(PORTFOLIO_HEADER);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    write(dir, "portfolio.csv", &contents)
}

/// 80 weekly Consumo observations in percent ending at the cut-off.
fn history(dir: &Path, cutoff: Date) -> PathBuf {
    let mut contents = String::from("date,Consumo\n");
    for i in 0..80_i64 {
        let date = cutoff.add_days(-7 * (79 - i));
        let rate = 10.0 + 0.2 * (i as f64 * 0.7).sin();
        contents.push_str(&format!("{date},{rate:.4}\n"));
    }
    write(dir, "history.csv", &contents)
}

fn risk_free(dir: &Path) -> PathBuf {
    write(
        dir,
        "risk_free.csv",
        "days,tenor,COP\n\
         1,0.0027,9.0\n\
         30,0.0822,9.1\n\
         91,0.2493,9.2\n\
         183,0.5014,9.4\n\
         365,1.0,9.6\n\
         730,2.0,9.8\n\
         1826,5.0,10.0\n",
    )
}

#[test]
fn bands_lists_the_table() {
    prepay()
        .arg("bands")
        .assert()
        .success()
        .stdout(predicate::str::contains("7301"))
        .stdout(predicate::str::contains("99999"));
}

#[test]
fn bands_day_lookup() {
    prepay()
        .args(["--format", "csv", "bands", "--days", "45"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1667"))
        .stdout(predicate::str::contains("Band,3"));
}

#[test]
fn schedule_shows_banded_rows() {
    let dir = TempDir::new().unwrap();
    let file = portfolio(
        dir.path(),
        &["FR-1,French,Comercial,1000000,0.12,12,2025-01-15,2026-01-15,COP,Monthly"],
    );
    prepay()
        .args(["--format", "csv", "schedule", "--id", "FR-1", "--cutoff", "2025-01-15"])
        .arg("--portfolio")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-02-15,31,3,0.1667"))
        .stdout(predicate::str::contains("2026-01-15"));
}

#[test]
fn schedule_unknown_credit_fails() {
    let dir = TempDir::new().unwrap();
    let file = portfolio(
        dir.path(),
        &["FR-1,French,Comercial,1000000,0.12,12,2025-01-15,2026-01-15,COP,Monthly"],
    );
    prepay()
        .args(["schedule", "--id", "NOPE", "--cutoff", "2025-01-15"])
        .arg("--portfolio")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Credit not found: NOPE"));
}

#[test]
fn run_json_end_to_end() {
    let dir = TempDir::new().unwrap();
    let cutoff = Date::from_ymd(2025, 1, 31).unwrap();
    let credits = portfolio(
        dir.path(),
        &[
            "C-1,Alemán,Consumo,50000,0.28,24,30/06/2024,30/06/2026,COP,Mensual",
            "C-2,French,Consumo,80000,0.28,24,2024-06-30,2026-06-30,COP,Monthly",
            "C-3,French,Consumo,80000,0.28,24,2024-06-30,2026-06-30,USD,Monthly",
        ],
    );
    let history = history(dir.path(), cutoff);
    let curves = risk_free(dir.path());

    let output = prepay()
        .args(["--quiet", "--format", "json", "run", "--cutoff", "2025-01-31", "-n", "20"])
        .arg("--portfolio")
        .arg(&credits)
        .arg("--history")
        .arg(&history)
        .arg("--risk-free")
        .arg(&curves)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(doc["config"]["simulations"], 20);
    let valuations = doc["valuations"].as_array().unwrap();
    assert_eq!(valuations.len(), 2);
    for v in valuations {
        assert_eq!(v["base_paths"], 20);
        assert!(v["base_pv"].as_f64().unwrap() > 0.0);
        assert_eq!(v["scenarios"].as_array().unwrap().len(), 6);
    }
    let failures = doc["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["credit_id"], "C-3");
    assert_eq!(doc["validation"]["consolidated"]["entities"], 1);
}

#[test]
fn run_with_config_file_and_overrides() {
    let dir = TempDir::new().unwrap();
    let cutoff = Date::from_ymd(2025, 1, 31).unwrap();
    let credits = portfolio(
        dir.path(),
        &["C-1,French,Consumo,80000,0.28,24,2024-06-30,2026-06-30,COP,Monthly"],
    );
    let history = history(dir.path(), cutoff);
    let curves = risk_free(dir.path());
    let config = write(
        dir.path(),
        "run.toml",
        "cutoff = \"2025-01-31\"\nsimulations = 50\ndifferential_pct = 2.0\n",
    );

    prepay()
        .args(["--quiet", "--format", "csv", "run", "-n", "10"])
        .arg("--config")
        .arg(&config)
        .arg("--portfolio")
        .arg(&credits)
        .arg("--history")
        .arg(&history)
        .arg("--risk-free")
        .arg(&curves)
        .assert()
        .success()
        .stdout(predicate::str::contains("C-1,COP,base,"))
        .stdout(predicate::str::contains("parallel_up"))
        .stdout(predicate::str::contains(",10\n"));
}

#[test]
fn run_without_history_fails() {
    let dir = TempDir::new().unwrap();
    let credits = portfolio(
        dir.path(),
        &["C-1,French,Consumo,80000,0.28,24,2024-06-30,2026-06-30,COP,Monthly"],
    );
    let curves = risk_free(dir.path());
    prepay()
        .args(["run", "--cutoff", "2025-01-31"])
        .arg("--portfolio")
        .arg(&credits)
        .arg("--risk-free")
        .arg(&curves)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--history"));
}

#[test]
fn run_rejects_repeated_ids() {
    let dir = TempDir::new().unwrap();
    let cutoff = Date::from_ymd(2025, 1, 31).unwrap();
    let credits = portfolio(
        dir.path(),
        &[
            "C-1,French,Consumo,80000,0.28,24,2024-06-30,2026-06-30,COP,Monthly",
            "C-1,German,Consumo,80000,0.28,24,2024-06-30,2026-06-30,COP,Monthly",
        ],
    );
    let history = history(dir.path(), cutoff);
    let curves = risk_free(dir.path());
    prepay()
        .args(["run", "--cutoff", "2025-01-31"])
        .arg("--portfolio")
        .arg(&credits)
        .arg("--history")
        .arg(&history)
        .arg("--risk-free")
        .arg(&curves)
        .assert()
        .failure()
        .stderr(predicate::str::contains("appears more than once"));
}

#[test]
fn config_init_prints_defaults() {
    prepay()
        .args(["config", "init", "--cutoff", "2025-03-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("simulations = 100"))
        .stdout(predicate::str::contains("seed = 42"));
}

#[test]
fn config_show_reports_invalid_settings() {
    prepay()
        .args(["config", "show", "--cutoff", "2025-03-31", "-n", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("simulations"));
}
