//! CLI tests for rd-core.
//!
//! Every command runs with an isolated config environment so a user's
//! configuration file cannot leak into the results.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the rd-core binary with no configuration discovered.
fn rd_core(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rd-core").expect("rd-core binary should exist");
    cmd.env_remove("RD_CONFIG")
        .env_remove("RD_CONFIG_DIR")
        .env_remove("RD_OUTPUT_DIR")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home)
        .env("HOME", home);
    cmd
}

fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
                found.push(path);
            }
        }
    }
    found
}

// ============================================================================
// Help and Version
// ============================================================================

mod top_level {
    use super::*;

    #[test]
    fn help_lists_subcommands() {
        let home = TempDir::new().unwrap();
        rd_core(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("plot-gridworld-divergence")
                    .and(predicate::str::contains("shaping-comparison"))
                    .and(predicate::str::contains("rewards"))
                    .and(predicate::str::contains("check")),
            );
    }

    #[test]
    fn version_json() {
        let home = TempDir::new().unwrap();
        let output = rd_core(home.path())
            .args(["version", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["rd_core_version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn unknown_command_fails() {
        let home = TempDir::new().unwrap();
        rd_core(home.path())
            .arg("nonexistent-command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_kind_is_rejected_by_parser() {
        let home = TempDir::new().unwrap();
        rd_core(home.path())
            .args(["plot-gridworld-divergence", "--kind", "cosine"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown divergence kind"));
    }
}

// ============================================================================
// Catalog and Configuration
// ============================================================================

mod catalog_and_check {
    use super::*;

    #[test]
    fn rewards_lists_builtin_catalog() {
        let home = TempDir::new().unwrap();
        rd_core(home.path())
            .arg("rewards")
            .assert()
            .success()
            .stdout(
                predicate::str::contains("sparse_goal\t3x3")
                    .and(predicate::str::contains("evaluating_rewards/Zero-v0")),
            );
    }

    #[test]
    fn rewards_from_json_catalog() {
        let home = TempDir::new().unwrap();
        let catalog = home.path().join("catalog.json");
        std::fs::write(
            &catalog,
            r#"{"wide": {"state_reward": [[0, 1, 2, 3]]}, "tall": {"state_reward": [[0], [1]]}}"#,
        )
        .unwrap();

        let output = rd_core(home.path())
            .args(["rewards", "--format", "json", "--catalog"])
            .arg(&catalog)
            .output()
            .unwrap();
        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json[0]["name"], "wide");
        assert_eq!(json[0]["grid"], serde_json::json!([1, 4]));
        assert_eq!(json[1]["name"], "tall");
    }

    #[test]
    fn check_defaults_pass() {
        let home = TempDir::new().unwrap();
        rd_core(home.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("✓ validation"));
    }

    #[test]
    fn check_reports_invalid_discount() {
        let home = TempDir::new().unwrap();
        let config = home.path().join("plot.json");
        std::fs::write(&config, r#"{"discount": 1.5}"#).unwrap();

        let output = rd_core(home.path())
            .args(["check", "--format", "json", "--config"])
            .arg(&config)
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(10));
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["status"], "error");
    }

    #[test]
    fn check_lists_presets() {
        let home = TempDir::new().unwrap();
        rd_core(home.path())
            .args(["check", "--list-presets"])
            .assert()
            .success()
            .stdout(predicate::str::contains("test").and(predicate::str::contains("paper")));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let home = TempDir::new().unwrap();
        rd_core(home.path())
            .args(["plot-gridworld-divergence", "--config"])
            .arg(home.path().join("absent.json"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Reason"));
    }
}

// ============================================================================
// End-to-end Runs
// ============================================================================

mod runs {
    use super::*;

    #[test]
    fn plot_with_test_preset_writes_svg() {
        let home = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let output = rd_core(home.path())
            .args([
                "plot-gridworld-divergence",
                "--preset",
                "test",
                "--n-iter",
                "20",
                "--format",
                "json",
                "--log-root",
            ])
            .arg(out.path())
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let log_dir = PathBuf::from(json["log_dir"].as_str().unwrap());
        assert!(log_dir.starts_with(out.path().join("plot_gridworld_divergence")));
        assert!(log_dir.join("divergence.json").exists());

        let svgs = files_with_extension(out.path(), "svg");
        assert_eq!(svgs.len(), 1);
        let svg = std::fs::read_to_string(&svgs[0]).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn plot_html_with_normalization() {
        let home = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        rd_core(home.path())
            .args([
                "plot-gridworld-divergence",
                "--preset",
                "test",
                "--reward-subset",
                "sparse_goal,center_goal,evaluating_rewards/Zero-v0",
                "--normalize",
                "--n-iter",
                "20",
                "--fmt",
                "html",
                "--log-root",
            ])
            .arg(out.path())
            .assert()
            .success();
        assert_eq!(files_with_extension(out.path(), "html").len(), 1);
    }

    #[test]
    fn unknown_reward_exits_with_config_error() {
        let home = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        rd_core(home.path())
            .args([
                "plot-gridworld-divergence",
                "--reward-subset",
                "no_such_reward",
                "--log-root",
            ])
            .arg(out.path())
            .assert()
            .code(10)
            .stderr(predicate::str::contains("no_such_reward"));
    }

    #[test]
    fn shaping_comparison_writes_plot() {
        let home = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        rd_core(home.path())
            .args([
                "shaping-comparison",
                "--preset",
                "test",
                "--reward-noise",
                "0,0.5",
                "--potential-noise",
                "1",
                "--trials",
                "1",
                "--log-root",
            ])
            .arg(out.path())
            .assert()
            .success();
        assert_eq!(files_with_extension(out.path(), "svg").len(), 1);
    }
}
