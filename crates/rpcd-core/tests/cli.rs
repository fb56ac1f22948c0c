//! CLI tests for the rpcd binary.
//!
//! These drive `rpcd call`, `rpcd list` and `rpcd serve` against a
//! temporary config so no host state is read or written.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the rpcd binary.
fn rpcd() -> Command {
    let mut cmd = Command::cargo_bin("rpcd").expect("rpcd binary should exist");
    cmd.env_remove("RPCD_CONFIG")
        .env_remove("RPCD_LOG")
        .env_remove("RUST_LOG")
        .env("RPCD_LOG_FORMAT", "human");
    cmd
}

/// A config file whose every path points into a temp dir.
fn write_config(dir: &Path) -> PathBuf {
    for sub in ["uci", "init.d", "rc.d", "proc/net"] {
        fs::create_dir_all(dir.join(sub)).unwrap();
    }

    let config = format!(
        r#"
[paths]
uci_dir = "{root}/uci"
init_dir = "{root}/init.d"
rc_dir = "{root}/rc.d"
authorized_keys = "{root}/authorized_keys"
relay_hosts = "{root}/6relayd"
proc_root = "{root}/proc"

[commands]
dmesg = ["printf", "kernel ready\\n"]
"#,
        root = dir.display()
    );
    let path = dir.join("config.toml");
    fs::write(&path, config).unwrap();
    path
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should be JSON")
}

// ============================================================================
// list
// ============================================================================

mod list {
    use super::*;

    #[test]
    fn lists_both_objects() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        let output = rpcd()
            .arg("--config")
            .arg(&config)
            .arg("list")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let listing = stdout_json(&output);
        assert_eq!(listing["luci2.system"]["init_action"]["action"], "string");
        assert!(listing["luci2.network"]["routes"].is_object());
    }

    #[test]
    fn unknown_object_exits_not_found() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .arg("--config")
            .arg(&config)
            .args(["list", "luci2.nothing"])
            .assert()
            .code(4)
            .stderr(predicate::str::contains("not found"));
    }
}

// ============================================================================
// call
// ============================================================================

mod call {
    use super::*;

    #[test]
    fn unknown_object_exits_method_not_found() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .arg("--config")
            .arg(&config)
            .args(["call", "luci2.bogus", "anything"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("method_not_found"));
    }

    #[test]
    fn invalid_json_args_exit_args_error() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .arg("--config")
            .arg(&config)
            .args(["call", "luci2.system", "sshkeys_set", "{not json"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn bad_init_action_exits_invalid_argument() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .arg("--config")
            .arg(&config)
            .args([
                "call",
                "luci2.system",
                "init_action",
                r#"{"name":"network","action":"destroy"}"#,
            ])
            .assert()
            .code(2);
    }

    #[test]
    fn sshkeys_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .arg("--config")
            .arg(&config)
            .args([
                "call",
                "luci2.system",
                "sshkeys_set",
                r#"{"keys":["ssh-ed25519 AAAA one",1,"ssh-rsa BBBB two"]}"#,
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("{}"));

        let output = rpcd()
            .arg("--config")
            .arg(&config)
            .args(["call", "luci2.system", "sshkeys_get"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(
            stdout_json(&output),
            serde_json::json!({"keys": ["ssh-ed25519 AAAA one", "ssh-rsa BBBB two"]})
        );
    }

    #[test]
    fn dmesg_uses_configured_command() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .arg("--config")
            .arg(&config)
            .args(["call", "luci2.system", "dmesg"])
            .assert()
            .success()
            .stdout(predicate::str::contains("kernel ready"));
    }

    #[test]
    fn missing_conntrack_is_empty() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        let output = rpcd()
            .arg("--config")
            .arg(&config)
            .args(["call", "luci2.network", "conntrack_table"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&output), serde_json::json!({"entries": []}));
    }

    #[test]
    fn config_from_env() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .env("RPCD_CONFIG", &config)
            .args(["call", "luci2.network", "arp_table"])
            .assert()
            .success()
            .stdout(predicate::str::contains("entries"));
    }
}

// ============================================================================
// config errors
// ============================================================================

mod config_errors {
    use super::*;

    #[test]
    fn missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();

        rpcd()
            .arg("--config")
            .arg(dir.path().join("nope.toml"))
            .arg("list")
            .assert()
            .code(11);
    }

    #[test]
    fn unknown_config_key_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[paths]\nbogus = 1\n").unwrap();

        rpcd()
            .arg("--config")
            .arg(&path)
            .arg("list")
            .assert()
            .code(11);
    }

    #[test]
    fn unknown_log_level_rejected_by_clap() {
        rpcd()
            .args(["--log-level", "loud", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown log level"));
    }
}

// ============================================================================
// serve
// ============================================================================

mod serve {
    use super::*;

    #[test]
    fn answers_requests_in_order() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"ping"}"#,
            "\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"call","params":{"object":"luci2.system","method":"sshkeys_set","args":{"keys":["k1"]}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"call","params":{"object":"luci2.system","method":"sshkeys_get"}}"#,
            "\n",
        );

        let output = rpcd()
            .arg("--config")
            .arg(&config)
            .arg("serve")
            .write_stdin(input)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["result"], serde_json::json!({}));
        assert_eq!(responses[3]["result"]["keys"], serde_json::json!(["k1"]));
    }

    #[test]
    fn serve_is_the_default_command() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path());

        rpcd()
            .arg("--config")
            .arg(&config)
            .write_stdin("{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"method\":\"ping\"}\n")
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""id":"a""#));
    }
}
