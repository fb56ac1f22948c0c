//! The daemon's own configuration file.
//!
//! Every external data source the handlers read has a default matching a
//! stock OpenWrt image. The TOML file only needs the keys it overrides:
//!
//! ```toml
//! [paths]
//! proc_root = "/proc"
//! authorized_keys = "/etc/dropbear/authorized_keys"
//!
//! [commands]
//! top = ["/bin/busybox", "top", "-bn1"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the daemon configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    pub paths: Paths,
    pub commands: Commands,
}

/// Filesystem locations of every data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Paths {
    /// Directory holding UCI packages (`system`, `dhcp`, ...).
    pub uci_dir: PathBuf,
    /// Log file used when `system.log_type` is `file` without `log_file`.
    pub default_log_file: PathBuf,
    /// Init script directory.
    pub init_dir: PathBuf,
    /// Directory holding `S<nn><name>` priority symlinks.
    pub rc_dir: PathBuf,
    /// Dropbear authorized keys file.
    pub authorized_keys: PathBuf,
    /// DHCPv6 relay daemon host file, tried before the dnsmasq lease file.
    pub relay_hosts: PathBuf,
    /// Root of the proc filesystem.
    pub proc_root: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            uci_dir: PathBuf::from("/etc/config"),
            default_log_file: PathBuf::from("/var/log/messages"),
            init_dir: PathBuf::from("/etc/init.d"),
            rc_dir: PathBuf::from("/etc/rc.d"),
            authorized_keys: PathBuf::from("/etc/dropbear/authorized_keys"),
            relay_hosts: PathBuf::from("/tmp/hosts/6relayd"),
            proc_root: PathBuf::from("/proc"),
        }
    }
}

impl Paths {
    fn proc(&self, rel: &str) -> PathBuf {
        self.proc_root.join(rel)
    }

    pub fn conntrack_count(&self) -> PathBuf {
        self.proc("sys/net/netfilter/nf_conntrack_count")
    }

    pub fn conntrack_max(&self) -> PathBuf {
        self.proc("sys/net/netfilter/nf_conntrack_max")
    }

    pub fn conntrack_table(&self) -> PathBuf {
        self.proc("net/nf_conntrack")
    }

    pub fn arp_table(&self) -> PathBuf {
        self.proc("net/arp")
    }

    pub fn route_table(&self) -> PathBuf {
        self.proc("net/route")
    }

    pub fn route6_table(&self) -> PathBuf {
        self.proc("net/ipv6_route")
    }
}

/// Commands spawned by the collectors, as argv vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Commands {
    /// Log daemon reader, used when logging is not file based.
    pub logread: Vec<String>,
    /// Kernel ring buffer dump.
    pub dmesg: Vec<String>,
    /// Process listing in busybox `top` batch layout.
    pub top: Vec<String>,
}

impl Default for Commands {
    fn default() -> Self {
        Self {
            logread: vec!["logread".to_string()],
            dmesg: vec!["dmesg".to_string()],
            top: vec![
                "/bin/busybox".to_string(),
                "top".to_string(),
                "-bn1".to_string(),
            ],
        }
    }
}

impl DaemonConfig {
    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, argv) in [
            ("logread", &self.commands.logread),
            ("dmesg", &self.commands.dmesg),
            ("top", &self.commands.top),
        ] {
            match argv.first() {
                None => {
                    return Err(ConfigError::Invalid(format!(
                        "commands.{name} must not be empty"
                    )))
                }
                Some(program) if program.trim().is_empty() => {
                    return Err(ConfigError::Invalid(format!(
                        "commands.{name} has an empty program name"
                    )))
                }
                Some(_) => {}
            }
        }

        if !self.paths.proc_root.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "paths.proc_root must be absolute, got {}",
                self.paths.proc_root.display()
            )));
        }

        Ok(())
    }
}

/// Load the daemon configuration from a TOML file.
pub fn load_daemon_config(path: &Path) -> Result<DaemonConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
