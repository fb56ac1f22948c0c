//! rpcd configuration.
//!
//! This crate provides:
//! - The daemon's own TOML configuration (data-source paths and commands)
//! - Config file resolution (CLI → env → XDG → /etc → defaults)
//! - A reader for the UCI system configuration store, behind the
//!   [`ConfigStore`] trait so handlers receive it explicitly

pub mod daemon;
pub mod resolve;
pub mod uci;

pub use daemon::{load_daemon_config, Commands, ConfigError, DaemonConfig, Paths};
pub use resolve::{resolve_config_path, ConfigSource, ResolvedPath};
pub use uci::{ConfigStore, MemoryStore, OptionValue, Package, Section, UciStore};

use std::path::Path;

/// A loaded daemon configuration with provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: DaemonConfig,
    pub resolved: ResolvedPath,
}

/// Resolve and load the daemon configuration.
///
/// A missing file anywhere in the resolution chain falls through to the
/// built-in defaults; a file that exists but fails to parse or validate is an
/// error.
pub fn load_config(cli_path: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
    let resolved = resolve_config_path(cli_path);
    let config = match &resolved.path {
        Some(path) => load_daemon_config(path)?,
        None => DaemonConfig::default(),
    };
    config.validate()?;

    tracing::debug!(
        source = %resolved.source,
        path = ?resolved.path,
        "daemon configuration loaded"
    );

    Ok(ResolvedConfig { config, resolved })
}
