//! Read-only access to the UCI system configuration store.
//!
//! UCI packages are plain text files under `/etc/config`, one per package:
//!
//! ```text
//! config system
//!     option hostname 'OpenWrt'
//!     option log_size '64'
//!
//! config dnsmasq
//!     option leasefile '/tmp/dhcp.leases'
//!     list server '/lan/'
//! ```
//!
//! Handlers only ever need "the first section of type T, option O", so the
//! model is deliberately small. Lines that do not tokenize are skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Source of UCI packages, passed explicitly to handlers that need settings.
pub trait ConfigStore {
    /// Load a package by name. `None` if it does not exist or is unreadable.
    fn load(&self, package: &str) -> Option<Package>;
}

/// An option value: UCI distinguishes scalar options from lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Scalar(String),
    List(Vec<String>),
}

/// One `config <type> [name]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: String,
    pub name: Option<String>,
    options: Vec<(String, OptionValue)>,
}

impl Section {
    fn new(kind: String, name: Option<String>) -> Self {
        Self {
            kind,
            name,
            options: Vec::new(),
        }
    }

    /// Scalar option value. Lists do not match.
    pub fn get(&self, option: &str) -> Option<&str> {
        match self.find(option)? {
            OptionValue::Scalar(value) => Some(value),
            OptionValue::List(_) => None,
        }
    }

    /// List option values. Scalars do not match.
    pub fn list(&self, option: &str) -> Option<&[String]> {
        match self.find(option)? {
            OptionValue::List(values) => Some(values),
            OptionValue::Scalar(_) => None,
        }
    }

    fn find(&self, option: &str) -> Option<&OptionValue> {
        self.options
            .iter()
            .find(|(key, _)| key == option)
            .map(|(_, value)| value)
    }

    fn set(&mut self, key: String, value: String) {
        match self.options.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = OptionValue::Scalar(value),
            None => self.options.push((key, OptionValue::Scalar(value))),
        }
    }

    fn append(&mut self, key: String, value: String) {
        match self.options.iter_mut().find(|(k, _)| *k == key) {
            Some((_, OptionValue::List(values))) => values.push(value),
            Some((_, slot)) => *slot = OptionValue::List(vec![value]),
            None => self.options.push((key, OptionValue::List(vec![value]))),
        }
    }
}

/// A parsed UCI package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    sections: Vec<Section>,
}

impl Package {
    /// Parse package text. Never fails; malformed lines are dropped.
    pub fn parse(text: &str) -> Self {
        let mut package = Package::default();

        for (line_num, line) in text.lines().enumerate() {
            let Some(tokens) = tokenize(line) else {
                debug!(line = line_num + 1, "skipping malformed UCI line");
                continue;
            };

            match tokens.as_slice() {
                [] => {}
                [keyword, ..] if keyword == "package" => {}
                [keyword, kind] if keyword == "config" => {
                    package.sections.push(Section::new(kind.clone(), None));
                }
                [keyword, kind, name] if keyword == "config" => {
                    package
                        .sections
                        .push(Section::new(kind.clone(), Some(name.clone())));
                }
                [keyword, key, value] if keyword == "option" || keyword == "list" => {
                    let Some(section) = package.sections.last_mut() else {
                        trace!(line = line_num + 1, "option outside of a section");
                        continue;
                    };
                    if keyword == "option" {
                        section.set(key.clone(), value.clone());
                    } else {
                        section.append(key.clone(), value.clone());
                    }
                }
                _ => {
                    debug!(line = line_num + 1, "skipping unrecognized UCI statement");
                }
            }
        }

        package
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The first section of the given type, in file order.
    pub fn first_of_type(&self, kind: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }
}

/// Split one UCI line into words, honouring quotes and `#` comments.
///
/// Returns `None` for an unterminated quote.
fn tokenize(line: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.peek() {
            None | Some('#') => break,
            Some(_) => {}
        }

        let mut word = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            match c {
                '\'' => loop {
                    match chars.next()? {
                        '\'' => break,
                        other => word.push(other),
                    }
                },
                '"' => loop {
                    match chars.next()? {
                        '"' => break,
                        '\\' => word.push(chars.next()?),
                        other => word.push(other),
                    }
                },
                other => word.push(other),
            }
        }
        tokens.push(word);
    }

    Some(tokens)
}

/// File-backed store reading `<dir>/<package>`.
#[derive(Debug, Clone)]
pub struct UciStore {
    dir: PathBuf,
}

impl UciStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ConfigStore for UciStore {
    fn load(&self, package: &str) -> Option<Package> {
        if package.is_empty() || package.contains('/') || package.starts_with('.') {
            debug!(package, "refusing to load invalid package name");
            return None;
        }

        let path = self.dir.join(package);
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(Package::parse(&text)),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "UCI package unavailable");
                None
            }
        }
    }
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    packages: HashMap<String, Package>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package from UCI text.
    pub fn with_package(mut self, name: &str, text: &str) -> Self {
        self.packages.insert(name.to_string(), Package::parse(text));
        self
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self, package: &str) -> Option<Package> {
        self.packages.get(package).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SYSTEM: &str = r#"
config system
	option hostname 'OpenWrt'
	option timezone "UTC"
	option log_size 64
	option log_type 'file' # trailing comment

config timeserver 'ntp'
	list server '0.openwrt.pool.ntp.org'
	list server '1.openwrt.pool.ntp.org'
	option enabled '1'
"#;

    #[test]
    fn test_parse_sections_and_options() {
        let package = Package::parse(SYSTEM);
        assert_eq!(package.sections().len(), 2);

        let system = package.first_of_type("system").unwrap();
        assert_eq!(system.name, None);
        assert_eq!(system.get("hostname"), Some("OpenWrt"));
        assert_eq!(system.get("timezone"), Some("UTC"));
        assert_eq!(system.get("log_size"), Some("64"));
        assert_eq!(system.get("log_type"), Some("file"));
        assert_eq!(system.get("missing"), None);

        let ntp = package.first_of_type("timeserver").unwrap();
        assert_eq!(ntp.name.as_deref(), Some("ntp"));
        assert_eq!(ntp.list("server").map(|s| s.len()), Some(2));
        assert_eq!(ntp.get("server"), None);
        assert_eq!(ntp.get("enabled"), Some("1"));
    }

    #[test]
    fn test_first_of_type_uses_file_order() {
        let package = Package::parse(
            "config dnsmasq 'a'\n\toption leasefile '/tmp/a'\nconfig dnsmasq 'b'\n\toption leasefile '/tmp/b'\n",
        );
        let first = package.first_of_type("dnsmasq").unwrap();
        assert_eq!(first.get("leasefile"), Some("/tmp/a"));
    }

    #[test]
    fn test_tokenize_quoting() {
        assert_eq!(
            tokenize(r#"option name 'two words'"#).unwrap(),
            vec!["option", "name", "two words"]
        );
        assert_eq!(
            tokenize(r#"option name "esc\"aped""#).unwrap(),
            vec!["option", "name", "esc\"aped"]
        );
        assert_eq!(
            tokenize(r#"option name 'con'"cat""#).unwrap(),
            vec!["option", "name", "concat"]
        );
        assert_eq!(tokenize("   # only a comment").unwrap(), Vec::<String>::new());
        assert!(tokenize("option name 'unterminated").is_none());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let package = Package::parse(
            "option orphan '1'\nconfig system\n\toption broken 'x\n\toption ok 'y'\n\tbogus statement here extra\n",
        );
        let system = package.first_of_type("system").unwrap();
        assert_eq!(system.get("broken"), None);
        assert_eq!(system.get("ok"), Some("y"));
    }

    #[test]
    fn test_option_redefinition_replaces() {
        let package = Package::parse("config system\n\toption a '1'\n\toption a '2'\n");
        assert_eq!(package.first_of_type("system").unwrap().get("a"), Some("2"));
    }

    #[test]
    fn test_uci_store_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dhcp"),
            "config dnsmasq\n\toption leasefile '/tmp/dhcp.leases'\n",
        )
        .unwrap();

        let store = UciStore::new(dir.path());
        let dhcp = store.load("dhcp").unwrap();
        assert_eq!(
            dhcp.first_of_type("dnsmasq").unwrap().get("leasefile"),
            Some("/tmp/dhcp.leases")
        );
        assert!(store.load("network").is_none());
        assert!(store.load("../dhcp").is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new().with_package("system", "config system\n");
        assert!(store.load("system").is_some());
        assert!(store.load("dhcp").is_none());
    }

    proptest! {
        #[test]
        fn parse_never_panics(text in "\\PC*") {
            let _ = Package::parse(&text);
        }
    }
}
