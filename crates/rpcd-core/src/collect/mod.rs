//! Collectors: read one host data source and normalize it into records.
//!
//! Parsers are pure functions over text (`parse_*`) so they can be tested
//! against fixtures; the `read_*`/`collect_*`/`list_*` wrappers add the I/O
//! and the soft- or hard-fail policy of each source.

pub mod arp;
pub mod command;
pub mod conntrack;
pub mod fields;
pub mod initscripts;
pub mod leases;
pub mod process;
pub mod routes;
pub mod sshkeys;
pub mod syslog;

pub use arp::ArpEntry;
pub use conntrack::{ConntrackCount, ConntrackEntry};
pub use fields::Fields;
pub use initscripts::InitScript;
pub use leases::{Lease, Lease6};
pub use process::ProcessRecord;
pub use routes::{Route6Entry, RouteEntry};
