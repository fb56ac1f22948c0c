//! Privileged actions: the only handlers with side effects.

pub mod init;
pub mod signal;
pub mod sshkeys;

pub use init::{run_init_action, ChildReaper, InitAction};
pub use signal::send_signal;
pub use sshkeys::write_keys;
