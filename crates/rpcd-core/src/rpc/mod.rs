//! JSON-RPC 2.0 transport over stdio.

pub mod protocol;
pub mod server;

pub use server::Server;
