//! rpcd core library
//!
//! Host introspection and control handlers exposed as two bus objects:
//! - `luci2.system`: system and kernel logs, processes, init scripts, SSH keys
//! - `luci2.network`: conntrack, ARP, DHCP leases, IPv4/IPv6 routes
//!
//! Layers, bottom-up:
//! - [`collect`]: readers and parsers for each external data source
//! - [`action`]: side-effecting operations (signals, init scripts, key file)
//! - [`payload`]: request validation and response building
//! - [`service`]: bus objects, method tables and the [`service::Registry`]
//! - [`rpc`]: JSON-RPC 2.0 over stdio
//!
//! The binary entry point is in `main.rs`.

pub mod action;
pub mod collect;
pub mod exit_codes;
pub mod logging;
pub mod payload;
pub mod rpc;
pub mod service;
