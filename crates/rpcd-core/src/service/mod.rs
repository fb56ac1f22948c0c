//! Bus objects and their method tables.
//!
//! A [`Service`] is one bus object (`luci2.system`, `luci2.network`). Each
//! method declares its request schema; the [`Registry`] validates requests
//! against it before the handler runs, so handlers only ever see
//! conforming [`Args`].

pub mod network;
pub mod registry;
pub mod system;

pub use network::NetworkService;
pub use registry::Registry;
pub use system::SystemService;

use crate::payload::{Args, FieldSpec, ResponseBuilder};
use rpcd_common::Result;
use rpcd_config::{ConfigStore, DaemonConfig};

/// A method name and its request schema.
#[derive(Debug, Clone, Copy)]
pub struct MethodDef {
    pub name: &'static str,
    pub schema: &'static [FieldSpec],
}

impl MethodDef {
    pub const fn no_args(name: &'static str) -> Self {
        Self { name, schema: &[] }
    }

    pub const fn with_schema(name: &'static str, schema: &'static [FieldSpec]) -> Self {
        Self { name, schema }
    }
}

/// Everything a handler may read besides its arguments.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub config: &'a DaemonConfig,
    pub store: &'a dyn ConfigStore,
}

/// One bus object.
pub trait Service {
    /// Object path, e.g. `luci2.system`.
    fn name(&self) -> &'static str;

    fn methods(&self) -> &'static [MethodDef];

    /// Run `method`. Only called with names from [`Service::methods`] and
    /// with `args` already validated against that method's schema.
    fn call(
        &self,
        ctx: &Context<'_>,
        method: &str,
        args: &Args<'_>,
        out: &mut ResponseBuilder,
    ) -> Result<()>;

    fn method(&self, name: &str) -> Option<&'static MethodDef> {
        self.methods().iter().find(|m| m.name == name)
    }
}
