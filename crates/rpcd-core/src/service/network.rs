//! `luci2.network`: connection tracking, neighbours, leases and routes.

use super::{Context, MethodDef, Service};
use crate::collect::{arp, conntrack, leases, routes};
use crate::payload::{Args, ResponseBuilder};
use rpcd_common::{Error, Result};

const METHODS: &[MethodDef] = &[
    MethodDef::no_args("conntrack_count"),
    MethodDef::no_args("conntrack_table"),
    MethodDef::no_args("arp_table"),
    MethodDef::no_args("dhcp_leases"),
    MethodDef::no_args("dhcp6_leases"),
    MethodDef::no_args("routes"),
    MethodDef::no_args("routes6"),
];

/// Network state collector. Stateless.
#[derive(Debug, Default)]
pub struct NetworkService;

impl NetworkService {
    pub const NAME: &'static str = "luci2.network";

    pub fn new() -> Self {
        Self
    }
}

impl Service for NetworkService {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn methods(&self) -> &'static [MethodDef] {
        METHODS
    }

    fn call(
        &self,
        ctx: &Context<'_>,
        method: &str,
        _args: &Args<'_>,
        out: &mut ResponseBuilder,
    ) -> Result<()> {
        let paths = &ctx.config.paths;

        match method {
            "conntrack_count" => {
                let counts = conntrack::read_count(&paths.conntrack_count(), &paths.conntrack_max());
                if let Some(count) = counts.count {
                    out.add_u64("count", count)?;
                }
                if let Some(limit) = counts.limit {
                    out.add_u64("limit", limit)?;
                }
            }
            "conntrack_table" => {
                let entries = conntrack::read_table(&paths.conntrack_table());
                out.add_records("entries", &entries)?;
            }
            "arp_table" => {
                let entries = arp::read_arp_table(&paths.arp_table());
                out.add_records("entries", &entries)?;
            }
            "dhcp_leases" => {
                let now = chrono::Utc::now().timestamp();
                let leases = leases::collect_leases(ctx.store, now);
                out.add_records("leases", &leases)?;
            }
            "dhcp6_leases" => {
                let now = chrono::Utc::now().timestamp();
                let leases = leases::collect_leases6(&paths.relay_hosts, ctx.store, now);
                out.add_records("leases", &leases)?;
            }
            "routes" => {
                let routes = routes::read_routes(&paths.route_table())?;
                out.add_records("routes", &routes)?;
            }
            "routes6" => {
                let routes = routes::read_routes6(&paths.route6_table())?;
                out.add_records("routes", &routes)?;
            }
            other => return Err(Error::MethodNotFound(format!("{}.{other}", Self::NAME))),
        }

        Ok(())
    }
}
