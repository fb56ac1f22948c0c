//! `luci2.system`: logs, processes, init scripts and SSH keys.

use super::{Context, MethodDef, Service};
use crate::action::{self, ChildReaper};
use crate::collect::{initscripts, process, sshkeys, syslog};
use crate::payload::{Args, FieldKind, FieldSpec, ResponseBuilder};
use rpcd_common::{Error, Result};
use tracing::debug;

const SIGNAL_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("pid", FieldKind::Int32),
    FieldSpec::required("signal", FieldKind::Int32),
];

const INIT_SCHEMA: &[FieldSpec] = &[
    FieldSpec::required("name", FieldKind::String),
    FieldSpec::required("action", FieldKind::String),
];

const SSHKEYS_SCHEMA: &[FieldSpec] = &[FieldSpec::required("keys", FieldKind::Array)];

const METHODS: &[MethodDef] = &[
    MethodDef::no_args("syslog"),
    MethodDef::no_args("dmesg"),
    MethodDef::no_args("process_list"),
    MethodDef::with_schema("process_signal", SIGNAL_SCHEMA),
    MethodDef::no_args("init_list"),
    MethodDef::with_schema("init_action", INIT_SCHEMA),
    MethodDef::no_args("sshkeys_get"),
    MethodDef::with_schema("sshkeys_set", SSHKEYS_SCHEMA),
];

/// System collector and actuator.
#[derive(Debug, Default)]
pub struct SystemService {
    reaper: ChildReaper,
}

impl SystemService {
    pub const NAME: &'static str = "luci2.system";

    pub fn new() -> Self {
        Self::default()
    }
}

impl Service for SystemService {
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
        args: &Args<'_>,
        out: &mut ResponseBuilder,
    ) -> Result<()> {
        let reaped = self.reaper.reap();
        if reaped > 0 {
            debug!(reaped, "collected finished init scripts");
        }

        let paths = &ctx.config.paths;
        let commands = &ctx.config.commands;

        match method {
            "syslog" => {
                let log = syslog::system_log(ctx.store, paths, commands)?;
                out.add_string("log", log)?;
            }
            "dmesg" => {
                let log = syslog::kernel_log(commands)?;
                out.add_string("log", log)?;
            }
            "process_list" => {
                let processes = process::list_processes(commands)?;
                out.add_records("processes", &processes)?;
            }
            "process_signal" => {
                action::send_signal(args.require_int("pid")?, args.require_int("signal")?)?;
            }
            "init_list" => {
                let scripts = initscripts::list_init_scripts(&paths.init_dir, &paths.rc_dir)?;
                out.add_records("initscripts", &scripts)?;
            }
            "init_action" => {
                action::run_init_action(
                    &paths.init_dir,
                    args.require_str("name")?,
                    args.require_str("action")?,
                    &self.reaper,
                )?;
            }
            "sshkeys_get" => {
                let keys = sshkeys::read_keys(&paths.authorized_keys)?;
                out.open_array("keys")?;
                for key in keys {
                    out.push_string(key)?;
                }
                out.close()?;
            }
            "sshkeys_set" => {
                let keys = args.require_array("keys")?;
                let written = action::write_keys(&paths.authorized_keys, keys)?;
                debug!(written, "sshkeys_set complete");
            }
            other => return Err(Error::MethodNotFound(format!("{}.{other}", Self::NAME))),
        }

        Ok(())
    }
}
