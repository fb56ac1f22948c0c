//! rpcd: host introspection and control over JSON-RPC.
//!
//! `serve` (the default) speaks line-delimited JSON-RPC on stdio. `call` and
//! `list` run a single request from the command line and print the result.

use clap::{Args, Parser, Subcommand};
use rpcd_config::load_config;
use rpcd_core::exit_codes::ExitCode;
use rpcd_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use rpcd_core::rpc::Server;
use rpcd_core::service::Registry;
use serde_json::Value;
use std::path::PathBuf;

/// Host introspection and control RPC service
#[derive(Parser)]
#[command(name = "rpcd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to the daemon config file
    #[arg(long, global = true, env = "RPCD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve JSON-RPC requests on stdin/stdout
    Serve,

    /// Invoke one method and print its result
    Call(CallArgs),

    /// Print method signatures
    List(ListArgs),
}

#[derive(Args, Debug)]
struct CallArgs {
    /// Object path, e.g. luci2.system
    object: String,

    /// Method name, e.g. process_list
    method: String,

    /// JSON object with the method's arguments
    args: Option<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Only list this object
    object: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = run(cli);
    std::process::exit(exit_code.as_i32());
}

fn run(cli: Cli) -> ExitCode {
    let resolved = match load_config(cli.global.config.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("rpcd: {e}");
            return ExitCode::ConfigError;
        }
    };
    tracing::info!(source = %resolved.resolved.source, "configuration resolved");

    let registry = Registry::from_config(resolved.config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_serve(registry),
        Commands::Call(args) => run_call(&registry, &args),
        Commands::List(args) => run_list(&registry, &args),
    }
}

fn run_serve(registry: Registry) -> ExitCode {
    tracing::info!(objects = ?registry.objects().collect::<Vec<_>>(), "serving on stdio");
    match Server::new(registry).run_stdio() {
        Ok(()) => ExitCode::Clean,
        Err(e) => {
            tracing::error!(error = %e, "stdio transport failed");
            ExitCode::IoError
        }
    }
}

fn run_call(registry: &Registry, args: &CallArgs) -> ExitCode {
    let params = match args.args.as_deref() {
        None => Value::Null,
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("rpcd: invalid JSON arguments: {e}");
                return ExitCode::ArgsError;
            }
        },
    };

    match registry.call(&args.object, &args.method, &params) {
        Ok(result) => print_json(&result),
        Err(e) => {
            eprintln!("rpcd: {}.{}: {e} ({})", args.object, args.method, e.status());
            ExitCode::from(&e)
        }
    }
}

fn run_list(registry: &Registry, args: &ListArgs) -> ExitCode {
    match registry.list(args.object.as_deref()) {
        Ok(listing) => print_json(&listing),
        Err(e) => {
            eprintln!("rpcd: {e}");
            ExitCode::from(&e)
        }
    }
}

fn print_json(value: &Value) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("rpcd: {e}");
            ExitCode::UnknownError
        }
    }
}
