//! NETCONF command-line client.
//!
//! Connects to one device, runs one RPC and prints (or saves) the reply,
//! optionally narrowed with a `start-with` filter.
//!
//! Usage:
//!   netconf-client --ip 192.168.1.1 --password secret --path '<get-config><source><running/></source></get-config>'
//!   netconf-client --ip 192.168.1.1 --password secret --file rpc.xml --output response.xml
//!   netconf-client --ip 192.168.1.1 --password secret --file rpc.xml \
//!       --filter "/rpc-reply/data/terminal-device/logical-channels/channel[start-with(index,'10115')]"

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use netconf_client::{Error, Result, Session, SessionConfig, filter, format};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Args
// ============================================================================

/// A NETCONF client to interact with network devices.
#[derive(Debug, Parser)]
#[command(name = "netconf-client", version)]
#[command(group(ArgGroup::new("payload").required(true).args(["path", "file"])))]
struct Args {
    /// IP address of the NETCONF device.
    #[arg(long)]
    ip: String,

    /// Port number for the NETCONF connection.
    #[arg(long, default_value = "830")]
    port: String,

    /// Username for authentication.
    #[arg(long, default_value = "admin")]
    username: String,

    /// Password for authentication.
    #[arg(long)]
    password: String,

    /// SSH private key file, tried after the password.
    #[arg(long)]
    key: Option<PathBuf>,

    /// Inline RPC payload.
    #[arg(long)]
    path: Option<String>,

    /// File containing the RPC payload.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Write the reply to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// start-with filter applied to the last path element.
    #[arg(long)]
    filter: Option<String>,

    /// Connection timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    install_panic_hook();

    let args = Args::parse();
    init_logging(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = SessionConfig::builder()
        .host(&args.ip)
        .port(&args.port)
        .username(&args.username)
        .password(&args.password)
        .timeout(Duration::from_secs(args.timeout));
    let config = match &args.key {
        Some(key) => config.private_key(key),
        None => config,
    }
    .build()?;

    let payload = read_payload(args.path.as_deref(), args.file.as_deref())?;

    let mut session = Session::connect(config).await?;

    let capabilities_file = format!("{}_capabilities.xml", args.ip);
    if let Err(e) = fs::write(&capabilities_file, format::tidy(session.capabilities().as_str())) {
        session.disconnect().await;
        return Err(e.into());
    }
    info!(file = %capabilities_file, "Capabilities saved");

    let reply = session.run(&payload).await;
    session.disconnect().await;
    let mut output = format::tidy(&reply?);

    if let Some(expression) = &args.filter {
        output = apply_filter(output, expression);
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &output)?;
            println!("Response written to {}", path.display());
        }
        None => {
            println!("NETCONF Response:");
            println!("{output}");
        }
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns the inline payload, or the file payload with empty lines removed.
fn read_payload(inline: Option<&str>, file: Option<&Path>) -> Result<String> {
    match (inline, file) {
        (Some(inline), None) => Ok(inline.to_string()),
        (None, Some(file)) => {
            let data = fs::read_to_string(file).map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to read XML file {}: {e}", file.display()),
                ))
            })?;
            Ok(format::strip_empty_lines(&data))
        }
        _ => Err(Error::validation("choose exactly one of --path or --file")),
    }
}

/// Filters `reply`, keeping it unfiltered if the filter cannot be applied.
fn apply_filter(reply: String, expression: &str) -> String {
    match filter::filter_response(&reply, expression) {
        Ok(filtered) => filtered,
        Err(e) => {
            warn!(error = %e, "Filter not applied, showing unfiltered reply");
            reply
        }
    }
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let default = if debug {
        "netconf_client=debug"
    } else {
        "netconf_client=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reports panics as one line, without backtrace or source paths.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown failure".to_string());
        eprintln!("Panic: {message}");
    }));
}

// ============================================================================
// Tests
// ============================================================================
