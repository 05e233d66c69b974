use clap::{ArgAction, Parser, Subcommand};
use mkt_devinfo::config::{unescape_command, Config, ConfigError, ConfigLoader};
use mkt_devinfo::discovery::{discover_ports, DiscoveryMode, SystemEnumerator};
use mkt_devinfo::port::{PortIdentifier, PortOpener, SystemPortOpener};
use mkt_devinfo::reader::{select_port, BaudSelection};
use mkt_devinfo::{logging, ProbeError, ProbeResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "mkt-devinfo",
    version,
    about = "MediaTek (MKT) Device Info Tool: find serial ports, detect the baud rate, read device info.",
    long_about = "Scans serial ports, detects the baud rate a device answers AT commands on, and prints the response to AT+DEVICEINFO. Runs `read` when no subcommand is given."
)]
struct Args {
    /// Configuration file (defaults to the standard search locations).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List candidate serial ports.
    List {
        /// Discovery strategy: probe, static or system.
        #[arg(short, long)]
        mode: Option<DiscoveryMode>,
    },
    /// Detect the baud rate a device answers on.
    Detect {
        /// Port to probe.
        #[arg(short, long)]
        port: String,
    },
    /// Read the device info string.
    Read {
        /// Port to read from (defaults to the first discovered port).
        #[arg(short, long)]
        port: Option<String>,

        /// Use this baud rate instead of detecting it.
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        baud: Option<u32>,

        /// Command to send, with \r \n \t \\ \xNN escapes.
        #[arg(long, value_parser = parse_command)]
        command: Option<CommandBytes>,

        /// Discovery strategy used when no port is given.
        #[arg(short, long)]
        mode: Option<DiscoveryMode>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Read {
            port: None,
            baud: None,
            command: None,
            mode: None,
        }
    }
}

/// Raw bytes of a command given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandBytes(Vec<u8>);

fn parse_command(input: &str) -> Result<CommandBytes, String> {
    match unescape_command(input) {
        Ok(bytes) if bytes.is_empty() => Err("command must not be empty".to_string()),
        Ok(bytes) => Ok(CommandBytes(bytes)),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_failure(&format!("Error: {}", e), args.json);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.logging, args.verbose) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let command = args.command.unwrap_or_default();
    match execute(command, &config, SystemPortOpener, args.json) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_failure(&render_error(&e), args.json);
            ExitCode::FAILURE
        }
    }
}

/// Load the configuration. A file named with `--config` must load; the
/// standard locations fall back to defaults with a warning.
fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => ConfigLoader::load_from(path).map(ConfigLoader::into_config),
        None => Ok(match ConfigLoader::load() {
            Ok(loader) => loader.into_config(),
            Err(e) => {
                eprintln!("Warning: Failed to load config, using defaults: {}", e);
                ConfigLoader::with_defaults().into_config()
            }
        }),
    }
}

/// Print a failure on stderr, or as a JSON object on stdout with `--json`.
fn report_failure(message: &str, json: bool) {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{}", message);
    }
}

fn json_error(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// The message shown for a failed action.
fn render_error(error: &ProbeError) -> String {
    match error {
        ProbeError::NoPortsAvailable => "Please select a serial port (none detected)".to_string(),
        ProbeError::NoResponsiveBaudRate { .. } => {
            format!("Error detecting baud rate: {}", error)
        }
        _ => format!("Error: {}", error),
    }
}

/// Run one command and return what it prints on stdout.
fn execute<O>(command: Command, config: &Config, opener: O, json: bool) -> ProbeResult<String>
where
    O: PortOpener + Clone + 'static,
{
    match command {
        Command::List { mode } => list(config, mode, opener, json),
        Command::Detect { port } => detect(config, &PortIdentifier::from(port), opener, json),
        Command::Read {
            port,
            baud,
            command,
            mode,
        } => read(config, port, baud, command, mode, opener, json),
    }
}

fn list<O>(config: &Config, mode: Option<DiscoveryMode>, opener: O, json: bool) -> ProbeResult<String>
where
    O: PortOpener + 'static,
{
    let mode = mode.unwrap_or(config.discovery.mode);

    let rows: Vec<(PortIdentifier, String)> = if mode == DiscoveryMode::System {
        SystemEnumerator::with_skip_patterns(config.discovery.skip_patterns.clone())
            .list_detailed()?
    } else {
        let enumerator = config.discovery.enumerator(Some(mode), opener);
        discover_ports(enumerator.as_ref())?
            .into_iter()
            .map(|p| (p, String::new()))
            .collect()
    };

    if json {
        let ports: Vec<_> = rows
            .iter()
            .map(|(port, description)| serde_json::json!({ "port": port, "description": description }))
            .collect();
        return Ok(serde_json::Value::Array(ports).to_string());
    }
    if rows.is_empty() {
        return Ok("No serial ports detected".to_string());
    }

    let lines: Vec<String> = rows
        .into_iter()
        .map(|(port, description)| {
            if description.is_empty() {
                port.to_string()
            } else {
                format!("{:<24} {}", port.as_str(), description)
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

fn detect<O: PortOpener>(
    config: &Config,
    port: &PortIdentifier,
    opener: O,
    json: bool,
) -> ProbeResult<String> {
    let negotiator = config.negotiation.negotiator(opener)?;
    let baud_rate = negotiator.detect_baud_rate(port)?;

    Ok(if json {
        serde_json::json!({ "port": port, "baud_rate": baud_rate }).to_string()
    } else {
        baud_rate.to_string()
    })
}

fn read<O>(
    config: &Config,
    port: Option<String>,
    baud: Option<u32>,
    command: Option<CommandBytes>,
    mode: Option<DiscoveryMode>,
    opener: O,
    json: bool,
) -> ProbeResult<String>
where
    O: PortOpener + Clone + 'static,
{
    // Discovery only runs when no port was named
    let port = match port {
        Some(name) => PortIdentifier::from(name),
        None => {
            let enumerator = config.discovery.enumerator(mode, opener.clone());
            select_port(&discover_ports(enumerator.as_ref())?, None)?
        }
    };

    let mut reader = config.reader(opener)?;
    if let Some(CommandBytes(bytes)) = command {
        reader = reader.with_command(bytes);
    }

    let selection = baud.map_or(BaudSelection::Auto, BaudSelection::Fixed);
    let reading = reader.read(&port, selection)?;

    Ok(if json {
        serde_json::to_string(&reading).unwrap_or_else(|_| reading.text.clone())
    } else {
        format!("Device Info: {}", reading.text)
    })
}
