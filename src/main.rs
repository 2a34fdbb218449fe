use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use morse_relay::config::{BridgeConfig, RelayConfig};
use morse_relay::morse;
use morse_relay::relay::Relay;
use morse_relay::scheduler::Speed;
use morse_relay::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "morse-relay")]
#[command(version)]
#[command(about = "Queue text messages and key them one at a time on a Morse device")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the relay: HTTP API plus dispatcher
    Serve(ServeArgs),

    /// Print the Morse rendering of a message without queuing it
    Encode {
        /// Text to encode
        text: String,

        /// Speed in words per minute, clamped to 5..=30
        #[arg(long, default_value = "17", allow_hyphen_values = true)]
        speed: String,

        /// Output format
        #[arg(long, short = 'o', default_value = "table")]
        output: OutputFormat,
    },
}

// =============================================================================
// Server Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to bind the HTTP API on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port for the HTTP API
    #[arg(long, default_value = "7000")]
    port: u16,

    /// Initial default speed in words per minute, clamped to 5..=30
    #[arg(long, default_value = "17", allow_hyphen_values = true)]
    speed: String,

    /// Milliseconds between two dispatcher passes
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    poll_ms: u64,

    /// Seconds allowed for one playback before it is recorded as failed
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Keying device to drive
    #[arg(long, value_enum, default_value = "sim")]
    bridge: BridgeKind,

    /// Device address for the tcp bridge (host:port)
    #[arg(long, required_if_eq("bridge", "tcp"))]
    bridge_addr: Option<String>,

    /// Keying-time multiplier for the simulated bridge (0 plays instantly)
    #[arg(long, default_value = "1.0")]
    time_scale: f64,
}

#[derive(Debug, Clone, ValueEnum)]
enum BridgeKind {
    Sim,
    Tcp,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct EncodeOutput {
    text: String,
    morse: String,
    skipped: Vec<char>,
    units: u64,
    duration_ms: u64,
    speed: Speed,
}

// =============================================================================
// Command Handlers
// =============================================================================

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let listen_addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let default_speed = Speed::parse(&args.speed)?;

    let bridge = match args.bridge {
        BridgeKind::Sim => BridgeConfig::Simulated {
            time_scale: args.time_scale,
        },
        BridgeKind::Tcp => BridgeConfig::Tcp {
            addr: args
                .bridge_addr
                .ok_or("--bridge-addr is required with --bridge tcp")?,
        },
    };

    let config = RelayConfig {
        listen_addr,
        default_speed,
        poll_interval_ms: args.poll_ms,
        actuator_timeout_secs: args.timeout_secs,
        bridge,
    };

    tracing::info!(
        listen_addr = %config.listen_addr,
        speed = %config.default_speed,
        poll_ms = config.poll_interval_ms,
        timeout_secs = config.actuator_timeout_secs,
        bridge = ?config.bridge,
        "Starting morse-relay"
    );

    let cancel = install_shutdown_handler();
    Relay::new(config).run(cancel).await?;
    Ok(())
}

fn handle_encode(
    text: String,
    speed: &str,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let speed = Speed::parse(speed)?;
    let encoded = morse::encode(&text);

    match output_format {
        OutputFormat::Json => {
            let output = EncodeOutput {
                morse: encoded.render(),
                skipped: encoded.skipped().to_vec(),
                units: encoded.units(),
                duration_ms: encoded.duration(speed).as_millis() as u64,
                speed,
                text,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            if encoded.is_empty() {
                println!("Nothing to encode.");
                return Ok(());
            }
            for letter in encoded.letters() {
                println!("{:<3} {}", letter.ch, letter.code);
            }
            println!("{}", "-".repeat(40));
            println!("Morse:    {}", encoded.render());
            println!(
                "Duration: {} ms at {} wpm",
                encoded.duration(speed).as_millis(),
                speed
            );
            if !encoded.skipped().is_empty() {
                let skipped: String = encoded.skipped().iter().collect();
                println!("Skipped:  {}", skipped);
            }
        }
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Serve(serve_args) => {
            run_server(serve_args).await?;
        }
        Commands::Encode {
            text,
            speed,
            output,
        } => {
            handle_encode(text, &speed, &output)?;
        }
    }

    Ok(())
}
