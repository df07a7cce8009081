use anyhow::Result;
use clap::Parser;
use roomlink_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use roomlink_core::{
    message_types, Availability, ConnectOptions, MemoryChannel, RemoteControlHost,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "roomlink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run a scripted host session against the in-memory channel
    Demo {
        /// Room identifier for the demo channel
        #[arg(default_value = "meet123")]
        room: String,

        /// Seconds between join code rotations
        #[arg(long, default_value_t = 2)]
        refresh_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = LogLevel::from_str(&args.log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level '{}', using 'info'", args.log_level);
        LogLevel::Info
    });

    let config = LogConfig::new(log_level).json_format(args.json_logs);
    init_logging_with_config(config)?;

    roomlink_core::metrics::init_metrics();

    match args.command {
        Some(Command::Demo { room, refresh_secs }) => {
            run_demo(&room, Duration::from_secs(refresh_secs)).await?;
        }
        None => {
            info!("No command specified. Use --help for usage information.");
        }
    }

    Ok(())
}

async fn run_demo(room: &str, refresh_interval: Duration) -> Result<()> {
    info!(room, "starting demo host session");

    let channel = Arc::new(MemoryChannel::new(room));
    let host = RemoteControlHost::new(channel.clone());

    // Print every notification the host emits
    let mut notifications = host.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = notifications.recv().await {
            info!(?event, "notification");
        }
    });

    host.connect(ConnectOptions {
        join_code_refresh: Some(refresh_interval),
    })
    .await?;
    info!(join_code = %host.join_code(), "host ready for pairing");

    host.update_status(json!({"inMeeting": false}));

    // A remote controller pairs and sends a command
    let ack = channel.inject_command("req-1", "remote-1@conf", "go-to-meeting", r#"{"meeting": "standup"}"#);
    let ack = ack.await?;
    info!(request_id = %ack.request_id, to = %ack.to, "command acknowledged");

    // The application pushes an update toward the remote
    channel.inject_application_message(
        message_types::REMOTE_CONTROL_UPDATE,
        "remote-1@conf",
        json!({"view": "in-call"}),
    );

    host.send_message_to_remote_control(&"remote-1@conf".into(), json!({"audioMuted": true}))
        .await?;

    // Wait through one rotation, then the remote disappears
    tokio::time::sleep(refresh_interval + Duration::from_millis(200)).await;
    channel.inject_presence("remote-1@conf", Availability::Unavailable);
    tokio::time::sleep(Duration::from_millis(100)).await;

    host.disconnect().await?;
    printer.abort();

    info!(
        sent = channel.sent_messages().len(),
        "demo session complete"
    );
    Ok(())
}
