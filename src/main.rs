//! CLI for mqclient
//!
//! Subcommands:
//! - `publish`: send one message to a topic and exit
//! - `listen`: subscribe to a topic and print what arrives

use clap::{Parser, Subcommand};
use mqclient::MessageQueue;
use mqclient::config::{Settings, load_config};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mqclient", about = "Publish/subscribe message queue client")]
struct Cli {
    /// Broker host (overrides config)
    #[arg(long)]
    host: Option<String>,
    /// Broker port (overrides config)
    #[arg(long)]
    port: Option<u16>,
    /// Name of this client's delivery queue (overrides config)
    #[arg(long)]
    name: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish one message to a topic
    Publish { topic: String, body: String },
    /// Subscribe to a topic and print each message received
    Listen {
        topic: String,
        /// Exit after this many messages
        #[arg(long)]
        count: Option<usize>,
    },
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    mqclient::utils::logging::init(&settings.logging.level);

    let settings = apply_overrides(settings, &cli);
    let result = match cli.command {
        Command::Publish { topic, body } => run_publish(&settings, &topic, body),
        Command::Listen { topic, count } => run_listen(&settings, &topic, count),
    };

    if let Err(e) = result {
        error!("mqclient failed: {}", e);
        std::process::exit(1);
    }
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(host) = &cli.host {
        settings.broker.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.broker.port = port;
    }
    if let Some(name) = &cli.name {
        settings.client.name = name.clone();
    }
    settings
}

fn run_publish(
    settings: &Settings,
    topic: &str,
    body: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mq = MessageQueue::from_settings(settings);
    mq.start()?;
    mq.publish(topic, body);
    // stop flushes everything queued so far
    mq.stop();
    info!("published to {topic}");
    Ok(())
}

fn run_listen(
    settings: &Settings,
    topic: &str,
    count: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mq = MessageQueue::from_settings(settings);
    mq.subscribe(topic);
    mq.start()?;
    info!("{} listening on {topic}", mq.name());

    let mut received = 0;
    while count.is_none_or(|limit| received < limit) {
        match mq.retrieve() {
            Some(message) => {
                println!("{message}");
                received += 1;
            }
            None if mq.is_shutdown() => break,
            None => continue,
        }
    }

    mq.stop();
    Ok(())
}
