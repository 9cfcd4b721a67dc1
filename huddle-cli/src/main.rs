mod input;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use dialoguer::Input as Prompt;
use huddle_client::{
    CallPhase, ClientConfig, ClientEngine, DEFAULT_SERVER_URL, EngineCommand, EngineEvent,
    MediaConstraints, RtcMediaDevices, WebRtcConnector,
};
use huddle_core::IceServerConfig;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::input::{HELP, Input, parse_line};
use crate::view::JoinTracker;

#[derive(Parser)]
#[command(name = "huddle", about = "Join a huddle room from the terminal")]
struct Cli {
    /// Relay WebSocket endpoint.
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[arg(short, long, default_value = "lobby")]
    room: String,

    /// Display name; asked for when missing.
    #[arg(short, long)]
    name: Option<String>,

    #[arg(long)]
    user_id: Option<String>,

    #[arg(long)]
    no_audio: bool,

    #[arg(long)]
    no_video: bool,

    /// Extra STUN/TURN URL, may be repeated.
    #[arg(long = "ice")]
    ice: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,huddle_client=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(cli)?;

    println!(
        "{} {} {}",
        "📡 Connecting to".cyan(),
        config.server_url.bold(),
        format!("as {}", config.user_name).dimmed()
    );
    let relay = huddle_client::connect(&config.server_url).await?;

    let (engine, mut events) = ClientEngine::new(
        config.clone(),
        Arc::new(relay.outbound),
        Arc::new(WebRtcConnector::new()),
        Arc::new(RtcMediaDevices::new()),
    );
    let (commands, command_rx) = mpsc::unbounded_channel();
    let engine_task = tokio::spawn(engine.run(relay.inbound, command_rx));

    tokio::spawn(read_stdin(commands));

    let mut join = JoinTracker::default();
    while let Some(event) = events.recv().await {
        if join.observe(&event) {
            println!(
                "{} {}",
                "✅ Joined room".green().bold(),
                config.room_id.to_string().bold()
            );
            println!("{}", HELP.dimmed());
        }
        print_event(event);
    }

    engine_task.await.context("Engine task failed")?;
    println!("{}", "👋 Left the room".green());
    Ok(())
}

fn build_config(cli: Cli) -> Result<ClientConfig> {
    let name = match cli.name {
        Some(name) => name,
        None => Prompt::<String>::new()
            .with_prompt("Display name")
            .interact_text()
            .context("Failed to read display name")?,
    };

    let mut config = ClientConfig::new(cli.room.as_str(), name);
    config.server_url = cli.server;
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }
    config.constraints = MediaConstraints {
        audio: !cli.no_audio,
        video: !cli.no_video,
    };
    config.ice_servers = cli
        .ice
        .into_iter()
        .map(|url| IceServerConfig {
            urls: vec![url],
            username: None,
            credential: None,
        })
        .collect();

    Ok(config)
}

async fn read_stdin(commands: mpsc::UnboundedSender<EngineCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        match parse_line(&line) {
            Input::Command(command) => {
                let leaving = command == EngineCommand::Leave;
                if commands.send(command).is_err() || leaving {
                    return;
                }
            }
            Input::Help => println!("{}", HELP.dimmed()),
            Input::Unknown(word) => println!("{} {}", "Unknown command".yellow(), word),
            Input::Empty => {}
        }
    }

    // stdin closed
    let _ = commands.send(EngineCommand::Leave);
}

fn print_event(event: EngineEvent) {
    match event {
        EngineEvent::Welcome { connection_id } => {
            println!("{}", format!("Connected as {}", connection_id).dimmed());
        }
        EngineEvent::Roster(members) => {
            let names: Vec<_> = members.iter().map(|p| p.user_name.as_str()).collect();
            if names.is_empty() {
                println!("{}", "👥 Nobody else is here".dimmed());
            } else {
                println!("{} {}", "👥 In the room:".cyan(), names.join(", "));
            }
        }
        EngineEvent::Chat(message) => {
            let sender = if message.own {
                message.sender.green().bold()
            } else {
                message.sender.blue().bold()
            };
            println!("[{}] {}: {}", message.timestamp.dimmed(), sender, message.body);
        }
        EngineEvent::IncomingCall { caller_name, .. } => {
            println!(
                "{} {}",
                format!("📞 {} is calling.", caller_name).magenta().bold(),
                "/accept or /reject".dimmed()
            );
        }
        EngineEvent::CallPhase(phase) => match phase {
            CallPhase::Starting => println!("{}", "📞 Calling...".magenta()),
            CallPhase::Active => println!("{}", "🎥 Call connected".green().bold()),
            CallPhase::Ended => println!("{}", "📴 Call ended".magenta()),
            CallPhase::Idle => {}
        },
        EngineEvent::CallTick(elapsed) => {
            if elapsed % 60 == 0 {
                println!("{}", format!("⏱  {:02}:{:02}", elapsed / 60, elapsed % 60).dimmed());
            }
        }
        EngineEvent::CallRejected { user_name, .. } => {
            println!("{}", format!("{} declined the call", user_name).yellow());
        }
        EngineEvent::RemoteStream(stream) => {
            println!(
                "{}",
                format!("Receiving {} from {}", stream.kind, stream.remote).dimmed()
            );
        }
        EngineEvent::Notice(text) => println!("{} {}", "ℹ".cyan(), text),
    }
}
