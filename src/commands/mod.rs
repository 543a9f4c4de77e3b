//! Terminal front end: one line in, one action out.

pub mod console;

use crate::config::AppConfig;
use crate::controller::Controller;
use crate::peer::ice::check_ice_server_availability;
use crate::peer::types::ServerConfig;
use anyhow::Result;
use console::ConsoleUi;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

pub const HELP: &str = "\
Commands:
  /offer            create an offer (you start the connection)
  /accept <offer>   answer a pasted offer (your peer started it)
  /answer <answer>  apply the answer your peer sent back
  /reset            close the connection and start over
  /status           show connection state
  /help             show this help
  /quit             leave
Anything else is sent as a chat message once connected.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Offer,
    Accept(String),
    Answer(String),
    Reset,
    Status,
    Help,
    Quit,
    Say(String),
    Unknown(String),
}

/// Parses one line typed by the user. Blank lines are ignored.
pub fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Input::Say(line.to_string()));
    };

    let (cmd, arg) = match rest.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim().to_string()),
        None => (rest, String::new()),
    };
    Some(match cmd {
        "offer" => Input::Offer,
        "accept" => Input::Accept(arg),
        "answer" => Input::Answer(arg),
        "reset" => Input::Reset,
        "status" => Input::Status,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other.to_string()),
    })
}

/// Runs the interactive chat until stdin closes or the user quits.
pub async fn run_chat(config: AppConfig) -> Result<()> {
    let ui = Arc::new(ConsoleUi::new());
    let (mut controller, mut events) = Controller::new(config, ui);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(input) = parse_input(&line) else { continue };
                if !dispatch(&mut controller, input).await {
                    break;
                }
            }
            Some(event) = events.recv() => controller.handle_event(event).await,
        }
    }

    info!("leaving chat");
    controller.disconnect().await;
    Ok(())
}

/// Applies one input. Returns false when the user asked to quit.
async fn dispatch(controller: &mut Controller, input: Input) -> bool {
    let controls = controller.controls();
    match input {
        Input::Offer if !controls.create_offer => {
            println!("An offer was already created. Use /reset to start over.");
        }
        Input::Offer => controller.start_as_initiator().await,
        Input::Accept(_) if !controls.create_answer => {
            println!("An answer was already created. Use /reset to start over.");
        }
        Input::Accept(blob) => controller.respond_to_offer(&blob).await,
        Input::Answer(_) if !controls.set_answer => {
            println!("The answer was already applied. Use /reset to start over.");
        }
        Input::Answer(blob) => controller.apply_answer(&blob).await,
        Input::Reset => controller.disconnect().await,
        Input::Status => print_status(controller),
        Input::Help => println!("{HELP}"),
        Input::Quit => return false,
        Input::Say(text) => {
            if !controller.send(&text).await {
                println!("(not sent: not connected yet)");
            }
        }
        Input::Unknown(cmd) => println!("Unknown command /{cmd}. Type /help."),
    }
    true
}

fn print_status(controller: &Controller) {
    match controller.session() {
        Some(session) => {
            let channel = session
                .channel()
                .map(|c| c.ready_state().to_string())
                .unwrap_or_else(|| "none".into());
            println!(
                "session {} ({:?}): connection {}, channel {}, {} messages",
                session.id(),
                session.role(),
                session.connection_state(),
                channel,
                controller.messages().len()
            );
        }
        None => println!("no session; /offer or /accept <offer> to start"),
    }
}

/// Checks a single STUN/TURN server and prints the verdict.
pub async fn run_probe(server: ServerConfig, timeout_secs: u64) -> Result<()> {
    println!("Probing {} ...", server.url);
    let ok = check_ice_server_availability(&server, Duration::from_secs(timeout_secs)).await?;
    if ok {
        println!("{} is reachable", server.url);
    } else {
        println!("{} did not answer within {timeout_secs}s", server.url);
    }
    Ok(())
}
