//! Interactive websocket client for the relay.
//!
//! Usage:
//!
//! ```bash
//! # Run server
//! cargo run -p sync-server
//!
//! # In another terminal
//! cargo run -p sync-server --example ws_client
//! ```
//!
//! Then type commands like:
//!
//! ```text
//! screen tv-1
//! panel
//! play tv-1,tv-2
//! status tv-1 {"playing":true}
//! ```

use std::env;
use std::error::Error;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::{SinkExt, StreamExt};
use sync_core::{InboundEvent, RegisterScreen, ScreenStatus, SyncAction, SyncCommand};
use sync_protocol::{decode_envelope, encode_inbound};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Where to connect: env override or default.
    let url = env::var("SYNC_RELAY_URL").unwrap_or_else(|_| "ws://127.0.0.1:3001/ws".to_string());

    println!("Connecting to {}...", url);
    let (ws, _) = connect_async(url.as_str()).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();
    println!("Connected.");
    println!("Commands:");
    println!("  screen <id>            register as a screen");
    println!("  panel                  register as a control panel");
    println!("  play|pause|stop a,b    send a sync command");
    println!("  status <id> <json>     report screen status");
    println!("Type 'quit' or 'exit' to leave.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("\nEOF on stdin, exiting client.");
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                    println!("Exiting client.");
                    break;
                }

                let event = match parse_command(trimmed) {
                    Some(e) => e,
                    None => {
                        eprintln!("Could not parse command.");
                        continue;
                    }
                };

                let frame = encode_inbound(&event)?;
                println!(">> {}", frame);
                ws_tx.send(Message::Text(frame.into())).await?;
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match decode_envelope(text.as_str()) {
                        Ok(env) => match SyncAction::from_command_event(&env.event) {
                            Some(action) => println!("<< {} at {}", action.as_str(), env.data["timestamp"]),
                            None => println!("<< {} {}", env.event, env.data),
                        },
                        Err(e) => eprintln!("Undecodable frame: {}", e),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        match frame {
                            Some(f) => println!("Server closed connection: {} ({})", f.reason.as_str(), u16::from(f.code)),
                            None => println!("Server closed connection."),
                        }
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        eprintln!("Read error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    Ok(())
}

fn parse_command(line: &str) -> Option<InboundEvent> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let cmd = parts.next()?;

    match cmd {
        "screen" => Some(InboundEvent::RegisterScreen(RegisterScreen {
            screen_id: parts.next().map(str::to_string),
        })),
        "panel" => Some(InboundEvent::RegisterControlPanel),
        "play" | "pause" | "stop" => {
            let action = SyncAction::from_request_event(&format!("sync_{}", cmd))?;
            let target_screens = parts
                .next()
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            Some(InboundEvent::Sync(SyncCommand {
                action,
                target_screens,
                timestamp: now_millis().into(),
            }))
        }
        "status" => {
            let screen_id = parts.next().map(str::to_string);
            let status = match parts.next() {
                Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| raw.into()),
                None => serde_json::Value::Null,
            };
            Some(InboundEvent::ScreenStatus(ScreenStatus { screen_id, status }))
        }
        _ => None,
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
