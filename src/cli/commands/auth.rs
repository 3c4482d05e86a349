use clap::Subcommand;
use serde_json::json;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::auth;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };

            let response = auth::login(ctx.client.as_ref(), ctx.storage.as_ref(), &ctx.store, &email, &password).await?;
            let session = ctx.store.read();

            output_success(
                &ctx.output,
                &format!("Logged in as {}", response.user.email),
                Some(json!({
                    "email": response.user.email,
                    "username": response.user.username,
                    "role": session.role(),
                })),
            )
        }
        AuthCommands::Logout => {
            auth::logout(ctx.client.as_ref(), ctx.storage.as_ref(), &ctx.store).await;
            output_success(&ctx.output, "Logged out", None)
        }
        AuthCommands::Status => {
            let session = ctx.store.read();
            match ctx.output {
                OutputFormat::Json => output_json(&json!({
                    "authenticated": session.is_authenticated(),
                    "email": session.email(),
                    "username": session.username(),
                    "role": session.role(),
                })),
                OutputFormat::Text => {
                    if session.is_authenticated() {
                        println!("Logged in as {}", session.email().unwrap_or_default());
                        if let Some(username) = session.username() {
                            println!("Username: {}", username);
                        }
                        println!("Role: {}", session.role().unwrap_or_default());
                    } else {
                        println!("Not logged in");
                    }
                    Ok(())
                }
            }
        }
    }
}

fn prompt_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;

    if !io::stdin().is_terminal() {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let password = {
        let _raw = RawMode::enable()?;
        read_hidden()
    };
    eprintln!();
    password
}

/// Terminal raw mode for the lifetime of the guard, so typed keys are not echoed.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Done,
    Cancelled,
}

fn read_hidden() -> anyhow::Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut password, key) {
                KeyOutcome::Continue => {}
                KeyOutcome::Done => return Ok(password),
                KeyOutcome::Cancelled => anyhow::bail!("Password entry cancelled"),
            }
        }
    }
}

fn apply_key(password: &mut String, key: KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyOutcome::Done,
        KeyCode::Esc => KeyOutcome::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyOutcome::Cancelled,
        KeyCode::Char(c) => {
            password.push(c);
            KeyOutcome::Continue
        }
        KeyCode::Backspace => {
            password.pop();
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}
