//! shelfbot console transport.
//!
//! Reads actions from stdin, routes them through the core bot and prints
//! the responses. Each acting user gets a private conversation.

mod console;

use clap::Parser;
use console::{help_text, parse_line, render_response, ConsoleInput};
use log::{error, info};
use shelfbot_core::bot::{Actor, Bot, Inbound};
use shelfbot_core::db::Connection;
use shelfbot_core::{
    default_log_level, init_logging, open_from_url, AccessPolicy, BotConfig, LogTarget,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Dialogue states untouched for this long are dropped.
const DIALOGUE_IDLE_LIMIT: Duration = Duration::from_secs(30 * 60);
const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "shelfbot", version, about = "Conversational book catalog (console transport)")]
struct Cli {
    /// Database URL or SQLite path; overrides DATABASE_URL.
    #[arg(long)]
    database: Option<String>,

    /// Acting user id.
    #[arg(long, default_value = "1")]
    user: i64,

    /// Acting user handle.
    #[arg(long)]
    handle: Option<String>,

    /// Absolute log directory; overrides LOG_DIR. Logs go to stderr when unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // A missing `.env` is fine.
    let _ = dotenvy::dotenv();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("shelfbot: {err}");
            return ExitCode::FAILURE;
        }
    };

    let target = match cli.log_dir.clone().or_else(|| config.log_dir.clone()) {
        Some(dir) => LogTarget::Directory(dir),
        None => LogTarget::Stderr,
    };
    let level = config.log_level.as_deref().unwrap_or(match target {
        LogTarget::Directory(_) => default_log_level(),
        LogTarget::Stderr => "warn",
    });
    if let Err(err) = init_logging(level, target) {
        eprintln!("shelfbot: logging disabled: {err}");
    }

    let database_url = cli.database.clone().unwrap_or_else(|| config.database_url.clone());
    let conn = match open_from_url(&database_url) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=app_start module=cli status=error reason=db_open error={err}");
            eprintln!("shelfbot: cannot open database `{database_url}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let bot = Bot::new(AccessPolicy::new(config.admin_ids.iter().copied()));
    info!(
        "event=app_start module=cli status=ok admin_features={}",
        if bot.engine().policy().has_admins() { "enabled" } else { "disabled" }
    );

    match run(&bot, &conn, Actor {
        id: cli.user,
        handle: cli.handle,
    }) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=console_io module=cli status=error error={err}");
            eprintln!("shelfbot: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(bot: &Bot, conn: &Connection, mut actor: Actor) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut last_choices = Vec::new();
    let mut last_sweep = Instant::now();

    writeln!(stdout, "{}", help_text())?;
    prompt(&mut stdout, &actor)?;

    for line in stdin.lock().lines() {
        let line = line?;
        if last_sweep.elapsed() >= EXPIRY_SWEEP_INTERVAL {
            bot.expire_idle(DIALOGUE_IDLE_LIMIT);
            last_sweep = Instant::now();
        }

        match parse_line(&line, &last_choices) {
            ConsoleInput::Quit => break,
            ConsoleInput::Empty => {}
            ConsoleInput::Help => writeln!(stdout, "{}", help_text())?,
            ConsoleInput::Invalid(reason) => writeln!(stdout, "! {reason}")?,
            ConsoleInput::SwitchUser { id, handle } => {
                actor = Actor { id, handle };
                last_choices.clear();
                writeln!(stdout, "now acting as user {id}")?;
            }
            ConsoleInput::Payload(payload) => {
                let inbound = Inbound {
                    conversation: actor.id,
                    actor: actor.clone(),
                    payload,
                };
                match bot.handle(conn, &inbound) {
                    Ok(response) => {
                        let (text, choices) = render_response(&response);
                        write!(stdout, "{text}")?;
                        last_choices = choices;
                    }
                    Err(err) => {
                        error!(
                            "event=bot_handle module=cli status=error conversation={} error={}",
                            inbound.conversation, err
                        );
                        writeln!(stdout, "Произошла ошибка, попробуйте позже ❌")?;
                    }
                }
            }
        }
        prompt(&mut stdout, &actor)?;
    }
    Ok(())
}

fn prompt(stdout: &mut impl Write, actor: &Actor) -> std::io::Result<()> {
    write!(stdout, "[{}]> ", actor.id)?;
    stdout.flush()
}
