//! Line-oriented console transport.
//!
//! # Responsibility
//! - Turn stdin lines into inbound payloads.
//! - Print responses with numbered choices so `#N` can pick one.

use shelfbot_core::bot::{Choice, Command, Menu, Payload, Response};
use std::fmt::Write as _;

/// Parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Payload(Payload),
    /// `/as <id> [handle]`: act as another user.
    SwitchUser { id: i64, handle: Option<String> },
    Quit,
    Help,
    Empty,
    /// Input that cannot be interpreted; carries the reason.
    Invalid(String),
}

/// Parses a line against the choices of the last response.
pub fn parse_line(line: &str, last_choices: &[Choice]) -> ConsoleInput {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleInput::Empty;
    }

    if let Some(index) = line.strip_prefix('#') {
        return match index.trim().parse::<usize>() {
            Ok(number) if number >= 1 && number <= last_choices.len() => {
                ConsoleInput::Payload(Payload::Choice(last_choices[number - 1].clone()))
            }
            _ => ConsoleInput::Invalid(format!(
                "no choice `{line}`; pick #1..#{}",
                last_choices.len()
            )),
        };
    }

    let Some(command_line) = line.strip_prefix('/') else {
        return ConsoleInput::Payload(Payload::Text(line.to_string()));
    };
    let mut parts = command_line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    match name {
        "quit" | "exit" => ConsoleInput::Quit,
        "help" => ConsoleInput::Help,
        "as" => match parts.next().map(str::parse::<i64>) {
            Some(Ok(id)) => ConsoleInput::SwitchUser {
                id,
                handle: parts.next().map(str::to_string),
            },
            _ => ConsoleInput::Invalid("usage: /as <id> [handle]".to_string()),
        },
        other => match Command::from_name(other) {
            Some(command) => ConsoleInput::Payload(Payload::Command(command)),
            None => ConsoleInput::Invalid(format!("unknown command `/{other}`; try /help")),
        },
    }
}

/// Renders a response; returns the text and the choices in `#N` order.
pub fn render_response(response: &Response) -> (String, Vec<Choice>) {
    let mut out = String::new();
    let mut choices = Vec::new();
    out.push_str(&response.text);
    out.push('\n');

    for row in &response.choices {
        let cells = row
            .iter()
            .map(|button| {
                choices.push(button.choice.clone());
                format!("[#{}] {}", choices.len(), button.label)
            })
            .collect::<Vec<_>>();
        let _ = writeln!(out, "  {}", cells.join("   "));
    }

    if let Some(menu) = response.menu {
        let _ = writeln!(out, "{}", render_menu(menu));
    }
    (out, choices)
}

fn render_menu(menu: Menu) -> String {
    let items = menu
        .rows()
        .into_iter()
        .flatten()
        .map(|command| format!("/{} {}", command.name(), command.label()))
        .collect::<Vec<_>>();
    format!("menu: {}", items.join(" | "))
}

pub fn help_text() -> String {
    let commands = Command::ALL
        .into_iter()
        .map(|command| format!("  /{:<8} {}", command.name(), command.label()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "commands:\n{commands}\n  /as <id> [handle]  act as another user\n  /quit\n#N picks a numbered choice; any other line is sent as text"
    )
}
