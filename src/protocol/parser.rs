//! Line protocol parser.
//!
//! Turns one line of input into a structured `Command` for the session
//! loop to dispatch on.

use tracing::warn;

use crate::world::{BuildOrderId, PlanetId, ShipId, ShipKind};

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handshake; the engine identifies itself and lists its options.
    Hello,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Discard the session and generate a fresh galaxy.
    NewGame,

    /// `build <planet> <kind>`
    Build { planet: PlanetId, kind: ShipKind },

    /// `cancel <planet> <entry>`
    Cancel { planet: PlanetId, order: BuildOrderId },

    /// `send <source> <dest> <ship,ship,...>`
    Send {
        source: PlanetId,
        destination: PlanetId,
        ships: Vec<ShipId>,
    },

    /// Resolve the pending battle by fighting.
    Fight,

    /// Resolve the pending battle by withdrawing.
    Withdraw,

    /// Choose where withdrawn ships go: `retreat <planet>`.
    Retreat { planet: PlanetId },

    /// End the human turn and run the turn sequence.
    Advance,

    Score,

    Snapshot,

    /// Replace the session with a JSON snapshot: `restore <json>`.
    Restore { json: String },

    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "hello" => Some(Command::Hello),
        "isready" => Some(Command::IsReady),
        "newgame" => Some(Command::NewGame),
        "fight" => Some(Command::Fight),
        "withdraw" => Some(Command::Withdraw),
        "advance" => Some(Command::Advance),
        "score" => Some(Command::Score),
        "snapshot" => Some(Command::Snapshot),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(&tokens),
        "build" => parse_build(&tokens),
        "cancel" => parse_cancel(&tokens),
        "send" => parse_send(&tokens),
        "retreat" => parse_retreat(&tokens),
        "restore" => parse_restore(trimmed),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let (name, value) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value_parts = &tokens[vi + 1..];
            let value = if value_parts.is_empty() { None } else { Some(value_parts.join(" ")) };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `build <planet> <kind>`.
fn parse_build(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!("malformed build: expected 'build <planet> <kind>'");
        return None;
    }
    let planet = parse_id(tokens[1], "planet").map(PlanetId)?;
    let Some(kind) = ShipKind::from_name(tokens[2]) else {
        warn!(kind = tokens[2], "unknown ship kind");
        return None;
    };
    Some(Command::Build { planet, kind })
}

/// Parses `cancel <planet> <entry>`.
fn parse_cancel(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!("malformed cancel: expected 'cancel <planet> <entry>'");
        return None;
    }
    let planet = parse_id(tokens[1], "planet").map(PlanetId)?;
    let order = parse_id(tokens[2], "build entry").map(BuildOrderId)?;
    Some(Command::Cancel { planet, order })
}

/// Parses `send <source> <dest> <ship,ship,...>`.
fn parse_send(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 4 {
        warn!("malformed send: expected 'send <source> <dest> <ship,ship,...>'");
        return None;
    }
    let source = parse_id(tokens[1], "planet").map(PlanetId)?;
    let destination = parse_id(tokens[2], "planet").map(PlanetId)?;
    let ships = tokens[3]
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(s, "ship").map(ShipId))
        .collect::<Option<Vec<_>>>()?;
    Some(Command::Send { source, destination, ships })
}

/// Parses `retreat <planet>`.
fn parse_retreat(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 2 {
        warn!("malformed retreat: expected 'retreat <planet>'");
        return None;
    }
    let planet = parse_id(tokens[1], "planet").map(PlanetId)?;
    Some(Command::Retreat { planet })
}

/// Parses `restore <json>`. The JSON is everything after the keyword.
fn parse_restore(line: &str) -> Option<Command> {
    let json = line["restore".len()..].trim();
    if json.is_empty() {
        warn!("malformed restore: expected 'restore <json>'");
        return None;
    }
    Some(Command::Restore { json: json.to_string() })
}

fn parse_id(token: &str, what: &'static str) -> Option<u32> {
    match token.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(token, what, "invalid id");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_commands() {
        assert_eq!(parse_command("hello"), Some(Command::Hello));
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("newgame"), Some(Command::NewGame));
        assert_eq!(parse_command("fight"), Some(Command::Fight));
        assert_eq!(parse_command("withdraw"), Some(Command::Withdraw));
        assert_eq!(parse_command("advance"), Some(Command::Advance));
        assert_eq!(parse_command("score"), Some(Command::Score));
        assert_eq!(parse_command("snapshot"), Some(Command::Snapshot));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("launch 1 2"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        assert_eq!(
            parse_command("setoption name Difficulty value hard"),
            Some(Command::SetOption {
                name: "Difficulty".to_string(),
                value: Some("hard".to_string()),
            })
        );
    }

    #[test]
    fn parse_setoption_no_value() {
        assert_eq!(
            parse_command("setoption name Config"),
            Some(Command::SetOption { name: "Config".to_string(), value: None })
        );
        assert_eq!(parse_command("setoption Difficulty hard"), None);
    }

    #[test]
    fn parse_build_and_cancel() {
        assert_eq!(
            parse_command("build 3 cruiser"),
            Some(Command::Build { planet: PlanetId(3), kind: ShipKind::Cruiser })
        );
        assert_eq!(parse_command("build 3 dreadnought"), None);
        assert_eq!(parse_command("build x scout"), None);
        assert_eq!(
            parse_command("cancel 3 12"),
            Some(Command::Cancel { planet: PlanetId(3), order: BuildOrderId(12) })
        );
        assert_eq!(parse_command("cancel 3"), None);
    }

    #[test]
    fn parse_send_ship_list() {
        assert_eq!(
            parse_command("send 0 5 4,7,9"),
            Some(Command::Send {
                source: PlanetId(0),
                destination: PlanetId(5),
                ships: vec![ShipId(4), ShipId(7), ShipId(9)],
            })
        );
        assert_eq!(parse_command("send 0 5 4,x"), None);
        assert_eq!(parse_command("send 0 5"), None);
    }

    #[test]
    fn parse_retreat_destination() {
        assert_eq!(parse_command("retreat 2"), Some(Command::Retreat { planet: PlanetId(2) }));
        assert_eq!(parse_command("retreat"), None);
    }

    #[test]
    fn parse_restore_keeps_json_intact() {
        assert_eq!(
            parse_command("restore {\"turn\": 3, \"name\": \"a b\"}"),
            Some(Command::Restore { json: "{\"turn\": 3, \"name\": \"a b\"}".to_string() })
        );
        assert_eq!(parse_command("restore   "), None);
    }

    #[test]
    fn parse_with_leading_trailing_whitespace() {
        assert_eq!(parse_command("  advance  \n"), Some(Command::Advance));
    }
}
