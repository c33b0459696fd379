//! Slash command parser for the interactive client.
//!
//! Lines starting with `/` are commands; everything else is a chat message.

/// Result of parsing an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientInput {
    /// Regular chat message (empty for blank lines).
    Message(String),
    /// Parsed command.
    Command(ClientCommand),
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Change the display name.
    Name(String),
    /// Change the avatar URI (empty clears it).
    Avatar(String),
    /// Show the current presence roster.
    Who,
    /// Show the message log.
    Log,
    /// Connect to the coordinator.
    Connect,
    /// Disconnect from the coordinator.
    Disconnect,
    /// Show help message.
    Help,
    /// Exit the client.
    Quit,
    /// Unknown command.
    Unknown(String),
}

/// Parse an input line into a message or command.
pub fn parse_input(input: &str) -> ClientInput {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return ClientInput::Message(String::new());
    }

    if !trimmed.starts_with('/') {
        return ClientInput::Message(trimmed.to_string());
    }

    // Parse command
    let without_slash = &trimmed[1..];
    let (cmd, args) = match without_slash.find(' ') {
        Some(pos) => (&without_slash[..pos], without_slash[pos + 1..].trim()),
        None => (without_slash, ""),
    };

    let command = match cmd.to_lowercase().as_str() {
        "name" | "n" | "nick" => ClientCommand::Name(args.to_string()),
        "avatar" | "a" => ClientCommand::Avatar(args.to_string()),
        "who" | "w" | "users" | "list" => ClientCommand::Who,
        "log" | "l" | "history" => ClientCommand::Log,
        "connect" | "c" => ClientCommand::Connect,
        "disconnect" | "d" | "dc" => ClientCommand::Disconnect,
        "help" | "h" | "?" => ClientCommand::Help,
        "quit" | "q" | "exit" => ClientCommand::Quit,
        _ => ClientCommand::Unknown(cmd.to_string()),
    };

    ClientInput::Command(command)
}

/// Command information for help display.
pub struct CommandInfo {
    /// Command name.
    pub name: &'static str,
    /// Command aliases.
    pub aliases: &'static [&'static str],
    /// Command syntax.
    pub syntax: &'static str,
    /// Command description.
    pub description: &'static str,
}

/// Get all available command information.
pub fn get_command_help() -> Vec<CommandInfo> {
    vec![
        CommandInfo {
            name: "name",
            aliases: &["n", "nick"],
            syntax: "/name <display name>",
            description: "Change your display name",
        },
        CommandInfo {
            name: "avatar",
            aliases: &["a"],
            syntax: "/avatar [uri]",
            description: "Change your avatar (no argument clears it)",
        },
        CommandInfo {
            name: "who",
            aliases: &["w", "users", "list"],
            syntax: "/who",
            description: "Show who is currently present",
        },
        CommandInfo {
            name: "log",
            aliases: &["l", "history"],
            syntax: "/log",
            description: "Show the message log received so far",
        },
        CommandInfo {
            name: "connect",
            aliases: &["c"],
            syntax: "/connect",
            description: "Connect to the coordinator",
        },
        CommandInfo {
            name: "disconnect",
            aliases: &["d", "dc"],
            syntax: "/disconnect",
            description: "Disconnect from the coordinator",
        },
        CommandInfo {
            name: "help",
            aliases: &["h", "?"],
            syntax: "/help",
            description: "Show this help message",
        },
        CommandInfo {
            name: "quit",
            aliases: &["q", "exit"],
            syntax: "/quit",
            description: "Exit the client",
        },
    ]
}

/// Format the help message for display.
pub fn format_help() -> String {
    let mut lines = Vec::new();
    lines.push("=== Commands ===".to_string());

    for info in get_command_help() {
        lines.push(format!("{:<24} {}", info.syntax, info.description));
        if !info.aliases.is_empty() {
            lines.push(format!("{:<24}   aliases: /{}", "", info.aliases.join(", /")));
        }
    }

    lines.join("\n")
}
