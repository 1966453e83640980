//! services/station/src/console/protocol.rs
//!
//! Defines the line protocol typed at the station terminal.
//!
//! Lines starting with `/` are commands. Everything else is scanner input.

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Remove one scan from the active bag.
    Remove(String),
    /// Open the registration form for a tag.
    Edit(String),
    /// Start a bulk registration.
    Group,
    /// Close the active bag into history.
    Archive,
    /// Empty the active bag without archiving.
    Clear,
    /// Add a brand; asks for the name when none is given.
    Brand(Option<String>),
    List,
    Catalog,
    Brands,
    Cep(String),
    Guest { id: String, room: String },
    Help,
    Quit,
    /// Anything unrecognised, echoed back with the help hint.
    Unknown(String),
}

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Scan(String),
}

pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Input::Scan(line.to_string());
    };

    let (verb, rest) = match body.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (body, ""),
    };
    let arg = || rest.to_string();

    let command = match verb.to_lowercase().as_str() {
        "rm" | "remove" if !rest.is_empty() => Command::Remove(arg()),
        "edit" | "reg" if !rest.is_empty() => Command::Edit(arg()),
        "group" => Command::Group,
        "archive" | "close" => Command::Archive,
        "clear" => Command::Clear,
        "brand" => Command::Brand((!rest.is_empty()).then(arg)),
        "list" | "ls" => Command::List,
        "catalog" => Command::Catalog,
        "brands" => Command::Brands,
        "cep" => Command::Cep(arg()),
        "guest" => {
            let mut parts = rest.split_whitespace();
            let id = parts.next().unwrap_or_default().to_string();
            let room = parts.next().unwrap_or("-").to_string();
            Command::Guest { id, room }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    };
    Input::Command(command)
}
