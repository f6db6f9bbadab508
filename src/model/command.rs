//! Chat command names and the dispatch table.
//!
//! Commands are a closed set. The chat front end parses a message into a
//! [`ParsedCommand`] and looks the handler up in a [`CommandRegistry`], which is checked at
//! startup to have a handler for every [`CommandName`].

use std::{collections::HashMap, fmt, str::FromStr};

use crate::error::command::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandName {
    Help,
    Reload,
    Player,
    Players,
    Trade,
    Team,
    Dfa,
    Spotrac,
    GetFile,
}

impl CommandName {
    pub const ALL: [CommandName; 9] = [
        Self::Help,
        Self::Reload,
        Self::Player,
        Self::Players,
        Self::Trade,
        Self::Team,
        Self::Dfa,
        Self::Spotrac,
        Self::GetFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Reload => "reload",
            Self::Player => "player",
            Self::Players => "players",
            Self::Trade => "trade",
            Self::Team => "team",
            Self::Dfa => "dfa",
            Self::Spotrac => "spotrac",
            Self::GetFile => "getfile",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == lowered)
            .ok_or_else(|| CommandError::UnknownCommand(lowered))
    }
}

/// A message split into command name and whitespace separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: CommandName,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Parses a chat message.
    ///
    /// # Arguments
    /// - `prefix` - Command prefix, e.g. `!`
    /// - `content` - Raw message text
    ///
    /// # Returns
    /// - `None` - Message is not addressed to the assistant (no prefix, or nothing after it)
    /// - `Some(Ok(ParsedCommand))` - Known command with its arguments
    /// - `Some(Err(CommandError::UnknownCommand))` - Prefixed, but not a known command
    pub fn parse(prefix: &str, content: &str) -> Option<Result<Self, CommandError>> {
        let rest = content.strip_prefix(prefix)?;
        let mut parts = rest.split_whitespace();
        let name = parts.next()?;

        Some(name.parse::<CommandName>().map(|name| Self {
            name,
            args: parts.map(str::to_string).collect(),
        }))
    }

    /// Arguments joined back into one string, e.g. a multi-word player name.
    pub fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

/// Handler lookup table keyed by [`CommandName`].
pub struct CommandRegistry<H> {
    handlers: HashMap<CommandName, H>,
}

impl<H> Default for CommandRegistry<H> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<H> CommandRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `name`, replacing any previous handler.
    pub fn register(mut self, name: CommandName, handler: H) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    pub fn get(&self, name: CommandName) -> Option<&H> {
        self.handlers.get(&name)
    }

    /// Checks that every command has a handler.
    ///
    /// # Returns
    /// - `Ok(())` - Registry is complete
    /// - `Err(CommandError::MissingHandlers)` - Lists the commands without a handler
    pub fn validate(&self) -> Result<(), CommandError> {
        let missing: Vec<&str> = CommandName::ALL
            .iter()
            .filter(|name| !self.handlers.contains_key(*name))
            .map(CommandName::as_str)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommandError::MissingHandlers(missing.join(", ")))
        }
    }
}
