//! Presentation edit commands.
//!
//! Editors never write record memory directly; they submit one of these
//! commands and `AppRecord::apply` routes it to the matching setter.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// One user edit against an app record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    SetTitle(String),
    SetHeadline(String),
    SetPrivate(bool),
    TogglePrivate,
}

impl EditCommand {
    /// Parses the textual command form used by scripted editors.
    ///
    /// Accepted forms:
    /// - `title=<text>` and `headline=<text>` (text may be empty)
    /// - `private=true|false`
    /// - `toggle-private`
    ///
    /// Only the key is trimmed; text values are kept byte-for-byte.
    pub fn parse(input: &str) -> Result<Self, CommandParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CommandParseError::Empty);
        }
        if trimmed == "toggle-private" {
            return Ok(Self::TogglePrivate);
        }

        let Some((key, value)) = input.split_once('=') else {
            return Err(CommandParseError::UnknownCommand(trimmed.to_string()));
        };
        match key.trim() {
            "title" => Ok(Self::SetTitle(value.to_string())),
            "headline" => Ok(Self::SetHeadline(value.to_string())),
            "private" => match value.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Self::SetPrivate(true)),
                "false" => Ok(Self::SetPrivate(false)),
                other => Err(CommandParseError::InvalidFlag(other.to_string())),
            },
            other => Err(CommandParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// Edit command parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    Empty,
    UnknownCommand(String),
    InvalidFlag(String),
}

impl Display for CommandParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "edit command must not be empty"),
            Self::UnknownCommand(value) => write!(f, "unknown edit command: `{value}`"),
            Self::InvalidFlag(value) => {
                write!(f, "invalid flag value `{value}`; expected true|false")
            }
        }
    }
}

impl Error for CommandParseError {}
