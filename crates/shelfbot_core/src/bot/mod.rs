//! Transport-neutral bot surface.
//!
//! # Responsibility
//! - Route inbound actions by identity and dialogue state.
//! - Render every outcome into a [`Response`] a chat transport can show.
//!
//! # Invariants
//! - Every inbound action upserts its user before anything else.
//! - Admin-only actions consult the access policy before touching state.

use crate::dialogue::DialogueError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod action;
pub mod render;
pub mod router;

pub use action::{Actor, Choice, ChoiceButton, Command, Inbound, Menu, Payload, Response};
pub use router::Bot;

/// Request failure the transport reports as a generic error.
#[derive(Debug)]
pub enum BotError {
    Repo(RepoError),
    Dialogue(DialogueError),
}

impl Display for BotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Dialogue(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Dialogue(err) => Some(err),
        }
    }
}

impl From<RepoError> for BotError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DialogueError> for BotError {
    fn from(value: DialogueError) -> Self {
        match value {
            DialogueError::Repo(err) => Self::Repo(err),
            other => Self::Dialogue(other),
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
