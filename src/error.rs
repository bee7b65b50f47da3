use thiserror::Error;

use crate::ticket::TicketId;

pub type Result<T> = std::result::Result<T, ScratchError>;

#[derive(Error, Debug)]
pub enum ScratchError {
    #[error("Icon catalog too small: need at least {min} icons, have {have}")]
    CatalogTooSmall { min: usize, have: usize },

    #[error("Duplicate icon in catalog: {0}")]
    DuplicateIcon(String),

    #[error("Invalid outcome schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid scratch settings: {0}")]
    InvalidScratch(String),

    #[error("Malformed config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),
}
