//! Error types for imap-organizer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Header parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Mailbox {0} is still missing after it was created")]
    MailboxNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
