//! IMAP inbox organizer
//!
//! Logs into one IMAP mailbox, walks every message in `INBOX` and
//! moves it into a sub-mailbox named after its recipient. A message
//! addressed to `jane.doe@example.com` lands in `INBOX.jane_doe` when
//! `example.com` is the configured match domain. Missing sub-mailboxes
//! are created on demand.
//!
//! The workflow lives in [`Organizer`], which talks to the server
//! through the [`MailStore`] trait. [`ImapClient`] is the
//! implementation over an implicit-TLS `async-imap` session.

mod client;
mod config;
mod connection;
mod error;
mod mailbox;
mod organizer;
mod prompt;
mod routing;

pub use client::{ImapClient, MailStore};
pub use config::{ConfigArgs, DEFAULT_PORT, OrganizerConfig, is_valid_domain, is_valid_host};
pub use error::{Error, Result};
pub use mailbox::{DEFAULT_DELIMITER, INBOX, MailboxCache, MailboxEntry};
pub use organizer::{OPS_TARGET, OrganizeEvent, Organizer, RunReport};
pub use prompt::{Prompter, StdioPrompter};
pub use routing::{Recipients, mailbox_name_for, resolve_destination};
