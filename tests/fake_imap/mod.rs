//! Fake IMAP server for integration testing
//!
//! This module provides an in-process IMAP server that speaks enough
//! of the protocol to run the organizer end-to-end:
//!
//! TCP -> TLS handshake -> greeting -> LOGIN -> commands -> LOGOUT
//!
//! ## Module layout
//!
//! - `server` -- TCP listener, TLS setup, and connection dispatch
//! - `handlers/` -- one file per IMAP command (LIST, CREATE, etc.)
//! - `mailbox` -- test data model (folders, emails, builder)
//! - `io` -- shared write helpers


#[allow(unused_imports)]
pub use mailbox::{Mailbox, MailboxBuilder};
pub use server::FakeImapServer;
