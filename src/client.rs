//! Mail store seam and its IMAP implementation

use crate::config::OrganizerConfig;
use crate::connection::{self, ImapSession};
use crate::error::{Error, Result};
use crate::mailbox::MailboxEntry;
use async_imap::types::{Fetch, Name};
use futures::TryStreamExt;
use tracing::{debug, info};

/// The server operations the organizer relies on.
///
/// All operations act on the session's selected mailbox (`INBOX`)
/// unless they name another one.
#[allow(async_fn_in_trait)]
pub trait MailStore {
    /// List every mailbox on the server.
    async fn list_mailboxes(&mut self) -> Result<Vec<MailboxEntry>>;

    /// UIDs of all messages in the selected mailbox, ascending.
    async fn search_all(&mut self) -> Result<Vec<u32>>;

    /// Raw RFC 5322 message for `uid`, fetched without setting `\Seen`.
    async fn fetch_message(&mut self, uid: u32) -> Result<Vec<u8>>;

    /// Create a mailbox at `path`.
    async fn create_mailbox(&mut self, path: &str) -> Result<()>;

    /// Move message `uid` into `mailbox`.
    async fn move_message(&mut self, uid: u32, mailbox: &str) -> Result<()>;

    /// End the session.
    async fn logout(&mut self) -> Result<()>;
}

/// [`MailStore`] backed by one implicit-TLS IMAP session.
pub struct ImapClient {
    session: ImapSession,
    origin: String,
    move_supported: bool,
}

impl ImapClient {
    /// Connect, log in and select `INBOX`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP connection, TLS handshake, LOGIN,
    /// SELECT or CAPABILITY command fails.
    pub async fn connect(config: &OrganizerConfig) -> Result<Self> {
        let mut session = connection::connect(config).await?;

        let capabilities = session
            .capabilities()
            .await
            .map_err(|e| Error::Imap(format!("Capability request failed: {e}")))?;
        let move_supported = capabilities.has_str("MOVE");
        debug!("Server MOVE support: {}", move_supported);

        Ok(Self {
            session,
            origin: format!("imaps://{}", config.server_address()),
            move_supported,
        })
    }

    /// Whether moves use `UID MOVE` rather than copy-and-expunge.
    #[must_use]
    pub const fn move_supported(&self) -> bool {
        self.move_supported
    }

    /// Discard queued untagged responses, such as the `EXPUNGE`s a
    /// `UID MOVE` produces.
    fn drain_unsolicited(&mut self) {
        while let Ok(response) = self.session.unsolicited_responses.try_recv() {
            debug!("Unsolicited response: {:?}", response);
        }
    }

    async fn copy_and_expunge(&mut self, uid_set: &str, mailbox: &str) -> Result<()> {
        self.session
            .uid_copy(uid_set, mailbox)
            .await
            .map_err(|e| Error::Imap(format!("Copy to {mailbox} failed: {e}")))?;

        let _: Vec<Fetch> = self
            .session
            .uid_store(uid_set, "+FLAGS.SILENT (\\Deleted)")
            .await
            .map_err(|e| Error::Imap(format!("Store failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| Error::Imap(format!("Store failed: {e}")))?;

        let _: Vec<u32> = self
            .session
            .expunge()
            .await
            .map_err(|e| Error::Imap(format!("Expunge failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| Error::Imap(format!("Expunge failed: {e}")))?;

        Ok(())
    }
}

impl MailStore for ImapClient {
    async fn list_mailboxes(&mut self) -> Result<Vec<MailboxEntry>> {
        let names: Vec<Name> = self
            .session
            .list(Some(""), Some("*"))
            .await
            .map_err(|e| Error::Imap(format!("List mailboxes failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| Error::Imap(format!("List mailboxes failed: {e}")))?;

        let entries: Vec<MailboxEntry> = names
            .iter()
            .map(|name| {
                MailboxEntry::new(
                    &self.origin,
                    name.name(),
                    name.delimiter().map(str::to_string),
                )
            })
            .collect();

        debug!("Loaded {} mailboxes", entries.len());
        Ok(entries)
    }

    async fn search_all(&mut self) -> Result<Vec<u32>> {
        let uids = self
            .session
            .uid_search("ALL")
            .await
            .map_err(|e| Error::Imap(format!("Search failed: {e}")))?;

        let mut uid_list: Vec<u32> = uids.into_iter().collect();
        uid_list.sort_unstable();

        info!("Found {} messages", uid_list.len());
        Ok(uid_list)
    }

    async fn fetch_message(&mut self, uid: u32) -> Result<Vec<u8>> {
        let fetches: Vec<Fetch> = self
            .session
            .uid_fetch(uid.to_string(), "(BODY.PEEK[])")
            .await
            .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?
            .try_collect()
            .await
            .map_err(|e| Error::Imap(format!("Fetch error: {e}")))?;

        fetches
            .iter()
            .find_map(Fetch::body)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::Imap(format!("No body found for UID {uid}")))
    }

    async fn create_mailbox(&mut self, path: &str) -> Result<()> {
        self.session
            .create(path)
            .await
            .map_err(|e| Error::Imap(format!("Failed to create {path}: {e}")))
    }

    async fn move_message(&mut self, uid: u32, mailbox: &str) -> Result<()> {
        let uid_set = uid.to_string();
        if self.move_supported {
            self.session
                .uid_mv(&uid_set, mailbox)
                .await
                .map_err(|e| Error::Imap(format!("Move to {mailbox} failed: {e}")))?;
        } else {
            self.copy_and_expunge(&uid_set, mailbox).await?;
        }
        self.drain_unsolicited();
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .await
            .map_err(|e| Error::Imap(format!("Logout failed: {e}")))
    }
}
