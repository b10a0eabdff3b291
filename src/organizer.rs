//! Inbox organizer
//!
//! One linear pass over `INBOX`: load the mailbox list, search all
//! messages, and move each routable message into its recipient's
//! sub-mailbox, creating the sub-mailbox when it does not exist yet.

use crate::client::MailStore;
use crate::config::OrganizerConfig;
use crate::error::{Error, Result};
use crate::mailbox::{MailboxCache, MailboxEntry};
use crate::routing::{Recipients, resolve_destination};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Tracing target for the operational log of moves and creations.
pub const OPS_TARGET: &str = "imap_organizer::ops";

/// Something the organizer did, reported live while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrganizeEvent {
    /// A sub-mailbox was created.
    Created { mailbox: String },
    /// A message was moved.
    Moved { uid: u32, mailbox: String },
    /// Dry run: a message would have been moved.
    WouldMove { uid: u32, mailbox: String },
    /// No destination could be derived for a message.
    Unroutable { uid: u32, recipient: String },
}

impl fmt::Display for OrganizeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { mailbox } => write!(f, "Mailbox created {mailbox}"),
            Self::Moved { mailbox, .. } => write!(f, "Email moved to {mailbox}"),
            Self::WouldMove { mailbox, .. } => write!(f, "Email would be moved to {mailbox}"),
            Self::Unroutable { recipient, .. } => write!(f, "Unknown email {recipient}"),
        }
    }
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub processed: usize,
    pub moved: usize,
    pub unroutable: usize,
    /// Mailboxes created during the run, in creation order.
    pub created: Vec<String>,
    pub dry_run: bool,
}

/// Sorts the selected mailbox of a [`MailStore`] into per-recipient
/// sub-mailboxes.
pub struct Organizer<S> {
    store: S,
    match_domain: String,
    mailboxes: MailboxCache,
    dry_run: bool,
}

impl<S: MailStore> Organizer<S> {
    #[must_use]
    pub fn new(store: S, config: &OrganizerConfig) -> Self {
        Self {
            store,
            match_domain: config.match_domain.clone(),
            mailboxes: MailboxCache::new(),
            dry_run: false,
        }
    }

    /// Resolve destinations without creating mailboxes or moving
    /// messages.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The cached mailbox list.
    #[must_use]
    pub const fn mailboxes(&self) -> &MailboxCache {
        &self.mailboxes
    }

    /// Process every message once.
    ///
    /// `on_event` is called for each creation, move and unroutable
    /// message as it happens. Unroutable messages stay where they are
    /// and do not stop the run.
    ///
    /// # Errors
    ///
    /// Returns the first IMAP failure, or [`Error::MailboxNotFound`]
    /// if a created mailbox does not show up in the reloaded list.
    pub async fn run<F>(&mut self, mut on_event: F) -> Result<RunReport>
    where
        F: FnMut(&OrganizeEvent),
    {
        let mut report = RunReport {
            dry_run: self.dry_run,
            ..RunReport::default()
        };

        self.load_mailboxes().await?;
        let uids = self.store.search_all().await?;

        for uid in uids {
            report.processed += 1;
            let raw = self.store.fetch_message(uid).await?;

            let recipients = match Recipients::from_raw(&raw) {
                Ok(recipients) => recipients,
                Err(e) => {
                    warn!("UID {} has unreadable headers: {}", uid, e);
                    Recipients::default()
                }
            };

            let Some(name) = resolve_destination(&recipients, &self.match_domain) else {
                warn!(target: OPS_TARGET, uid, "Unknown email {}", recipients.to_header);
                report.unroutable += 1;
                on_event(&OrganizeEvent::Unroutable {
                    uid,
                    recipient: recipients.to_header,
                });
                continue;
            };

            if self.dry_run {
                let mailbox = self.mailboxes.find(&name).map_or_else(
                    || self.mailboxes.child_path(&name),
                    |entry| entry.short_path.clone(),
                );
                report.moved += 1;
                on_event(&OrganizeEvent::WouldMove { uid, mailbox });
                continue;
            }

            let entry = self
                .find_or_create_mailbox(&name, &mut report, &mut on_event)
                .await?;

            info!(target: OPS_TARGET, uid, "Email moved to {}", entry.short_path);
            self.store.move_message(uid, &entry.short_path).await?;
            report.moved += 1;
            on_event(&OrganizeEvent::Moved {
                uid,
                mailbox: entry.short_path,
            });
        }

        info!(
            "Processed {} messages: {} moved, {} unroutable, {} mailboxes created",
            report.processed,
            report.moved,
            report.unroutable,
            report.created.len()
        );
        Ok(report)
    }

    /// Look up the sub-mailbox serving `name`, creating it once if it
    /// is missing.
    ///
    /// After a creation the mailbox list is reloaded and searched
    /// again. A second miss means the server did not honour the
    /// creation, which ends the run rather than creating again.
    async fn find_or_create_mailbox<F>(
        &mut self,
        name: &str,
        report: &mut RunReport,
        on_event: &mut F,
    ) -> Result<MailboxEntry>
    where
        F: FnMut(&OrganizeEvent),
    {
        let mut created = false;
        loop {
            if let Some(entry) = self.mailboxes.find(name) {
                return Ok(entry.clone());
            }
            if created {
                return Err(Error::MailboxNotFound(name.to_string()));
            }

            let path = self.mailboxes.child_path(name);
            info!(target: OPS_TARGET, "Mailbox created {}", path);
            self.store.create_mailbox(&path).await?;
            created = true;
            report.created.push(path.clone());
            on_event(&OrganizeEvent::Created { mailbox: path });

            self.load_mailboxes().await?;
        }
    }

    async fn load_mailboxes(&mut self) -> Result<()> {
        let entries = self.store.list_mailboxes().await?;
        debug!("Mailbox cache refreshed with {} entries", entries.len());
        self.mailboxes.replace(entries);
        Ok(())
    }

    /// End the session on the underlying store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to log out.
    pub async fn logout(&mut self) -> Result<()> {
        self.store.logout().await
    }

    /// Give back the underlying store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
