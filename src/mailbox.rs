//! Mailbox list cache
//!
//! The organizer keeps the server's mailbox list in memory and looks
//! destinations up by suffix: a requested name `john_doe` is served by
//! any mailbox whose path ends in `<delimiter>john_doe`, so
//! `INBOX.Clients.john_doe` matches as well as `INBOX.john_doe`.

use serde::Serialize;

/// The mailbox the organizer works on and creates children under.
pub const INBOX: &str = "INBOX";

/// Hierarchy delimiter assumed when the server does not report one.
pub const DEFAULT_DELIMITER: &str = ".";

/// A mailbox as reported by the server's LIST response.
///
/// # Examples
///
/// ```
/// use imap_organizer::MailboxEntry;
///
/// let entry = MailboxEntry::new("imaps://mail.example.com:993", "INBOX.Clients.john_doe", None);
/// assert!(entry.matches("john_doe"));
/// assert!(!entry.matches("doe"));
/// assert_eq!(entry.full_path, "imaps://mail.example.com:993/INBOX.Clients.john_doe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailboxEntry {
    /// Server-side name, e.g. `INBOX.jane_doe`.
    pub short_path: String,
    /// Server-qualified name, e.g. `imaps://host:993/INBOX.jane_doe`.
    pub full_path: String,
    /// Hierarchy delimiter reported for this mailbox, if any.
    pub delimiter: Option<String>,
}

impl MailboxEntry {
    #[must_use]
    pub fn new(origin: &str, short_path: impl Into<String>, delimiter: Option<String>) -> Self {
        let short_path = short_path.into();
        Self {
            full_path: format!("{origin}/{short_path}"),
            short_path,
            delimiter,
        }
    }

    /// The hierarchy delimiter, falling back to [`DEFAULT_DELIMITER`].
    #[must_use]
    pub fn delimiter(&self) -> &str {
        self.delimiter
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DELIMITER)
    }

    /// Whether this mailbox serves the requested sub-mailbox `name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.short_path
            .strip_suffix(name)
            .is_some_and(|parent| parent.ends_with(self.delimiter()))
    }

    fn is_inbox(&self) -> bool {
        self.short_path.eq_ignore_ascii_case(INBOX)
    }
}

/// In-memory copy of the server's mailbox list.
#[derive(Debug, Clone, Default)]
pub struct MailboxCache {
    entries: Vec<MailboxEntry>,
}

impl MailboxCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Replace the cached list with a freshly loaded one.
    pub fn replace(&mut self, entries: Vec<MailboxEntry>) {
        self.entries = entries;
    }

    /// First cached mailbox that serves `name`, in server order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&MailboxEntry> {
        self.entries.iter().find(|entry| entry.matches(name))
    }

    /// Path under which a missing sub-mailbox `name` gets created:
    /// `INBOX` joined with its reported delimiter.
    #[must_use]
    pub fn child_path(&self, name: &str) -> String {
        let delimiter = self
            .entries
            .iter()
            .find(|entry| entry.is_inbox())
            .map_or(DEFAULT_DELIMITER, MailboxEntry::delimiter);
        format!("{INBOX}{delimiter}{name}")
    }

    #[must_use]
    pub const fn entries(&self) -> &[MailboxEntry] {
        self.entries.as_slice()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
