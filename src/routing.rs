//! Recipient-based routing
//!
//! Decides which sub-mailbox a message belongs in. The first `To`
//! address is tried first; when it is not on the match domain, the
//! first address of the relay-added `Envelope-to` header is tried
//! instead. The mailbox name is the address's local part with every
//! `.` replaced by `_`.

use crate::error::{Error, Result};
use mailparse::{MailAddr, MailHeaderMap, addrparse_header, parse_headers};

/// The recipient information routing needs from a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    /// First `To` address, lower-cased.
    pub to: Option<String>,
    /// The `To` header as it appeared, for reporting.
    pub to_header: String,
    /// First `Envelope-to` address, trimmed and lower-cased.
    pub envelope_to: Option<String>,
}

impl Recipients {
    /// Extract recipients from a raw message or header block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the header block is malformed.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let (headers, _) = parse_headers(raw).map_err(|e| Error::Parse(e.to_string()))?;

        let to_header = headers.get_first_value("To").unwrap_or_default();
        let to = headers
            .get_first_header("To")
            .and_then(|header| addrparse_header(header).ok())
            .and_then(|list| list.iter().find_map(first_address))
            .map(|addr| addr.to_lowercase());

        let envelope_to = headers.get_first_value("Envelope-to").and_then(|value| {
            value
                .split(',')
                .next()
                .map(|addr| addr.trim().to_lowercase())
                .filter(|addr| !addr.is_empty())
        });

        Ok(Self {
            to,
            to_header,
            envelope_to,
        })
    }
}

fn first_address(addr: &MailAddr) -> Option<String> {
    match addr {
        MailAddr::Single(info) => Some(info.addr.clone()),
        MailAddr::Group(group) => group.addrs.first().map(|info| info.addr.clone()),
    }
}

/// Mailbox name for `address` if it belongs to `match_domain`.
///
/// `match_domain` is expected in lower case, as stored in
/// [`crate::OrganizerConfig`].
///
/// # Examples
///
/// ```
/// use imap_organizer::mailbox_name_for;
///
/// assert_eq!(
///     mailbox_name_for("jane.doe@example.com", "example.com").as_deref(),
///     Some("jane_doe"),
/// );
/// assert_eq!(mailbox_name_for("jane@other.com", "example.com"), None);
/// ```
#[must_use]
pub fn mailbox_name_for(address: &str, match_domain: &str) -> Option<String> {
    let local = address
        .strip_suffix(match_domain)?
        .strip_suffix('@')?;
    if local.is_empty() {
        return None;
    }
    Some(local.replace('.', "_"))
}

/// Destination sub-mailbox name for a message, or `None` when the
/// message cannot be routed.
#[must_use]
pub fn resolve_destination(recipients: &Recipients, match_domain: &str) -> Option<String> {
    recipients
        .to
        .as_deref()
        .and_then(|addr| mailbox_name_for(addr, match_domain))
        .or_else(|| {
            recipients
                .envelope_to
                .as_deref()
                .and_then(|addr| mailbox_name_for(addr, match_domain))
        })
}
