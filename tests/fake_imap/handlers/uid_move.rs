//! UID MOVE command handler (RFC 6851).
//!
//! Copies the messages to the destination and removes them from the
//! selected folder in one step. Each removal is reported with an
//! untagged `* N EXPUNGE`, as RFC 6851 Section 3.3 requires.

use super::uid_copy::copy_messages;
use crate::fake_imap::io::write_line;
use crate::fake_imap::mailbox::Mailbox;
use imap_codec::imap_types::sequence::SequenceSet;
use std::sync::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the UID MOVE command.
pub async fn handle_uid_move<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    sequence_set: &SequenceSet,
    dest_folder: &str,
    mailbox: &Mutex<Mailbox>,
    selected_folder: Option<&str>,
    stream: &mut BufReader<S>,
) {
    let Some(folder_name) = selected_folder else {
        let resp = format!("{tag} BAD No folder selected\r\n");
        let _ = write_line(stream, &resp).await;
        return;
    };

    let outcome = {
        let mut mb = mailbox.lock().unwrap();
        let outcome =
            copy_messages(&mut mb, folder_name, dest_folder, sequence_set).map(|moved| {
                let mut seqs = Vec::new();
                if let Some(source) = mb.get_folder_mut(folder_name) {
                    for uid in moved {
                        if let Some(idx) = source.emails.iter().position(|e| e.uid == uid) {
                            source.emails.remove(idx);
                            seqs.push(idx + 1);
                        }
                    }
                }
                seqs
            });
        drop(mb);
        outcome
    };

    match outcome {
        Ok(seqs) => {
            for seq in seqs {
                let line = format!("* {seq} EXPUNGE\r\n");
                if write_line(stream, &line).await.is_err() {
                    return;
                }
            }
            let resp = format!("{tag} OK MOVE completed\r\n");
            let _ = write_line(stream, &resp).await;
        }
        Err(text) => {
            let resp = format!("{tag} {text}\r\n");
            let _ = write_line(stream, &resp).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::handlers::uids::tests::uid_set;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use tokio::io::BufReader;

    const RAW: &[u8] = b"To: a@example.com\r\nSubject: Test\r\n\r\nBody";

    async fn run_move(
        tag: &str,
        uid: u32,
        dest: &str,
        mailbox: &Mutex<Mailbox>,
        selected: Option<&str>,
    ) -> String {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        handle_uid_move(tag, &uid_set(uid), dest, mailbox, selected, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn moves_email_out_of_source() {
        let mb = Mutex::new(
            MailboxBuilder::new()
                .folder("INBOX")
                .email(1, RAW)
                .email(2, RAW)
                .folder("INBOX.jane_doe")
                .build(),
        );

        let output = run_move("A1", 2, "INBOX.jane_doe", &mb, Some("INBOX")).await;

        assert_eq!(output, "* 2 EXPUNGE\r\nA1 OK MOVE completed\r\n");
        let snap = mb.lock().unwrap().clone();
        assert_eq!(snap.uids("INBOX"), vec![1]);
        assert_eq!(snap.uids("INBOX.jane_doe"), vec![2]);
    }

    #[tokio::test]
    async fn missing_dest_leaves_source_alone() {
        let mb = Mutex::new(MailboxBuilder::new().folder("INBOX").email(1, RAW).build());

        let output = run_move("A1", 1, "INBOX.nobody", &mb, Some("INBOX")).await;

        assert!(output.starts_with("A1 NO [TRYCREATE]"));
        assert_eq!(mb.lock().unwrap().uids("INBOX"), vec![1]);
    }

    #[tokio::test]
    async fn no_folder_selected_returns_bad() {
        let mb = Mutex::new(MailboxBuilder::new().folder("INBOX").build());

        let output = run_move("A1", 1, "INBOX", &mb, None).await;

        assert!(output.contains("A1 BAD No folder selected"));
    }
}
