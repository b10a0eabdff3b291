//! CREATE command handler.
//!
//! Adds an empty folder (RFC 3501 Section 6.3.3). Creating a folder
//! that already exists is an error. A mailbox built with
//! `.ignore_creates()` answers OK but keeps its folder list unchanged,
//! imitating a server that silently drops the request.

use crate::fake_imap::io::write_line;
use crate::fake_imap::mailbox::{Folder, Mailbox};
use std::sync::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the CREATE command.
pub async fn handle_create<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    folder_name: &str,
    mailbox: &Mutex<Mailbox>,
    stream: &mut BufReader<S>,
) {
    let created = {
        let mut mb = mailbox.lock().unwrap();
        let created = if mb.get_folder(folder_name).is_some() {
            false
        } else {
            if !mb.ignore_creates {
                mb.folders.push(Folder {
                    name: folder_name.to_string(),
                    emails: Vec::new(),
                });
            }
            true
        };
        drop(mb);
        created
    };

    let resp = if created {
        format!("{tag} OK CREATE completed\r\n")
    } else {
        format!("{tag} NO [ALREADYEXISTS] Folder already exists\r\n")
    };
    let _ = write_line(stream, &resp).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use tokio::io::BufReader;

    async fn run(tag: &str, name: &str, mailbox: &Mutex<Mailbox>) -> String {
        let (client, server) = tokio::io::duplex(1024);
        let mut stream = BufReader::new(server);

        handle_create(tag, name, mailbox, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn creates_folder() {
        let mb = Mutex::new(MailboxBuilder::new().folder("INBOX").build());

        let output = run("A1", "INBOX.jane_doe", &mb).await;

        assert_eq!(output, "A1 OK CREATE completed\r\n");
        assert_eq!(
            mb.lock().unwrap().folder_names(),
            vec!["INBOX", "INBOX.jane_doe"]
        );
    }

    #[tokio::test]
    async fn existing_folder_returns_no() {
        let mb = Mutex::new(MailboxBuilder::new().folder("INBOX").build());

        let output = run("A1", "INBOX", &mb).await;

        assert!(output.starts_with("A1 NO "));
    }

    #[tokio::test]
    async fn ignored_create_still_answers_ok() {
        let mb = Mutex::new(MailboxBuilder::new().folder("INBOX").ignore_creates().build());

        let output = run("A1", "INBOX.jane_doe", &mb).await;

        assert_eq!(output, "A1 OK CREATE completed\r\n");
        assert_eq!(mb.lock().unwrap().folder_names(), vec!["INBOX"]);
    }
}
