#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI that sorts an IMAP inbox into per-recipient sub-mailboxes

use clap::Parser;
use imap_organizer::{
    ConfigArgs, ImapClient, OPS_TARGET, OrganizeEvent, Organizer, OrganizerConfig, RunReport,
    StdioPrompter,
};
use std::io::IsTerminal;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imap-organize")]
#[command(version, about = "Organize your IMAP inbox")]
struct Args {
    /// Mail server domain name or IP address
    ip: Option<String>,

    /// Mail server port [default: 993]
    port: Option<String>,

    /// Mail server username
    username: Option<String>,

    /// Recipient domain to match, e.g. example.com
    domain: Option<String>,

    /// Print a JSON report instead of one line per action
    #[arg(long)]
    json: bool,

    /// Show where messages would go without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Do not verify the server's TLS certificate
    #[arg(long)]
    accept_invalid_certs: bool,
}

impl Args {
    fn config_args(&self) -> ConfigArgs {
        ConfigArgs {
            host: self.ip.clone(),
            port: self.port.clone(),
            username: self.username.clone(),
            match_domain: self.domain.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Without RUST_LOG, warnings plus the moves/creations log.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{OPS_TARGET}=info")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let args = Args::parse();

    let config = {
        let mut prompter = StdioPrompter::stdio();
        OrganizerConfig::configure(args.config_args().with_env_defaults(), &mut prompter)?
    };

    let client = ImapClient::connect(&config).await?;
    let mut organizer = Organizer::new(client, &config).dry_run(args.dry_run);

    let json = args.json;
    let outcome = organizer
        .run(|event| {
            if !json {
                print_event(event);
            }
        })
        .await;

    let report = match outcome {
        Ok(report) => {
            organizer.logout().await?;
            report
        }
        Err(e) => {
            if let Err(logout_err) = organizer.logout().await {
                warn!("Logout after failed run also failed: {}", logout_err);
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

/// Unroutable messages are reported on stderr by the ops log only.
fn print_event(event: &OrganizeEvent) {
    if !matches!(event, OrganizeEvent::Unroutable { .. }) {
        println!("{event}");
    }
}

fn print_summary(report: &RunReport) {
    let verb = if report.dry_run { "to move" } else { "moved" };
    println!(
        "\n{} email(s) processed, {} {verb}, {} unknown, {} mailbox(es) created",
        report.processed,
        report.moved,
        report.unroutable,
        report.created.len()
    );
}
