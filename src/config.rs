//! Run configuration
//!
//! Values come from three layers, highest priority first: command-line
//! arguments, environment variables (a `.env` file is honoured), and
//! interactive prompts. Every value is validated; invalid ones are
//! reported and asked for again until they pass.

use crate::error::Result;
use crate::prompt::Prompter;
use regex::Regex;
use std::env;
use std::fmt;
use std::net::IpAddr;
use std::sync::LazyLock;

/// Implicit-TLS IMAP port.
pub const DEFAULT_PORT: u16 = 993;

static DOMAIN_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](-*[A-Za-z0-9])*(\.[A-Za-z0-9](-*[A-Za-z0-9])*)*$")
        .expect("domain pattern is valid")
});

/// Validated, immutable configuration for one organizer run.
#[derive(Clone)]
pub struct OrganizerConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Lower-cased domain that recipient addresses are matched against.
    pub match_domain: String,
    /// Skip server certificate verification.
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for OrganizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrganizerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("match_domain", &self.match_domain)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// Raw, unvalidated configuration values as supplied on the command
/// line. The password is never part of it.
#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    pub host: Option<String>,
    pub port: Option<String>,
    pub username: Option<String>,
    pub match_domain: Option<String>,
    pub accept_invalid_certs: bool,
}

impl ConfigArgs {
    /// Fill values not given on the command line from the environment.
    ///
    /// Reads from `.env` file if present. Recognised variables:
    /// - `IMAP_HOST`
    /// - `IMAP_PORT`
    /// - `IMAP_USERNAME`
    /// - `IMAP_MATCH_DOMAIN`
    #[must_use]
    pub fn with_env_defaults(self) -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: self.host.or_else(|| env::var("IMAP_HOST").ok()),
            port: self.port.or_else(|| env::var("IMAP_PORT").ok()),
            username: self.username.or_else(|| env::var("IMAP_USERNAME").ok()),
            match_domain: self
                .match_domain
                .or_else(|| env::var("IMAP_MATCH_DOMAIN").ok()),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

impl OrganizerConfig {
    /// Resolve a complete configuration, prompting for anything missing
    /// or invalid.
    ///
    /// There is no retry limit: each value is asked for until it
    /// validates. The password is always prompted for.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompter fails, e.g. because input was
    /// closed.
    pub fn configure(args: ConfigArgs, prompter: &mut impl Prompter) -> Result<Self> {
        let mut host = args.host.unwrap_or_default();
        while !is_valid_host(&host) {
            prompter.error("Please input a valid domain name or IP address.")?;
            host = prompter.ask("Please input your mail server domain/ip.", None)?;
        }

        let mut port_input = args.port.unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port = loop {
            if let Some(port) = parse_port(&port_input) {
                break port;
            }
            prompter.error("Please input a valid port.")?;
            port_input = prompter.ask("Please input your mail server port.", Some(&port_input))?;
        };

        let mut username = args.username.unwrap_or_default();
        while username.is_empty() {
            prompter.error("Please input a valid server username.")?;
            username = prompter.ask("Please input your mail server username.", None)?;
        }

        let password = prompter.secret("Please input your mail server password.")?;

        let mut match_domain = args.match_domain.unwrap_or_default();
        while !is_valid_domain(&match_domain) {
            prompter.error("Please input the domain to match.")?;
            match_domain = prompter.ask("Please input the domain to match.", None)?;
        }

        Ok(Self {
            host,
            port,
            username,
            password,
            match_domain: match_domain.to_ascii_lowercase(),
            accept_invalid_certs: args.accept_invalid_certs,
        })
    }

    /// `host:port`, for logging.
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Check that `domain` is a syntactically valid DNS name.
///
/// Labels consist of ASCII letters, digits and inner hyphens, each
/// 1-63 characters long; the whole name is at most 253 characters.
#[must_use]
pub fn is_valid_domain(domain: &str) -> bool {
    (1..=253).contains(&domain.len())
        && DOMAIN_CHARS.is_match(domain)
        && domain.split('.').all(|label| label.len() <= 63)
}

/// A server address is either a domain name or an IPv4/IPv6 address.
#[must_use]
pub fn is_valid_host(host: &str) -> bool {
    is_valid_domain(host) || host.parse::<IpAddr>().is_ok()
}

fn parse_port(input: &str) -> Option<u16> {
    input.trim().parse::<u16>().ok().filter(|port| *port != 0)
}
