//! Client for the MythTV frontend network control socket
//!
//! The frontend exposes a line-oriented control protocol on a TCP port
//! (6546 unless configured otherwise). After the greeting, the client writes
//! `<command>\nquit\n` and reads until a line starting with `OK` (success) or
//! `ERROR` (failure).

mod error;

pub use error::{NetworkControlError, Result};

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Default network control port
pub const DEFAULT_PORT: u16 = 6546;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A command understood by the network control socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Seek to an absolute position in the current playback
    PlaySeek(Duration),
    /// Any other command, sent verbatim
    Raw(String),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PlaySeek(position) => {
                let total = position.as_secs();
                write!(
                    f,
                    "play seek {:02}:{:02}:{:02}",
                    total / 3600,
                    (total / 60) % 60,
                    total % 60
                )
            }
            Command::Raw(command) => f.write_str(command),
        }
    }
}

/// Outcome classification of one response line
enum Reply {
    Ok,
    Error,
}

/// Classify one complete line, ignoring a leading `# ` prompt
fn classify(line: &str) -> Option<(Reply, String)> {
    let line = line
        .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .trim_end();
    if line.starts_with("OK") {
        Some((Reply::Ok, line.to_string()))
    } else if line.starts_with("ERROR") {
        Some((Reply::Error, line.to_string()))
    } else {
        None
    }
}

/// Client for one frontend's network control socket
#[derive(Debug, Clone)]
pub struct NetworkControlClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkControlClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the overall exchange timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Send one command and wait for its `OK`/`ERROR` reply
    ///
    /// Returns the `OK` line on success. An `ERROR` reply fails with
    /// `Rejected` carrying the raw line.
    pub async fn send(&self, command: &Command) -> Result<String> {
        tokio::time::timeout(self.timeout, self.exchange(command))
            .await
            .map_err(|_| NetworkControlError::Timeout(self.timeout))?
    }

    async fn exchange(&self, command: &Command) -> Result<String> {
        let address = format!("{}:{}", self.host, self.port);
        let stream =
            TcpStream::connect(&address)
                .await
                .map_err(|source| NetworkControlError::Connect {
                    address: address.clone(),
                    source,
                })?;

        tracing::debug!(%address, %command, "network control connected");

        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut written = false;
        while let Some(line) = lines.next_line().await? {
            match classify(&line) {
                Some((Reply::Ok, line)) => {
                    tracing::debug!(%address, "network control OK");
                    return Ok(line);
                }
                Some((Reply::Error, line)) => {
                    tracing::warn!(%address, %command, "network control rejected: {}", line);
                    return Err(NetworkControlError::Rejected(line));
                }
                // First greeting line received
                None if !written => {
                    write
                        .write_all(format!("{command}\nquit\n").as_bytes())
                        .await?;
                    written = true;
                }
                None => {}
            }
        }
        Err(NetworkControlError::Closed)
    }
}
