//! Plaintext preambles that upgrade a connection to TLS.
//!
//! The set of supported protocols is closed, so it is an enum selected once at
//! startup from a compile-time identifier table rather than a registry of
//! trait objects. Every variant takes a freshly connected stream and leaves it
//! positioned exactly where the server expects a TLS ClientHello.

mod sieve;
mod smtp;

use log::trace;
use strum_macros::EnumIter;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::MAX_PREAMBLE_LINE_LEN;
use crate::error_handling::{CheckError, ConfigError};

/// How the connection is switched to TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum StartTls {
    /// TLS from the first byte
    None,
    /// SMTP `STARTTLS` (RFC 3207)
    Smtp,
    /// ManageSieve `STARTTLS` (RFC 5804)
    Sieve,
}

/// Identifiers accepted by `--start-tls`, in help order.
const PROTOCOLS: &[(&str, StartTls)] = &[
    ("", StartTls::None),
    ("smtp", StartTls::Smtp),
    ("sieve", StartTls::Sieve),
];

impl StartTls {
    /// Looks up a protocol by its `--start-tls` identifier.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnsupportedProtocol` for identifiers not in the table.
    pub fn from_identifier(identifier: &str) -> Result<Self, ConfigError> {
        PROTOCOLS
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|(_, protocol)| *protocol)
            .ok_or_else(|| ConfigError::UnsupportedProtocol(identifier.to_string()))
    }

    /// The `--start-tls` identifier of this protocol.
    pub fn identifier(&self) -> &'static str {
        PROTOCOLS
            .iter()
            .find(|(_, protocol)| protocol == self)
            .map(|(id, _)| *id)
            .unwrap_or_default()
    }

    /// Runs the plaintext preamble on `stream`.
    ///
    /// On success the stream is ready for the TLS handshake. Any unexpected
    /// server response is a `CheckError::Protocol` carrying the offending line.
    pub async fn negotiate<S>(&self, stream: &mut S) -> Result<(), CheckError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self {
            StartTls::None => Ok(()),
            StartTls::Smtp => {
                let mut conn = PreambleConn::new(stream);
                smtp::negotiate(&mut conn).await?;
                conn.finish()
            }
            StartTls::Sieve => {
                let mut conn = PreambleConn::new(stream);
                sieve::negotiate(&mut conn).await?;
                conn.finish()
            }
        }
    }
}

/// Comma-separated list of the accepted `--start-tls` identifiers.
pub fn supported_protocols() -> String {
    PROTOCOLS
        .iter()
        .map(|(id, _)| if id.is_empty() { "\"\" (direct TLS)" } else { *id })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Line-oriented view of a plaintext connection.
struct PreambleConn<'a, S> {
    reader: BufReader<&'a mut S>,
}

impl<'a, S> PreambleConn<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn new(stream: &'a mut S) -> Self {
        Self {
            reader: BufReader::new(stream),
        }
    }

    /// Reads one line without its terminator, or `None` at end of stream.
    ///
    /// Bytes that are not UTF-8 (e.g. a Latin-1 banner) are replaced, not rejected.
    async fn read_line(&mut self) -> Result<Option<String>, CheckError> {
        let mut raw = Vec::new();
        let read = (&mut self.reader)
            .take(MAX_PREAMBLE_LINE_LEN as u64)
            .read_until(b'\n', &mut raw)
            .await?;
        if read == 0 {
            return Ok(None);
        }
        if !raw.ends_with(b"\n") && read == MAX_PREAMBLE_LINE_LEN {
            return Err(CheckError::Protocol(format!(
                "server response line exceeds {MAX_PREAMBLE_LINE_LEN} bytes"
            )));
        }
        let line = String::from_utf8_lossy(&raw)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        trace!("<- {line}");
        Ok(Some(line))
    }

    /// Sends `command` terminated by CRLF.
    async fn send_command(&mut self, command: &str) -> Result<(), CheckError> {
        trace!("-> {command}");
        let stream = self.reader.get_mut();
        stream.write_all(format!("{command}\r\n").as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Ends the preamble, refusing plaintext the server pushed ahead of TLS.
    fn finish(self) -> Result<(), CheckError> {
        if self.reader.buffer().is_empty() {
            Ok(())
        } else {
            Err(CheckError::Protocol(
                "server sent unexpected data before the TLS handshake".to_string(),
            ))
        }
    }
}
