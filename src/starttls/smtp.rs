//! SMTP STARTTLS preamble (RFC 3207).

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};

use super::PreambleConn;
use crate::config::{SMTP_HELO_NAME, SMTP_OK, SMTP_READY};
use crate::error_handling::CheckError;

/// Greeting 220, `HELO` 250, `STARTTLS` 220.
pub(super) async fn negotiate<S>(conn: &mut PreambleConn<'_, S>) -> Result<(), CheckError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let greeting = expect_reply(conn, SMTP_READY).await?;
    debug!("SMTP greeting: {greeting}");

    conn.send_command(&format!("HELO {SMTP_HELO_NAME}")).await?;
    expect_reply(conn, SMTP_OK).await?;

    conn.send_command("STARTTLS").await?;
    expect_reply(conn, SMTP_READY).await?;
    debug!("SMTP server accepted STARTTLS");
    Ok(())
}

/// Reads a complete (possibly multi-line) reply whose lines all carry `expected`.
///
/// Returns the final line of the reply.
async fn expect_reply<S>(conn: &mut PreambleConn<'_, S>, expected: u16) -> Result<String, CheckError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let line = conn.read_line().await?.ok_or_else(|| {
            CheckError::Protocol(format!(
                "SMTP server closed the connection while a {expected} reply was expected"
            ))
        })?;
        let (code, last) = parse_reply_line(&line).ok_or_else(|| {
            CheckError::Protocol(format!("malformed SMTP reply: {line}"))
        })?;
        if code != expected {
            return Err(CheckError::Protocol(format!(
                "unexpected SMTP reply (expected {expected}): {line}"
            )));
        }
        if last {
            return Ok(line);
        }
    }
}

/// Splits a reply line into its code and whether it ends the reply.
///
/// `250-...` continues a multi-line reply, `250 ...` or a bare `250` ends it.
fn parse_reply_line(line: &str) -> Option<(u16, bool)> {
    let code = line.get(..3)?;
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let last = match line.as_bytes().get(3) {
        None | Some(b' ') => true,
        Some(b'-') => false,
        Some(_) => return None,
    };
    Some((code.parse().ok()?, last))
}
