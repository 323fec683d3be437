//! ManageSieve STARTTLS preamble (RFC 5804).

use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};

use super::PreambleConn;
use crate::error_handling::CheckError;

/// Capabilities until `OK`, then `STARTTLS` until `OK`.
pub(super) async fn negotiate<S>(conn: &mut PreambleConn<'_, S>) -> Result<(), CheckError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    wait_ok(conn).await?;
    conn.send_command("STARTTLS").await?;
    wait_ok(conn).await?;
    debug!("ManageSieve server accepted STARTTLS");
    Ok(())
}

/// Skips capability lines until the server ends its response.
async fn wait_ok<S>(conn: &mut PreambleConn<'_, S>) -> Result<(), CheckError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(line) = conn.read_line().await? {
        match parse_response(&line) {
            Some(Ok(())) => return Ok(()),
            Some(Err(message)) => return Err(CheckError::Protocol(message.to_string())),
            None => continue,
        }
    }
    Err(CheckError::Protocol(
        "ManageSieve server closed the connection before answering OK".to_string(),
    ))
}

/// Classifies a response line: `OK...` succeeds, `NO `/`BYE ` fail with the
/// rest of the line, anything else is not a final response.
fn parse_response(line: &str) -> Option<Result<(), &str>> {
    if line.starts_with("OK") {
        Some(Ok(()))
    } else if let Some(message) = line.strip_prefix("NO ") {
        Some(Err(message))
    } else {
        line.strip_prefix("BYE ").map(Err)
    }
}
