//! Client session loop
//!
//! Reads one command per line, runs it on the blocking pool and writes the
//! single-line response back.

use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::protocol::responses::{
    BAD_REQUEST, INTERNAL_ERROR, READY, error_response, format_response,
};
use crate::protocol::{CommandStatus, handle_command, parse_command};
use crate::server::core::ClientRegistry;
use crate::service::ObjectService;

/// One line read from the client
#[derive(Debug, PartialEq)]
enum LineRead {
    Line(String),
    TooLong,
    InvalidUtf8,
    Closed,
}

/// Read the next command line, buffering at most `max_len` bytes of it plus
/// the line terminator. An over-long line is discarded up to its newline.
async fn read_command_line<R>(reader: &mut R, max_len: usize) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    // room for the command itself and a trailing CRLF
    let cap = max_len as u64 + 2;
    let mut buf = Vec::new();
    let n = (&mut *reader).take(cap).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(LineRead::Closed);
    }

    if !buf.ends_with(b"\n") && buf.len() as u64 == cap {
        discard_rest_of_line(reader).await?;
        return Ok(LineRead::TooLong);
    }

    let content_len = buf.trim_ascii_end().len();
    if content_len > max_len {
        return Ok(LineRead::TooLong);
    }

    match String::from_utf8(buf) {
        Ok(line) => Ok(LineRead::Line(line)),
        Err(_) => Ok(LineRead::InvalidUtf8),
    }
}

async fn discard_rest_of_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, found) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        if found {
            return Ok(());
        }
    }
}

pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    client_registry: &ClientRegistry,
    service: Arc<ObjectService>,
    config: &ServerConfig,
) -> Result<(), std::io::Error> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    write_half
        .write_all(format_response(READY).as_bytes())
        .await?;
    write_half.flush().await?;

    loop {
        let line = match read_command_line(&mut reader, config.max_command_length).await? {
            LineRead::Line(line) => line,
            LineRead::Closed => {
                info!("Connection closed by client {}", client_addr);
                return Ok(());
            }
            LineRead::TooLong => {
                warn!("Rejected over-long command from {}", client_addr);
                let reply = error_response(BAD_REQUEST, "command_too_long", "command too long");
                write_half.write_all(reply.as_bytes()).await?;
                continue;
            }
            LineRead::InvalidUtf8 => {
                warn!("Rejected non UTF-8 command from {}", client_addr);
                let reply = error_response(
                    BAD_REQUEST,
                    "invalid_command",
                    "command is not valid UTF-8",
                );
                write_half.write_all(reply.as_bytes()).await?;
                continue;
            }
        };

        let command = parse_command(&line);
        debug!("Received from {}: {:?}", client_addr, command);

        let service = Arc::clone(&service);
        let result =
            match tokio::task::spawn_blocking(move || handle_command(&service, &command)).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Command task for {} failed: {}", client_addr, e);
                    let reply =
                        error_response(INTERNAL_ERROR, "internal_error", "command task failed");
                    write_half.write_all(reply.as_bytes()).await?;
                    continue;
                }
            };

        if let Some(session) = client_registry.lock().await.get_mut(&client_addr) {
            session.commands_handled += 1;
        }

        if let Some(msg) = &result.message {
            write_half.write_all(msg.as_bytes()).await?;
        }

        if result.status == CommandStatus::CloseConnection {
            info!("Client {} requested to quit", client_addr);
            write_half.shutdown().await?;
            return Ok(());
        }
    }
}
