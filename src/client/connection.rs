//! Socket transport to the host.
//!
//! Newline-delimited JSON in both directions over a local TCP connection.
//! Reads are blocking; the receive loop owns the read half.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use crate::protocol::OutboundMessage;

use super::error::{ClientError, ClientResult};

/// Address the host listens on by its invocation convention.
pub const DEFAULT_HOST_ADDRESS: &str = "127.0.0.1:12136";

/// A live transport to the host.
pub struct Connection {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
}

impl Connection {
    /// Open a connection to the given host address.
    pub fn open(address: &str) -> ClientResult<Self> {
        let stream = TcpStream::connect(address).map_err(|source| {
            ClientError::ConnectFailed { address: address.to_string(), source }
        })?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { writer: stream, reader })
    }

    /// Serialize and send one message.
    pub fn send(&mut self, message: &OutboundMessage) -> ClientResult<()> {
        let line = message.to_line()?;
        tracing::debug!("host <- {}", line);
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Block until the next line arrives. Returns `None` when the host
    /// closed the connection.
    pub fn read_line(&mut self) -> ClientResult<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        let line = line.trim_end().to_string();
        tracing::debug!("host -> {}", line);
        Ok(Some(line))
    }

    /// Shut down both directions of the socket. Errors are ignored; the
    /// peer may already be gone.
    pub fn shutdown(&mut self) {
        let _ = self.writer.shutdown(std::net::Shutdown::Both);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown();
    }
}
