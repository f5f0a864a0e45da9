use std::io::{ErrorKind, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogError, LogRecord, LogResult};

/// Transport used by a [`SocketHandler`].
enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Connection::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Connection::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.flush(),
        }
    }
}

/// Sends formatted records over TCP (`tcp://host:port` or `host:port`) or,
/// on unix, a unix domain socket (`unix:///path/to.sock`).
///
/// Non persistent handlers open a connection per record.
pub struct SocketHandler {
    core: HandlerCore,
    connection_string: String,
    timeout: Option<Duration>,
    connection_timeout: Option<Duration>,
    writing_timeout: Option<Duration>,
    persistent: bool,
    chunk_size: Option<usize>,
    connection: Mutex<Option<Connection>>,
}

fn seconds(name: &str, value: f64) -> LogResult<Option<Duration>> {
    if value.is_nan() || value < 0.0 {
        return Err(LogError::InvalidArgument(format!(
            "{name} must be 0 or a positive number of seconds, got {value}"
        )));
    }
    if value == 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(value)
        .map(Some)
        .map_err(|err| LogError::InvalidArgument(format!("{name}: {err}")))
}

impl SocketHandler {
    /// Creates a handler. No connection is made until a record is handled.
    pub fn new(connection_string: impl Into<String>, level: Level, bubble: bool) -> Self {
        SocketHandler {
            core: HandlerCore::new(level, bubble),
            connection_string: connection_string.into(),
            timeout: None,
            connection_timeout: None,
            writing_timeout: Some(Duration::from_secs(10)),
            persistent: false,
            chunk_size: None,
            connection: Mutex::new(None),
        }
    }

    /// Read/write timeout of the socket, in seconds. `0` disables it.
    pub fn set_timeout(&mut self, seconds_value: f64) -> LogResult<()> {
        self.timeout = seconds("timeout", seconds_value)?;
        Ok(())
    }

    /// Time allowed to establish the connection, in seconds. `0` disables it.
    pub fn set_connection_timeout(&mut self, seconds_value: f64) -> LogResult<()> {
        self.connection_timeout = seconds("connection timeout", seconds_value)?;
        Ok(())
    }

    /// Time allowed to write a whole record, in seconds. `0` disables it.
    pub fn set_writing_timeout(&mut self, seconds_value: f64) -> LogResult<()> {
        self.writing_timeout = seconds("writing timeout", seconds_value)?;
        Ok(())
    }

    /// Keeps the connection open between records.
    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    /// Writes records in chunks of at most `chunk_size` bytes.
    pub fn set_chunk_size(&mut self, chunk_size: usize) -> LogResult<()> {
        if chunk_size == 0 {
            return Err(LogError::InvalidArgument(
                "chunk size must be greater than 0".to_owned(),
            ));
        }
        self.chunk_size = Some(chunk_size);
        Ok(())
    }

    /// Where records are sent.
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Socket timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Connection timeout.
    pub fn connection_timeout(&self) -> Option<Duration> {
        self.connection_timeout
    }

    /// Writing timeout.
    pub fn writing_timeout(&self) -> Option<Duration> {
        self.writing_timeout
    }

    /// Whether the connection is kept open.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Chunk size used for writes.
    pub fn chunk_size(&self) -> Option<usize> {
        self.chunk_size
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .map(|connection| connection.is_some())
            .unwrap_or(false)
    }

    fn io_error(&self, err: std::io::Error) -> LogError {
        LogError::io(self.connection_string.clone(), err)
    }

    fn connect(&self) -> LogResult<Connection> {
        #[cfg(unix)]
        if let Some(path) = self.connection_string.strip_prefix("unix://") {
            let stream = std::os::unix::net::UnixStream::connect(path)
                .map_err(|err| self.io_error(err))?;
            stream
                .set_write_timeout(self.timeout)
                .map_err(|err| self.io_error(err))?;
            return Ok(Connection::Unix(stream));
        }

        let address = self
            .connection_string
            .strip_prefix("tcp://")
            .unwrap_or(&self.connection_string);
        let stream = match self.connection_timeout {
            Some(limit) => {
                let mut last_error = None;
                let mut connected = None;
                for addr in address.to_socket_addrs().map_err(|err| self.io_error(err))? {
                    match TcpStream::connect_timeout(&addr, limit) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(err) => last_error = Some(err),
                    }
                }
                match connected {
                    Some(stream) => stream,
                    None => {
                        return Err(self.io_error(last_error.unwrap_or_else(|| {
                            std::io::Error::new(ErrorKind::NotFound, "address did not resolve")
                        })))
                    }
                }
            }
            None => TcpStream::connect(address).map_err(|err| self.io_error(err))?,
        };
        stream
            .set_write_timeout(self.timeout)
            .and_then(|_| stream.set_read_timeout(self.timeout))
            .map_err(|err| self.io_error(err))?;
        Ok(Connection::Tcp(stream))
    }

    fn write_chunks(&self, connection: &mut Connection, data: &[u8]) -> LogResult<()> {
        let started = Instant::now();
        let chunk_size = self.chunk_size.unwrap_or(data.len().max(1));
        for chunk in data.chunks(chunk_size) {
            if let Some(limit) = self.writing_timeout {
                if started.elapsed() > limit {
                    return Err(self.io_error(std::io::Error::new(
                        ErrorKind::TimedOut,
                        format!("write timed out after {limit:?}"),
                    )));
                }
            }
            connection
                .write_all(chunk)
                .map_err(|err| self.io_error(err))?;
        }
        connection.flush().map_err(|err| self.io_error(err))
    }

    fn send(&self, data: &[u8]) -> LogResult<()> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| LogError::LockPoisoned("SocketHandler"))?;
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        let result = match guard.as_mut() {
            Some(connection) => self.write_chunks(connection, data),
            None => Ok(()),
        };
        if result.is_err() || !self.persistent {
            guard.take();
        }
        result
    }
}

impl std::fmt::Debug for SocketHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketHandler")
            .field("core", &self.core)
            .field("connection_string", &self.connection_string)
            .field("timeout", &self.timeout)
            .field("connection_timeout", &self.connection_timeout)
            .field("writing_timeout", &self.writing_timeout)
            .field("persistent", &self.persistent)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl Handler for SocketHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        self.send(self.core.format(&record).as_bytes())?;
        Ok(!self.core.bubble())
    }

    fn close(&self) -> LogResult<()> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| LogError::LockPoisoned("SocketHandler"))?;
        guard.take();
        Ok(())
    }
}

impl_core_handler!(SocketHandler);
