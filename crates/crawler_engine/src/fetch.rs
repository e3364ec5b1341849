use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crawler_core::Url;
use engine_logging::{engine_debug, engine_trace};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use serde::{Deserialize, Serialize};

use crate::wire;
use crate::{FailureKind, FetchError, Response};

pub const DEFAULT_MAX_BODY_BYTES: u64 = 256 * 1024;
pub const DEFAULT_READ_CHUNK_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Ceiling on the body; exceeding it fails the fetch with `TooLarge`.
    pub max_body_bytes: u64,
    pub read_chunk_bytes: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            read_timeout_ms: 30_000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            read_chunk_bytes: DEFAULT_READ_CHUNK_BYTES,
        }
    }
}

impl FetchSettings {
    // Zero durations are rejected by the socket timeout setters.
    fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}

pub trait Fetcher {
    fn fetch(&self, url: &Url) -> Result<Response, FetchError>;
}

/// Blocking HTTP/1.1 GET over a plain or TLS socket, one connection per request.
///
/// The TLS client context is built on first HTTPS use and shared by every
/// later connection from this dispatcher.
#[derive(Debug)]
pub struct Dispatcher {
    settings: FetchSettings,
    tls: OnceLock<Arc<ClientConfig>>,
}

impl Dispatcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            settings,
            tls: OnceLock::new(),
        }
    }

    /// Returns the shared TLS context, building it on the first call.
    pub fn init_tls(&self) -> Arc<ClientConfig> {
        self.tls
            .get_or_init(|| {
                engine_debug!("Initializing TLS client context");
                Arc::new(build_tls_config())
            })
            .clone()
    }

    fn open(&self, url: &Url) -> Result<Transport, FetchError> {
        let tcp = self.connect(url)?;
        if url.scheme().is_encrypted() {
            handshake(tcp, self.init_tls(), url)
        } else {
            Ok(Transport::Plain(tcp))
        }
    }

    fn connect(&self, url: &Url) -> Result<TcpStream, FetchError> {
        let host = url.host().trim_start_matches('[').trim_end_matches(']');
        let addrs: Vec<SocketAddr> = (host, url.port())
            .to_socket_addrs()
            .map_err(|err| {
                FetchError::new(FailureKind::ResolutionFailed, format!("{host}: {err}"))
            })?
            .collect();
        if addrs.is_empty() {
            return Err(FetchError::new(
                FailureKind::ResolutionFailed,
                format!("{host}: no addresses"),
            ));
        }

        let mut last_error = None;
        for addr in addrs {
            engine_trace!("Connecting to {addr}");
            match TcpStream::connect_timeout(&addr, self.settings.connect_timeout()) {
                Ok(stream) => {
                    self.apply_timeouts(&stream)?;
                    return Ok(stream);
                }
                Err(err) => last_error = Some(err),
            }
        }

        let message = last_error
            .map(|err| format!("{}:{}: {err}", url.host(), url.port()))
            .unwrap_or_else(|| format!("{}:{}", url.host(), url.port()));
        Err(FetchError::new(FailureKind::ConnectFailed, message))
    }

    fn apply_timeouts(&self, stream: &TcpStream) -> Result<(), FetchError> {
        let timeout = Some(self.settings.read_timeout());
        stream
            .set_read_timeout(timeout)
            .and_then(|_| stream.set_write_timeout(timeout))
            .map_err(|err| FetchError::new(FailureKind::ConnectFailed, err.to_string()))
    }
}

impl Fetcher for Dispatcher {
    fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        engine_debug!("GET {url}");
        let mut transport = self.open(url)?;
        let outcome = exchange(&mut transport, url, &self.settings);
        transport.close();
        outcome
    }
}

fn exchange(
    transport: &mut Transport,
    url: &Url,
    settings: &FetchSettings,
) -> Result<Response, FetchError> {
    let request = wire::build_request(url);
    transport
        .write_all(request.as_bytes())
        .and_then(|_| transport.flush())
        .map_err(|err| match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                FetchError::new(FailureKind::Timeout, err.to_string())
            }
            _ => FetchError::new(FailureKind::SendFailed, err.to_string()),
        })?;
    let response = wire::read_response(transport, settings)?;
    engine_debug!(
        "{url} answered {} with {} body bytes",
        response.header.status,
        response.body.len()
    );
    Ok(response)
}

fn build_tls_config() -> ClientConfig {
    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

fn handshake(tcp: TcpStream, config: Arc<ClientConfig>, url: &Url) -> Result<Transport, FetchError> {
    let host = url.host().trim_start_matches('[').trim_end_matches(']');
    let server_name = ServerName::try_from(host)
        .map(|name| name.to_owned())
        .map_err(|err| {
            FetchError::new(
                FailureKind::HandshakeFailed,
                format!("invalid server name {host}: {err}"),
            )
        })?;
    let connection = ClientConnection::new(config, server_name)
        .map_err(|err| FetchError::new(FailureKind::HandshakeFailed, err.to_string()))?;

    let mut stream = StreamOwned::new(connection, tcp);
    while stream.conn.is_handshaking() {
        let (read, written) = stream
            .conn
            .complete_io(&mut stream.sock)
            .map_err(|err| FetchError::new(FailureKind::HandshakeFailed, err.to_string()))?;
        if read == 0 && written == 0 && stream.conn.is_handshaking() {
            let _ = stream.sock.shutdown(Shutdown::Both);
            return Err(FetchError::new(
                FailureKind::HandshakeFailed,
                "peer closed during handshake",
            ));
        }
    }
    engine_trace!("TLS established with {host}");
    Ok(Transport::Tls(Box::new(stream)))
}

enum Transport {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Transport {
    /// Sends close_notify when encrypted, then shuts the socket down.
    fn close(&mut self) {
        match self {
            Transport::Plain(tcp) => {
                let _ = tcp.shutdown(Shutdown::Both);
            }
            Transport::Tls(stream) => {
                stream.conn.send_close_notify();
                while stream.conn.wants_write() {
                    match stream.conn.write_tls(&mut stream.sock) {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                let _ = stream.sock.shutdown(Shutdown::Both);
            }
        }
    }
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.read(buf),
            Transport::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Transport::Plain(tcp) => tcp.write(buf),
            Transport::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Transport::Plain(tcp) => tcp.flush(),
            Transport::Tls(stream) => stream.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Dispatcher, FetchSettings};

    #[test]
    fn tls_context_is_built_once() {
        let dispatcher = Dispatcher::new(FetchSettings::default());
        let first = dispatcher.init_tls();
        let second = dispatcher.init_tls();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn zero_timeouts_are_clamped() {
        let settings = FetchSettings {
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            ..FetchSettings::default()
        };
        assert!(!settings.connect_timeout().is_zero());
        assert!(!settings.read_timeout().is_zero());
    }
}
