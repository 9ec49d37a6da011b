//! Blocking HTTP(S) server: accepts and answers one connection at a time.

mod disposition;
mod handler;
mod request;
mod response;
mod tls;

pub use disposition::{inline_filename, parse_filename};
pub use handler::RequestHandler;
pub use request::{Request, RequestError};
pub use response::Response;
pub use tls::{load_server_config, server_config_from_pem};

use anyhow::{Context, Result};
use rustls::{ServerConfig, ServerConnection, StreamOwned};
use std::io::{BufReader, Read, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::StashConfig;

#[derive(Clone)]
pub struct ServerOptions {
    pub address: IpAddr,
    /// 0 picks a free port.
    pub port: u16,
    pub max_body_bytes: u64,
    /// Read/write timeout applied to each accepted connection; None waits forever.
    pub io_timeout: Option<Duration>,
    pub tls: Option<Arc<ServerConfig>>,
}

impl ServerOptions {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self {
            address,
            port,
            max_body_bytes: StashConfig::default().max_body_bytes,
            io_timeout: Some(Duration::from_secs(30)),
            tls: None,
        }
    }

    pub fn from_config(cfg: &StashConfig, address: IpAddr, port: u16) -> Self {
        Self {
            max_body_bytes: cfg.max_body_bytes,
            io_timeout: cfg.request_timeout(),
            ..Self::new(address, port)
        }
    }
}

pub struct Server {
    listener: TcpListener,
    handler: RequestHandler,
    options: ServerOptions,
    shutdown: Arc<AtomicBool>,
}

/// Stops a running [`Server::serve`] loop from another thread.
#[derive(Clone)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
}

impl ServerHandle {
    /// Ask the server to stop, then wake its blocking accept.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let target = match self.addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), self.addr.port()),
            IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), self.addr.port()),
            _ => self.addr,
        };
        if let Err(e) = TcpStream::connect_timeout(&target, Duration::from_secs(1)) {
            tracing::debug!("waking server at {}: {}", target, e);
        }
    }
}

impl Server {
    pub fn bind(options: ServerOptions, handler: RequestHandler) -> Result<Self> {
        let listener = TcpListener::bind((options.address, options.port))
            .with_context(|| format!("failed to bind {}:{}", options.address, options.port))?;
        Ok(Self {
            listener,
            handler,
            options,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn is_secure(&self) -> bool {
        self.options.tls.is_some()
    }

    pub fn handle(&self) -> Result<ServerHandle> {
        Ok(ServerHandle {
            addr: self.local_addr()?,
            shutdown: Arc::clone(&self.shutdown),
        })
    }

    /// Serve requests one at a time until [`ServerHandle::shutdown`] is called.
    pub fn serve(&self) -> Result<()> {
        let addr = self.local_addr()?;
        tracing::info!(%addr, secure = self.is_secure(), "server listening");
        loop {
            let accepted = self.listener.accept();
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            match accepted {
                Ok((stream, peer)) => {
                    if let Err(e) = self.handle_connection(stream, peer) {
                        tracing::warn!(%peer, "connection failed: {:#}", e);
                    }
                }
                Err(e) => tracing::warn!("accept failed: {}", e),
            }
        }
        tracing::info!(%addr, "server stopped");
        Ok(())
    }

    fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        // The socket API rejects a zero timeout; treat it as none.
        let timeout = self.options.io_timeout.filter(|t| !t.is_zero());
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;
        match &self.options.tls {
            Some(cfg) => {
                let conn = ServerConnection::new(Arc::clone(cfg)).context("TLS session")?;
                let mut tls = StreamOwned::new(conn, stream);
                self.exchange(&mut tls, peer)?;
                tls.conn.send_close_notify();
                tls.flush()?;
            }
            None => {
                let mut stream = stream;
                self.exchange(&mut stream, peer)?;
            }
        }
        Ok(())
    }

    /// Read one request and write its response.
    fn exchange<S: Read + Write>(&self, stream: S, peer: SocketAddr) -> Result<()> {
        let mut reader = BufReader::new(stream);
        let response = match Request::read_from(&mut reader, self.options.max_body_bytes) {
            Ok(req) => {
                tracing::info!(%peer, method = %req.method, path = %req.path, "request");
                self.handler.handle(&req, peer)
            }
            Err(e) => match e.status() {
                Some(status) => {
                    tracing::warn!(%peer, "rejecting request: {}", e);
                    Response::text(status, e.to_string())
                }
                None => {
                    tracing::debug!(%peer, "no request: {}", e);
                    return Ok(());
                }
            },
        };
        tracing::info!(%peer, "respond {} {} bytes", response.status, response.body.len());
        response
            .write_to(reader.get_mut())
            .context("failed to write response")?;
        Ok(())
    }
}
