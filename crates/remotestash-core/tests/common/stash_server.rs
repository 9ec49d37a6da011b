//! Runs a real stash server on 127.0.0.1 in a background thread for tests.

use remotestash_core::server::{RequestHandler, Server, ServerHandle, ServerOptions};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub struct RunningServer {
    pub addr: SocketAddr,
    handle: ServerHandle,
    thread: Option<JoinHandle<()>>,
}

impl RunningServer {
    /// `http://127.0.0.1:<port>/` or the https equivalent.
    pub fn base_url(&self, secure: bool) -> String {
        let scheme = if secure { "https" } else { "http" };
        format!("{}://{}/", scheme, self.addr)
    }

    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.handle.shutdown();
        if let Some(t) = self.thread.take() {
            t.join().expect("server thread panicked");
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown_and_join();
        }
    }
}

/// Plain HTTP server over `stash_dir` with a body limit of `max_body`.
pub fn start(stash_dir: &Path, max_body: u64) -> RunningServer {
    let mut options = ServerOptions::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
    options.max_body_bytes = max_body;
    spawn(options, stash_dir)
}

/// HTTPS server using a freshly generated self-signed certificate.
pub fn start_tls(stash_dir: &Path) -> RunningServer {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).expect("rcgen");
    let config = remotestash_core::server::server_config_from_pem(
        key_pair.serialize_pem().as_bytes(),
        cert.pem().as_bytes(),
    )
    .expect("tls config");
    let mut options = ServerOptions::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
    options.tls = Some(Arc::clone(&config));
    spawn(options, stash_dir)
}

/// Server built from caller-supplied options.
pub fn start_with_options(stash_dir: &Path, options: ServerOptions) -> RunningServer {
    spawn(options, stash_dir)
}

fn spawn(options: ServerOptions, stash_dir: &Path) -> RunningServer {
    let server = Server::bind(options, RequestHandler::new(stash_dir)).expect("bind");
    let addr = server.local_addr().unwrap();
    let handle = server.handle().unwrap();
    let thread = thread::spawn(move || {
        server.serve().expect("serve");
    });
    RunningServer {
        addr,
        handle,
        thread: Some(thread),
    }
}
