//! Loading the PEM key and certificate that turn the server into HTTPS.

use anyhow::{anyhow, Context, Result};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Build a rustls server config from a PEM private key and certificate chain.
pub fn load_server_config(key_path: &Path, cert_path: &Path) -> Result<Arc<ServerConfig>> {
    let cert_pem = fs::read(cert_path).with_context(|| format!("read {}", cert_path.display()))?;
    let key_pem = fs::read(key_path).with_context(|| format!("read {}", key_path.display()))?;
    server_config_from_pem(&key_pem, &cert_pem)
        .with_context(|| format!("TLS setup from {}", cert_path.display()))
}

pub fn server_config_from_pem(key_pem: &[u8], cert_pem: &[u8]) -> Result<Arc<ServerConfig>> {
    let certs = CertificateDer::pem_slice_iter(cert_pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("failed to parse certificates: {}", e))?;
    if certs.is_empty() {
        anyhow::bail!("no certificates found");
    }
    let key = PrivateKeyDer::from_pem_slice(key_pem)
        .map_err(|e| anyhow!("failed to parse private key: {}", e))?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .context("unsupported TLS protocol versions")?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("certificate and key do not match")?;
    Ok(Arc::new(config))
}
