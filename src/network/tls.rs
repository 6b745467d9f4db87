//! TLS client setup.
//!
//! Trust roots come from the platform store, optionally extended with a PEM
//! bundle. Verification can be switched off entirely for self-signed test
//! networks.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use tokio_rustls::rustls::crypto::CryptoProvider;
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{
    self, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Build a connector.
pub fn connector(accept_invalid_certs: bool, ca_file: Option<&Path>) -> Result<TlsConnector> {
    let config = if accept_invalid_certs {
        warn!("TLS certificate verification is disabled");
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth()
    } else {
        ClientConfig::builder()
            .with_root_certificates(root_store(ca_file)?)
            .with_no_client_auth()
    };

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Perform the TLS handshake over an established TCP stream.
pub async fn connect(
    connector: &TlsConnector,
    host: &str,
    tcp: TcpStream,
) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(host.to_owned())
        .map_err(|_| Error::InvalidServerName(host.to_owned()))?;

    // tokio-rustls reports handshake failures as io errors wrapping the
    // rustls error
    let stream = connector.connect(server_name, tcp).await.map_err(|e| {
        match e.get_ref().and_then(|inner| inner.downcast_ref::<rustls::Error>()) {
            Some(tls) => Error::Tls(tls.clone()),
            None => Error::Io(e),
        }
    })?;
    info!(host = %host, "TLS handshake completed");
    Ok(stream)
}

fn root_store(ca_file: Option<&Path>) -> Result<RootCertStore> {
    let mut roots = RootCertStore::empty();

    let native = rustls_native_certs::load_native_certs();
    for e in &native.errors {
        warn!(error = %e, "Error loading native certs");
    }
    for cert in native.certs {
        if let Err(e) = roots.add(cert) {
            warn!(error = %e, "Failed to add root cert");
        }
    }

    if let Some(path) = ca_file {
        let mut reader = BufReader::new(File::open(path)?);
        let certs: Vec<CertificateDer<'static>> =
            rustls_pemfile::certs(&mut reader).collect::<std::io::Result<_>>()?;
        let (added, ignored) = roots.add_parsable_certificates(certs);
        debug!(path = %path.display(), added, ignored, "Loaded extra CA certificates");
    }

    if roots.is_empty() {
        warn!("No trusted root certificates; TLS connections will fail verification");
    }

    Ok(roots)
}

/// Accepts any server certificate.
#[derive(Debug)]
struct NoVerifier;

impl ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, tokio_rustls::rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, tokio_rustls::rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        CryptoProvider::get_default()
            .map(|p| p.signature_verification_algorithms.supported_schemes())
            .unwrap_or_default()
    }
}
