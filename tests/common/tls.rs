#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};

/// Test PKI: a CA on disk plus a server config signed by it.
pub struct TlsFixture {
    pub ca_path: PathBuf,
    pub server_config: ServerConfig,
}

/// CA-signed certificate for `localhost`, CA written to `dir/ca.pem`.
pub fn ca_signed(dir: &Path) -> anyhow::Result<TlsFixture> {
    let (ca_cert, ca_key) = build_ca()?;
    let (server_cert, server_key) = build_server(&ca_cert, &ca_key)?;

    let ca_path = dir.join("ca.pem");
    std::fs::write(&ca_path, ca_cert.pem())?;

    Ok(TlsFixture {
        ca_path,
        server_config: server_config(server_cert, server_key)?,
    })
}

/// Self-signed certificate for `localhost`; nothing trusts it.
pub fn self_signed() -> anyhow::Result<ServerConfig> {
    let params = CertificateParams::new(vec!["localhost".to_string()])?;
    let key_pair = KeyPair::generate()?;
    let cert = params.self_signed(&key_pair)?;
    server_config(cert, key_pair)
}

fn server_config(cert: Certificate, key: KeyPair) -> anyhow::Result<ServerConfig> {
    let chain: Vec<CertificateDer<'static>> = vec![cert.der().clone()];
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));
    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(chain, key)?;
    Ok(config)
}

fn build_ca() -> anyhow::Result<(Certificate, KeyPair)> {
    let mut params = CertificateParams::default();
    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(DnType::CommonName, "nettirely-test-ca");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let key_pair = KeyPair::generate()?;
    let cert = params.self_signed(&key_pair)?;
    Ok((cert, key_pair))
}

fn build_server(ca_cert: &Certificate, ca_key: &KeyPair) -> anyhow::Result<(Certificate, KeyPair)> {
    let mut params = CertificateParams::new(vec!["localhost".to_string()])?;
    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(DnType::CommonName, "localhost");
    params.is_ca = IsCa::NoCa;
    let key_pair = KeyPair::generate()?;
    let cert = params.signed_by(&key_pair, ca_cert, ca_key)?;
    Ok((cert, key_pair))
}
