#![allow(dead_code)]

use std::fs;
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig, ServerConnection, StreamOwned};

pub const GREETING: &[u8] = b"<greeting/>";

/// A self-signed certificate with its key.
pub struct Identity {
    pub cert_pem: String,
    pub key_pem: String,
    pub key_pkcs8: Vec<u8>,
    pub cert_der: CertificateDer<'static>,
}

impl Identity {
    pub fn new(common_name: &str) -> Self {
        let key_pair = KeyPair::generate().expect("key pair");
        let mut params = CertificateParams::new(vec![
            "localhost".to_string(),
            "127.0.0.1".to_string(),
        ])
        .expect("params");
        let mut name = DistinguishedName::new();
        name.push(DnType::CommonName, common_name);
        params.distinguished_name = name;
        let cert = params.self_signed(&key_pair).expect("certificate");

        Self {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
            key_pkcs8: key_pair.serialize_der(),
            cert_der: cert.der().clone(),
        }
    }

    pub fn keystore_pem(&self) -> String {
        format!("{}{}", self.cert_pem, self.key_pem)
    }

    fn key_der(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key_pkcs8.clone()))
    }
}

/// Write `ssl.properties` plus extra files into `dir`.
pub fn write_credentials(dir: &Path, properties: &str, files: &[(&str, &[u8])]) {
    fs::write(dir.join("ssl.properties"), properties).expect("write properties");
    for (name, contents) in files {
        fs::write(dir.join(name), contents).expect("write credential file");
    }
}

/// Properties for a PEM keystore at `client.pem` trusting `trust.pem`.
pub fn pem_properties(protocol: &str) -> String {
    format!(
        "ssl.protocol={protocol}\n\
         ssl.keystore.format=PEM\n\
         ssl.keystore.file=client.pem\n\
         ssl.keystore.passphrase=store-pass\n\
         ssl.signedcert.passphrase=sign-pass\n\
         ssl.keymanagerfactory.format=SunX509\n\
         ssl.truststore.file=trust.pem\n"
    )
}

/// Credential directory for `client` trusting `server`.
pub fn pem_credentials(dir: &Path, client: &Identity, server: &Identity, protocol: &str) {
    write_credentials(
        dir,
        &pem_properties(protocol),
        &[
            ("client.pem", client.keystore_pem().as_bytes()),
            ("trust.pem", server.cert_pem.as_bytes()),
        ],
    );
}

/// Bytes each accepted connection received after the greeting.
pub type Received = Vec<io::Result<Vec<u8>>>;

pub struct TlsServer {
    pub port: u16,
    handle: JoinHandle<Received>,
}

impl TlsServer {
    pub fn join(self) -> Received {
        self.handle.join().expect("server thread")
    }
}

pub struct ServerOptions<'a> {
    pub identity: &'a Identity,
    pub require_client: Option<&'a Identity>,
    pub tls12_only: bool,
    pub connections: usize,
}

/// Serve `connections` TLS sessions on 127.0.0.1, one after another.
///
/// Each session completes the handshake, sends [`GREETING`] and then reads
/// until the client closes.
pub fn spawn_tls_server(options: ServerOptions<'_>) -> TlsServer {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls12 = [&rustls::version::TLS12];
    let versions: &[&'static rustls::SupportedProtocolVersion] = if options.tls12_only {
        &tls12
    } else {
        rustls::ALL_VERSIONS
    };
    let builder = ServerConfig::builder_with_provider(Arc::clone(&provider))
        .with_protocol_versions(versions)
        .expect("versions");

    let builder = match options.require_client {
        Some(client) => {
            let mut roots = RootCertStore::empty();
            roots.add(client.cert_der.clone()).expect("client root");
            let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                .build()
                .expect("client verifier");
            builder.with_client_cert_verifier(verifier)
        }
        None => builder.with_no_client_auth(),
    };
    let config = Arc::new(
        builder
            .with_single_cert(vec![options.identity.cert_der.clone()], options.identity.key_der())
            .expect("server certificate"),
    );

    let listener = TcpListener::bind("127.0.0.1:0").expect("listener");
    let port = listener.local_addr().expect("addr").port();
    let connections = options.connections;

    let handle = thread::spawn(move || {
        let mut received = Vec::new();
        for _ in 0..connections {
            let outcome = listener.accept().and_then(|(socket, _)| {
                socket.set_read_timeout(Some(Duration::from_secs(5)))?;
                let connection = ServerConnection::new(Arc::clone(&config))
                    .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
                let mut stream = StreamOwned::new(connection, socket);
                while stream.conn.is_handshaking() {
                    stream.conn.complete_io(&mut stream.sock)?;
                }
                stream.write_all(GREETING)?;
                stream.flush()?;
                read_until_closed(&mut stream)
            });
            received.push(outcome);
        }
        received
    });

    TlsServer { port, handle }
}

fn read_until_closed(stream: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return Ok(received),
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(received),
            Err(err) => return Err(err),
        }
    }
}
