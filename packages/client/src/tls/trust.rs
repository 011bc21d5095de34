//! Server trust anchors

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustls::RootCertStore;

use super::errors::TlsError;

/// Roots used to verify the server.
///
/// An explicit truststore file replaces the platform roots entirely. Without
/// one the native store is used, falling back to the bundled Mozilla roots
/// when the platform yields nothing.
///
/// # Errors
///
/// Fails when the truststore file is unreadable or holds no usable
/// certificate.
pub fn load_roots(truststore: Option<&Path>) -> Result<RootCertStore, TlsError> {
    let mut roots = RootCertStore::empty();

    if let Some(path) = truststore {
        let mut reader = BufReader::new(File::open(path)?);
        let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
        let (added, ignored) = roots.add_parsable_certificates(certs);
        if added == 0 {
            return Err(TlsError::CertificateParsing(format!(
                "truststore {} holds no usable certificate",
                path.display()
            )));
        }
        tracing::debug!(truststore = %path.display(), added, ignored, "loaded truststore");
        return Ok(roots);
    }

    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        tracing::debug!(error = %err, "native certificate store error");
    }
    let (added, _) = roots.add_parsable_certificates(native.certs);
    if added == 0 {
        tracing::debug!("no native roots, using bundled webpki roots");
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    Ok(roots)
}
