//! Process-wide crypto provider setup and per-keystore provider selection

use std::sync::{Arc, Once};

use rustls::crypto::CryptoProvider;

use super::errors::TlsError;

static INIT: Once = Once::new();

/// Install the `ring` provider as the process default, once.
///
/// Safe to call any number of times from any thread; only the first call
/// does work. A default installed earlier by the application is kept.
pub fn init() {
    INIT.call_once(|| {
        if CryptoProvider::get_default().is_some() {
            tracing::debug!("process crypto provider already installed");
            return;
        }
        match rustls::crypto::ring::default_provider().install_default() {
            Ok(()) => tracing::debug!(provider = "ring", "installed process crypto provider"),
            Err(_) => tracing::debug!("process crypto provider installed concurrently"),
        }
    });
}

/// Provider for a keystore, `None` meaning the process default.
///
/// # Errors
///
/// Returns `TlsError::UnsupportedProvider` for names other than `ring` and
/// `aws-lc-rs`.
pub fn resolve(name: Option<&str>) -> Result<Arc<CryptoProvider>, TlsError> {
    let Some(name) = name else {
        return Ok(CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| Arc::new(rustls::crypto::ring::default_provider())));
    };

    match name.to_ascii_lowercase().as_str() {
        "ring" => Ok(Arc::new(rustls::crypto::ring::default_provider())),
        "aws-lc-rs" | "aws_lc_rs" => Ok(Arc::new(rustls::crypto::aws_lc_rs::default_provider())),
        _ => Err(TlsError::UnsupportedProvider(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        assert!(CryptoProvider::get_default().is_some());
    }

    #[test]
    fn provider_names() {
        assert!(resolve(None).is_ok());
        assert!(resolve(Some("ring")).is_ok());
        assert!(resolve(Some("AWS-LC-RS")).is_ok());
        assert!(matches!(
            resolve(Some("BC")),
            Err(TlsError::UnsupportedProvider(name)) if name == "BC"
        ));
    }
}
