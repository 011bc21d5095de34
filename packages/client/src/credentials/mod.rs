//! TLS credential description loaded from `<credential dir>/ssl.properties`

pub mod properties;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

pub use properties::Properties;

use crate::config::defaults::SSL_PROPERTIES_FILE;
use crate::error::{self, Result};

pub const KEY_PROTOCOL: &str = "ssl.protocol";
pub const KEY_KEYSTORE_FORMAT: &str = "ssl.keystore.format";
pub const KEY_KEYSTORE_PROVIDER: &str = "ssl.keystore.provider";
pub const KEY_KEYSTORE_FILE: &str = "ssl.keystore.file";
pub const KEY_KEYSTORE_PASSPHRASE: &str = "ssl.keystore.passphrase";
pub const KEY_SIGNEDCERT_PASSPHRASE: &str = "ssl.signedcert.passphrase";
pub const KEY_KEY_MANAGER_ALGORITHM: &str = "ssl.keymanagerfactory.format";
pub const KEY_TRUSTSTORE_FILE: &str = "ssl.truststore.file";

/// Parsed TLS material description. Never mutated after load.
#[derive(Clone)]
pub struct CredentialBundle {
    dir: PathBuf,
    tls_protocol: String,
    keystore_format: String,
    keystore_provider: Option<String>,
    keystore_file: PathBuf,
    keystore_passphrase: Zeroizing<String>,
    signing_cert_passphrase: Zeroizing<String>,
    key_manager_algorithm: String,
    truststore_file: Option<PathBuf>,
}

impl CredentialBundle {
    /// Load `ssl.properties` from the credential directory.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the directory is empty, the file cannot
    /// be read, or a required key is absent or blank.
    pub fn load(dir: &Path) -> Result<Self> {
        if dir.as_os_str().is_empty() {
            return Err(error::config("missing credential path"));
        }

        let path = dir.join(SSL_PROPERTIES_FILE);
        let text = fs::read_to_string(&path).map_err(|err| {
            tracing::debug!(path = %path.display(), error = %err, "credential properties unreadable");
            error::config("file not found").with(err)
        })?;

        Self::from_properties(dir, &Properties::parse(&text))
    }

    /// Build a bundle from already parsed properties.
    ///
    /// Relative keystore and truststore paths are resolved against `dir`.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error naming the first missing required key.
    pub fn from_properties(dir: &Path, props: &Properties) -> Result<Self> {
        let required = |key: &str| {
            props
                .get_non_empty(key)
                .map(str::to_owned)
                .ok_or_else(|| error::missing_key(key))
        };
        // Passphrases keep their exact bytes, surrounding spaces included.
        // An empty value is a valid passphrase; only an absent key is missing.
        let secret = |key: &str| {
            props
                .get(key)
                .map(|value| Zeroizing::new(value.to_owned()))
                .ok_or_else(|| error::missing_key(key))
        };

        let tls_protocol = required(KEY_PROTOCOL)?;
        let keystore_format = required(KEY_KEYSTORE_FORMAT)?;
        let keystore_file = dir.join(required(KEY_KEYSTORE_FILE)?);
        let keystore_passphrase = secret(KEY_KEYSTORE_PASSPHRASE)?;
        let signing_cert_passphrase = secret(KEY_SIGNEDCERT_PASSPHRASE)?;
        let key_manager_algorithm = required(KEY_KEY_MANAGER_ALGORITHM)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            tls_protocol,
            keystore_format,
            keystore_provider: props.get_non_empty(KEY_KEYSTORE_PROVIDER).map(str::to_owned),
            keystore_file,
            keystore_passphrase,
            signing_cert_passphrase,
            key_manager_algorithm,
            truststore_file: props
                .get_non_empty(KEY_TRUSTSTORE_FILE)
                .map(|file| dir.join(file)),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn tls_protocol(&self) -> &str {
        &self.tls_protocol
    }

    #[must_use]
    pub fn keystore_format(&self) -> &str {
        &self.keystore_format
    }

    /// `None` selects the platform default provider.
    #[must_use]
    pub fn keystore_provider(&self) -> Option<&str> {
        self.keystore_provider.as_deref()
    }

    #[must_use]
    pub fn keystore_file(&self) -> &Path {
        &self.keystore_file
    }

    #[must_use]
    pub fn keystore_passphrase(&self) -> &str {
        &self.keystore_passphrase
    }

    #[must_use]
    pub fn signing_cert_passphrase(&self) -> &str {
        &self.signing_cert_passphrase
    }

    #[must_use]
    pub fn key_manager_algorithm(&self) -> &str {
        &self.key_manager_algorithm
    }

    #[must_use]
    pub fn truststore_file(&self) -> Option<&Path> {
        self.truststore_file.as_deref()
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("dir", &self.dir)
            .field("tls_protocol", &self.tls_protocol)
            .field("keystore_format", &self.keystore_format)
            .field("keystore_provider", &self.keystore_provider)
            .field("keystore_file", &self.keystore_file)
            .field("keystore_passphrase", &"<redacted>")
            .field("signing_cert_passphrase", &"<redacted>")
            .field("key_manager_algorithm", &self.key_manager_algorithm)
            .field("truststore_file", &self.truststore_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const COMPLETE: &str = "\
ssl.protocol=TLSv1.3
ssl.keystore.format=PEM
ssl.keystore.file=client.pem
ssl.keystore.passphrase=store-pass
ssl.signedcert.passphrase=key-pass
ssl.keymanagerfactory.format=SunX509
";

    fn write_props(dir: &TempDir, text: &str) {
        fs::write(dir.path().join(SSL_PROPERTIES_FILE), text).expect("write ssl.properties");
    }

    #[test]
    fn loads_complete_file() {
        let dir = TempDir::new().expect("tempdir");
        write_props(&dir, COMPLETE);

        let bundle = CredentialBundle::load(dir.path()).expect("bundle");
        assert_eq!(bundle.tls_protocol(), "TLSv1.3");
        assert_eq!(bundle.keystore_format(), "PEM");
        assert_eq!(bundle.keystore_provider(), None);
        assert_eq!(bundle.keystore_file(), dir.path().join("client.pem"));
        assert_eq!(bundle.keystore_passphrase(), "store-pass");
        assert_eq!(bundle.signing_cert_passphrase(), "key-pass");
        assert_eq!(bundle.key_manager_algorithm(), "SunX509");
        assert_eq!(bundle.truststore_file(), None);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = CredentialBundle::load(dir.path()).expect_err("no ssl.properties");
        assert!(err.is_config());
        assert_eq!(err.message(), "file not found");
    }

    #[test]
    fn empty_path_is_config_error() {
        let err = CredentialBundle::load(Path::new("")).expect_err("empty path");
        assert!(err.is_config());
        assert_eq!(err.message(), "missing credential path");
    }

    #[test]
    fn each_required_key_is_named() {
        for key in [
            KEY_PROTOCOL,
            KEY_KEYSTORE_FORMAT,
            KEY_KEYSTORE_FILE,
            KEY_KEYSTORE_PASSPHRASE,
            KEY_SIGNEDCERT_PASSPHRASE,
            KEY_KEY_MANAGER_ALGORITHM,
        ] {
            let text: String = COMPLETE
                .lines()
                .filter(|line| !line.starts_with(&format!("{key}=")))
                .map(|line| format!("{line}\n"))
                .collect();
            let props = Properties::parse(&text);
            let err = CredentialBundle::from_properties(Path::new("/etc/epp"), &props)
                .expect_err("key removed");
            assert!(err.is_config());
            assert_eq!(err.message(), format!("missing required key: {key}"));
        }
    }

    #[test]
    fn empty_passphrases_are_accepted() {
        let text = COMPLETE
            .replace("ssl.keystore.passphrase=store-pass", "ssl.keystore.passphrase=")
            .replace("ssl.signedcert.passphrase=key-pass", "ssl.signedcert.passphrase=");
        let bundle = CredentialBundle::from_properties(Path::new("/etc/epp"), &Properties::parse(&text))
            .expect("empty passphrases");
        assert_eq!(bundle.keystore_passphrase(), "");
        assert_eq!(bundle.signing_cert_passphrase(), "");
    }

    #[test]
    fn optional_provider_and_truststore() {
        let text = format!("{COMPLETE}ssl.keystore.provider=ring\nssl.truststore.file=/etc/epp/ca.pem\n");
        let bundle = CredentialBundle::from_properties(Path::new("/etc/epp"), &Properties::parse(&text))
            .expect("bundle");
        assert_eq!(bundle.keystore_provider(), Some("ring"));
        assert_eq!(bundle.truststore_file(), Some(Path::new("/etc/epp/ca.pem")));
    }

    #[test]
    fn debug_redacts_passphrases() {
        let bundle = CredentialBundle::from_properties(Path::new("/etc/epp"), &Properties::parse(COMPLETE))
            .expect("bundle");
        let debug = format!("{bundle:?}");
        assert!(!debug.contains("store-pass"));
        assert!(!debug.contains("key-pass"));
        assert!(debug.contains("<redacted>"));
    }
}
