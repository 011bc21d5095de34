//! Transport-wide defaults

/// Read timeout applied when a configuration asks for `0` milliseconds.
pub const DEFAULT_TIMEOUT_MILLIS: u64 = 50_000;

/// Name of the credential properties file inside the credential directory.
pub const SSL_PROPERTIES_FILE: &str = "ssl.properties";

/// Environment variable consulted when no credential directory was given.
pub const SSL_PROPS_LOCATION_ENV: &str = "SSL_PROPS_LOCATION";

/// Buffer size of the session reader and writer.
pub const SESSION_BUFFER_SIZE: usize = 8 * 1024;
