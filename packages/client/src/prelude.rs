//! Common imports for transport users

pub use crate::config::{
    ConnectionConfig, ConnectionConfigBuilder, DEFAULT_TIMEOUT_MILLIS, set_ssl_props_location,
};
pub use crate::connect::{
    Channel, ConnectState, LocalBinder, PlainTcp, SocketSession, TlsChannel, TlsCore,
    TransportConnector, TransportCore,
};
pub use crate::credentials::CredentialBundle;
pub use crate::error::{Error, Kind};
pub use crate::tls::{EntropySeeder, RandomSource, TlsContextCache};
