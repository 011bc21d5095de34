//! # EPP Transport Client
//!
//! Blocking TCP and TLS transport for Extensible Provisioning Protocol
//! clients. Produces a connected, buffered byte stream or a classified error.
//!
//! ## Features
//!
//! - **Mutually authenticated TLS** from a keystore described by an
//!   `ssl.properties` file in a credential directory
//! - **Eager handshake verification**: a secure connect never returns a
//!   session that did not negotiate TLS
//! - **Local endpoint binding** for registries that whitelist source addresses
//! - **TLS context caching** so reconnects do not reread the keystore
//! - **Preset channels** for tests and proxy-brokered sockets
//! - **Supplemental entropy seeding** of the TLS random source
//!
//! ## Usage
//!
//! ```no_run
//! use epp_transport_client::prelude::*;
//!
//! fn main() -> epp_transport_client::Result<()> {
//!     epp_transport_client::init();
//!
//!     let config = ConnectionConfig::builder("epp.registry.example", 700)
//!         .credential_dir("/etc/epp/credentials")
//!         .build()?;
//!     let mut connector = TransportConnector::new(config, TlsCore::new());
//!     connector.connect()?;
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod connect;
pub mod credentials;
pub mod error;
pub mod prelude;
pub mod tls;

pub use crate::config::{ConnectionConfig, ConnectionConfigBuilder, set_ssl_props_location};
pub use crate::connect::{
    Channel, ConnectState, LocalBinder, PlainTcp, SocketSession, TlsCore, TransportConnector,
    TransportCore,
};
pub use crate::credentials::CredentialBundle;
pub use crate::error::{Error, Kind, Result};
pub use crate::tls::provider::init;
