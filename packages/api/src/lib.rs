//! EPP Transport Public API
//!
//! Blocking transport for Extensible Provisioning Protocol clients: mutually
//! authenticated TLS or plain TCP, optional local endpoint binding, and
//! RFC 5734 framing for the greeting exchange.
//!
//! ```no_run
//! use epp_transport::prelude::*;
//!
//! fn main() -> epp_transport::Result<()> {
//!     epp_transport::init();
//!
//!     let mut client = EppClient::builder("epp.registry.example", 700)
//!         .credentials("registrar-id", "password")
//!         .credential_dir("/etc/epp/credentials")
//!         .local_endpoint("192.0.2.10", 40000)
//!         .build()?;
//!
//!     let greeting = client.connect_and_get_greeting()?;
//!     println!("{greeting}");
//!     client.close()
//! }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;
pub mod client;
pub mod frame;
pub mod prelude;

pub use builder::EppClientBuilder;
pub use client::{EppClient, HELLO_XML};
pub use frame::FrameError;

// Re-export important types from the transport package
pub use epp_transport_client::{
    ConnectState, ConnectionConfig, Error, Kind, Result, TransportConnector, init,
    set_ssl_props_location,
};
