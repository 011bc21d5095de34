//! Socket dialing, TLS layering and the connection state machine

pub mod binder;
pub mod channel;
pub mod connector;
pub mod dns;
pub mod session;
pub mod transport;

pub use binder::LocalBinder;
pub use channel::{Channel, TlsChannel};
pub use connector::{ConnectState, TransportConnector};
pub use session::SocketSession;
pub use transport::{NO_PROTOCOL, PlainTcp, TlsCore, TransportCore};
