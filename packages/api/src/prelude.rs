//! Everything needed to open an EPP transport

pub use crate::builder::EppClientBuilder;
pub use crate::client::{EppClient, HELLO_XML};
pub use crate::frame::{read_frame, write_frame};

pub use epp_transport_client::prelude::*;
pub use epp_transport_client::{Result, init};
