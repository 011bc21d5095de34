//! Fluent construction of [`EppClient`](crate::EppClient)

pub mod core;
pub mod endpoint;

pub use self::core::EppClientBuilder;
