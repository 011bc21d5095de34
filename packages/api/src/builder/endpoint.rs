//! Local endpoint binding methods

use super::core::EppClientBuilder;

impl EppClientBuilder {
    /// Source address for outbound connections. Only applied together with
    /// [`EppClientBuilder::local_port`].
    #[must_use]
    pub fn local_address(mut self, address: impl Into<String>) -> Self {
        self.config = self.config.local_address(address);
        self
    }

    #[must_use]
    pub fn local_port(mut self, port: u16) -> Self {
        self.config = self.config.local_port(port);
        self
    }

    /// Bind outbound connections to `address:port`, for registries that
    /// whitelist client source addresses.
    #[must_use]
    pub fn local_endpoint(mut self, address: impl Into<String>, port: u16) -> Self {
        self.config = self.config.local_endpoint(address, port);
        self
    }
}
