//! Process-wide initialization.
//!
//! This module provides the setup the binary performs once, before the check:
//! - Logger
//! - TLS crypto provider

mod logger;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use logger::init_logger_with;

/// Initializes the crypto provider for TLS operations.
///
/// Configures the global crypto provider for `rustls`. This must be called before
/// any TLS connections are established.
pub fn init_crypto_provider() {
    // The return value is ignored because reinstalling the provider is harmless
    let _ = CryptoProvider::install_default(default_provider());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_crypto_provider_is_idempotent() {
        init_crypto_provider();
        init_crypto_provider();
        assert!(CryptoProvider::get_default().is_some());
    }
}
