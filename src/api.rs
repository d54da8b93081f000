//! High-level API - [`LedgerSmesh`] wraps a transport connection and
//! exposes all supported operations.

use crate::commands;
use crate::error::SmeshError;
use crate::transport::{self, Transport, TransportType};
use crate::types::{Address, AppVersion, Bip32Path, ExtendedPublicKey, SignedTransaction};

/// High-level interface to the Smesh Ledger app.
///
/// Wraps a transport connection (USB HID or TCP) and exposes all
/// supported operations: version query, key derivation, addresses,
/// transaction signing.
///
/// The protocol is half-duplex; callers must not run two operations
/// against the same handle concurrently.
pub struct LedgerSmesh {
    transport: Box<dyn Transport>,
    cached_pubkey: Option<ExtendedPublicKey>,
}

impl LedgerSmesh {
    /// Connect to a Ledger device running the Smesh app.
    pub fn new(transport_type: &TransportType) -> Result<Self, SmeshError> {
        let transport = transport::open(transport_type)?;
        Ok(Self::with_transport(transport))
    }

    /// Useful for testing or injecting a custom transport.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            cached_pubkey: None,
        }
    }

    /// Query the app version from the device.
    pub fn get_version(&self) -> Result<AppVersion, SmeshError> {
        commands::get_version::exec(self.transport.as_ref())
    }

    /// Derive the extended public key (key + chain code) for `path`.
    pub fn get_extended_public_key(
        &self,
        path: &Bip32Path,
    ) -> Result<ExtendedPublicKey, SmeshError> {
        commands::get_ext_pubkey::exec(self.transport.as_ref(), path)
    }

    /// Derive and return the address for `path`.
    pub fn get_address(&self, path: &Bip32Path) -> Result<Address, SmeshError> {
        commands::get_address::exec(self.transport.as_ref(), path)
    }

    /// Show the address for `path` on the device screen and wait for the
    /// user to confirm. Nothing is returned on success.
    pub fn show_address(&self, path: &Bip32Path) -> Result<(), SmeshError> {
        commands::show_address::exec(self.transport.as_ref(), path)
    }

    /// Sign `tx` with the key at `path`. `tx` starts with its 1-byte
    /// transaction-type prefix; the result carries the signature spliced
    /// in right after it.
    pub fn sign_tx(&self, path: &Bip32Path, tx: &[u8]) -> Result<SignedTransaction, SmeshError> {
        commands::sign_tx::exec(self.transport.as_ref(), path, tx)
    }

    /// Convenience slot for the last retrieved key. Never written by the
    /// library itself and not synchronized.
    pub fn set_cached_pubkey(&mut self, xpub: Option<ExtendedPublicKey>) {
        self.cached_pubkey = xpub;
    }

    pub fn cached_pubkey(&self) -> Option<&ExtendedPublicKey> {
        self.cached_pubkey.as_ref()
    }
}
