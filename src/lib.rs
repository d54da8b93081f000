//! Rust client for the Spacemesh Ledger app ("Smesh").
//!
//! Talks to the Ledger hardware wallet over USB HID or TCP (Speculos
//! simulator): encodes BIP32 paths and transaction payloads into APDU
//! packets, drives multi-packet exchanges, and decodes responses into
//! typed results.
//!
//! # Quick start
//!
#![cfg_attr(feature = "hid", doc = "```no_run")]
#![cfg_attr(not(feature = "hid"), doc = "```ignore")]
//! use ledger_smesh::{Bip32Path, LedgerSmesh, TransportType};
//!
//! let smesh = LedgerSmesh::new(&TransportType::NativeHID)?;
//!
//! let version = smesh.get_version()?;
//! println!("{version}");
//!
//! let path = Bip32Path::smesh(0, 0);
//! let address = smesh.get_address(&path)?;
//! println!("address: {address}");
//! # Ok::<(), ledger_smesh::SmeshError>(())
//! ```
//!
//! # Modules
//!
//! - [`api`] -- high-level [`LedgerSmesh`] facade
//! - [`apdu`] -- command/response framing types
//! - [`transport`] -- device communication (USB HID, TCP)
//! - [`codec`] -- hex and buffer helpers
//! - [`types`] -- [`Bip32Path`], [`AppVersion`], [`ExtendedPublicKey`],
//!   [`Address`], [`SignedTransaction`]
//!
//! # Feature flags
//!
//! - `hid` (default) -- USB HID transport for real Ledger devices
//! - `tcp` -- TCP transport for the Speculos simulator

pub mod apdu;
pub mod api;
pub(crate) mod commands;
pub mod codec;
pub mod error;
pub(crate) mod protocol;
pub mod transport;
pub mod types;

pub use api::LedgerSmesh;
pub use error::{SmeshError, StatusWord};
#[cfg(feature = "hid")]
pub use transport::hid::DeviceType;
pub use transport::TransportType;
pub use types::{
    Address, AppVersion, Bip32Path, ExtendedPublicKey, SignedTransaction, HARDENED,
};
