//! Individual command implementations.
//!
//! You probably want [`LedgerSmesh`](crate::api::LedgerSmesh) instead.

pub mod get_address;
pub mod get_ext_pubkey;
pub mod get_version;
pub mod show_address;
pub mod sign_tx;
