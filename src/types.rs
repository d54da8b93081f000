//! Core types: BIP32 derivation paths, app version, extended public key,
//! address, signed transaction.

use std::str::FromStr;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::SmeshError;

/// Hardened derivation bit, `0x8000_0000`.
pub const HARDENED: u32 = 0x8000_0000;

/// Deepest path whose serialized form (1 length byte + 4 bytes per
/// component) still fits a single 240-byte packet.
const MAX_PATH_DEPTH: usize = (crate::protocol::MAX_CHUNK_LEN - 1) / 4;

/// BIP32 derivation path for Smesh accounts.
///
/// The host only validates shape: non-empty, and shallow enough that
/// the serialized path fits a single packet. The device enforces which
/// prefixes it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bip32Path(Vec<u32>);

impl Bip32Path {
    pub fn new(components: Vec<u32>) -> Result<Self, SmeshError> {
        if components.is_empty() {
            return Err(SmeshError::InvalidPath(
                "path must have at least 1 component".into(),
            ));
        }
        if components.len() > MAX_PATH_DEPTH {
            return Err(SmeshError::InvalidPath(format!(
                "path too deep: {} components (max {MAX_PATH_DEPTH})",
                components.len()
            )));
        }
        Ok(Self(components))
    }

    /// Standard account path: `44'/540'/account'/0/index`
    #[must_use]
    pub fn smesh(account: u32, index: u32) -> Self {
        Self(vec![44 | HARDENED, 540 | HARDENED, account | HARDENED, 0, index])
    }

    /// Wire format: `[n: u8][path[0]: u32 BE]...[path[n-1]: u32 BE]`
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.0.len() * 4);
        buf.push(self.0.len() as u8);
        for &component in &self.0 {
            buf.write_u32::<BigEndian>(component).unwrap();
        }
        buf
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

/// Parse `"44'/540'/0'/0/0"` (an optional leading `m/` is accepted;
/// `'`, `h` or `H` mark a hardened component).
impl FromStr for Bip32Path {
    type Err = SmeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("m/").unwrap_or(s);
        let mut components = Vec::new();
        for part in s.split('/') {
            let (digits, hardened) = match part.strip_suffix(|c| matches!(c, '\'' | 'h' | 'H')) {
                Some(digits) => (digits, HARDENED),
                None => (part, 0),
            };
            let value: u32 = digits.parse().map_err(|_| {
                SmeshError::InvalidPath(format!("bad path component {part:?}"))
            })?;
            if value & HARDENED != 0 {
                return Err(SmeshError::InvalidPath(format!(
                    "component {part:?} out of range"
                )));
            }
            components.push(value | hardened);
        }
        Self::new(components)
    }
}

impl std::fmt::Display for Bip32Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m")?;
        for &c in &self.0 {
            let val = c & !HARDENED;
            let h = if c & HARDENED != 0 { "'" } else { "" };
            write!(f, "/{val}{h}")?;
        }
        Ok(())
    }
}

/// App version as reported by GET_VERSION.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub is_debug: bool,
}

impl std::fmt::Display for AppVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.is_debug {
            write!(f, " (debug)")?;
        }
        Ok(())
    }
}

/// 32-byte Ed25519 public key plus the 32-byte BIP32 chain code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    pub public_key: [u8; 32],
    pub chain_code: [u8; 32],
}

impl std::fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            hex::encode(self.public_key),
            hex::encode(self.chain_code)
        )
    }
}

/// Raw address bytes; the length is device-defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(pub Vec<u8>);

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Result of a signing call: the device's signature and public key, plus
/// the transaction with the signature spliced in after the 1-byte
/// transaction-type prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signature: [u8; 64],
    pub public_key: [u8; 32],
    raw: Vec<u8>,
}

impl SignedTransaction {
    pub(crate) fn splice(tx: &[u8], signature: [u8; 64], public_key: [u8; 32]) -> Self {
        let mut raw = Vec::with_capacity(tx.len() + 64);
        raw.push(tx[0]);
        raw.extend_from_slice(&signature);
        raw.extend_from_slice(&tx[1..]);
        Self {
            signature,
            public_key,
            raw,
        }
    }

    /// Transaction bytes ready for submission: type prefix, signature,
    /// then the rest of the original transaction.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}
