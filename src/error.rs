//! Error types and Smesh status word mapping.

use thiserror::Error;

/// Raw status words returned by the Smesh app.
///
/// Codes outside this list are firmware-defined and passed through
/// verbatim in [`SmeshError::DeviceStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StatusWord {
    Ok = 0x9000,
    /// Device thinks it is still mid-way through a previous APDU stream.
    StillInCall = 0x6E04,
    InvalidRequest = 0x6E05,
    InvalidState = 0x6E06,
    InvalidData = 0x6E07,
    InvalidPath = 0x6E08,
    RejectedByUser = 0x6E09,
    RejectedByPolicy = 0x6E10,
    DeviceLocked = 0x6E11,
}

impl StatusWord {
    pub(crate) fn is_success(code: u16) -> bool {
        code == Self::Ok as u16
    }
}

/// Errors returned by the library.
#[derive(Debug, Error)]
pub enum SmeshError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("device returned status 0x{0:04X}: {1}")]
    DeviceStatus(u16, &'static str),

    #[error("device is still in a previous call")]
    StillInCall,

    #[error("device is locked — unlock it and open the Smesh app")]
    DeviceLocked,

    #[error("user rejected the request on device")]
    UserRejected,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid BIP32 path: {0}")]
    InvalidPath(String),

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
}

impl SmeshError {
    pub fn from_status(code: u16) -> Self {
        match code {
            c if c == StatusWord::StillInCall as u16 => Self::StillInCall,
            c if c == StatusWord::InvalidRequest as u16 => {
                Self::DeviceStatus(code, "invalid request")
            }
            c if c == StatusWord::InvalidState as u16 => {
                Self::DeviceStatus(code, "invalid device state")
            }
            c if c == StatusWord::InvalidData as u16 => Self::DeviceStatus(code, "invalid data"),
            c if c == StatusWord::InvalidPath as u16 => {
                Self::DeviceStatus(code, "path rejected by device")
            }
            c if c == StatusWord::RejectedByUser as u16 => Self::UserRejected,
            c if c == StatusWord::RejectedByPolicy as u16 => {
                Self::DeviceStatus(code, "rejected by policy")
            }
            c if c == StatusWord::DeviceLocked as u16 => Self::DeviceLocked,
            _ => Self::DeviceStatus(code, "unknown"),
        }
    }

    /// True for the one status worth retrying (first packet only).
    pub(crate) fn is_still_in_call(&self) -> bool {
        matches!(self, Self::StillInCall)
    }
}


/// Transport-level errors (USB, TCP, IO).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no Ledger device found — is it plugged in?")]
    DeviceNotFound,

    #[error("communication error: {0}")]
    Comm(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("device timed out after {0}ms")]
    Timeout(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
