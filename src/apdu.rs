//! APDU command and response types.
//!
//! The Smesh app uses CLA `0x30` for all commands. P2 is always `0x00`;
//! P1 carries per-instruction semantics (return-vs-display for addresses,
//! chunk role flags for signing).

use bitflags::bitflags;

/// Instruction class shared by every Smesh command.
pub const CLA: u8 = 0x30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Instruction {
    GetVersion = 0x00,
    GetExtPublicKey = 0x10,
    GetAddress = 0x11,
    SignTx = 0x20,
}

/// Fixed P1 values. Multi-packet instructions use [`ChunkFlags`] instead.
pub mod p1 {
    /// P1 is not used by this instruction.
    pub const UNUSED: u8 = 0x00;
    /// Return the address to the host.
    pub const RETURN: u8 = 0x01;
    /// Display the address on the device for user confirmation.
    pub const DISPLAY: u8 = 0x02;
}

bitflags! {
    /// Chunk role bitmask sent in P1 for multi-packet instructions.
    ///
    /// Exactly one packet of a sequence sets `HAS_HEADER` (the first) and
    /// exactly one sets `IS_LAST` (the last); a single-packet transfer
    /// sets both at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChunkFlags: u8 {
        /// Packet carries the path/header prefix.
        const HAS_HEADER = 0x01;
        /// Packet carries payload body and is not the final packet.
        const HAS_DATA = 0x02;
        /// Final packet of the sequence.
        const IS_LAST = 0x04;
    }
}

#[derive(Debug, Clone)]
pub struct ApduCommand {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

impl ApduCommand {
    pub fn new(ins: Instruction) -> Self {
        Self {
            cla: CLA,
            ins: ins as u8,
            p1: 0x00,
            p2: 0x00,
            data: Vec::new(),
        }
    }

    pub fn with_data(ins: Instruction, p1: u8, data: Vec<u8>) -> Self {
        Self {
            cla: CLA,
            ins: ins as u8,
            p1,
            p2: 0x00,
            data,
        }
    }

    /// Wire format: `[CLA][INS][P1][P2][LC][DATA]`
    ///
    /// # Panics
    ///
    /// Panics if `data` exceeds 255 bytes (short APDU LC limit). The
    /// dispatcher never builds packets above 240 bytes of payload.
    pub fn serialize(&self) -> Vec<u8> {
        assert!(
            self.data.len() <= 255,
            "APDU data too long: {} bytes (max 255)",
            self.data.len()
        );
        let mut buf = Vec::with_capacity(5 + self.data.len());
        buf.push(self.cla);
        buf.push(self.ins);
        buf.push(self.p1);
        buf.push(self.p2);
        buf.push(self.data.len() as u8);
        buf.extend_from_slice(&self.data);
        buf
    }
}

/// APDU response - last 2 bytes are the status word, everything before
/// that is the payload. Use [`data()`](ApduAnswer::data) to strip the SW.
#[derive(Debug, Clone)]
pub struct ApduAnswer {
    raw: Vec<u8>,
}

impl ApduAnswer {
    pub fn from_raw(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn retcode(&self) -> u16 {
        if self.raw.len() < 2 {
            return 0;
        }
        let len = self.raw.len();
        ((self.raw[len - 2] as u16) << 8) | (self.raw[len - 1] as u16)
    }

    /// Payload only - strips the trailing 2-byte status word.
    pub fn data(&self) -> &[u8] {
        if self.raw.len() < 2 {
            return &[];
        }
        &self.raw[..self.raw.len() - 2]
    }
}
