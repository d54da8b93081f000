use crate::apdu::{p1, Instruction};
use crate::codec::split_by_lengths;
use crate::error::SmeshError;
use crate::protocol;
use crate::transport::Transport;
use crate::types::{Bip32Path, ExtendedPublicKey};

/// Response: `[pubkey (32)][chain code (32)]`.
///
/// Older firmware appends a 64-byte private-key segment; it is tolerated
/// and discarded, never surfaced to the caller.
pub fn exec(
    transport: &dyn Transport,
    path: &Bip32Path,
) -> Result<ExtendedPublicKey, SmeshError> {
    let data = path.serialize();
    let result = protocol::execute(transport, Instruction::GetExtPublicKey, p1::UNUSED, data)?;
    parse_xpub_response(&result)
}

pub(crate) fn parse_xpub_response(data: &[u8]) -> Result<ExtendedPublicKey, SmeshError> {
    let parts = split_by_lengths(data, &[32, 32])?;
    let rest = parts[2];
    if !rest.is_empty() && rest.len() != 64 {
        return Err(SmeshError::InvalidResponse(format!(
            "unexpected {} trailing byte(s) in extended public key response",
            rest.len()
        )));
    }

    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(parts[0]);
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(parts[1]);

    Ok(ExtendedPublicKey {
        public_key,
        chain_code,
    })
}
