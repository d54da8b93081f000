use crate::apdu::Instruction;
use crate::codec::split_by_lengths;
use crate::error::SmeshError;
use crate::protocol;
use crate::transport::Transport;
use crate::types::{Bip32Path, SignedTransaction};

/// Payload: path bytes followed by the raw transaction, chunked when the
/// combined buffer exceeds one packet. Response (final packet only):
/// `[signature (64)][pubkey (32)]`.
pub fn exec(
    transport: &dyn Transport,
    path: &Bip32Path,
    tx: &[u8],
) -> Result<SignedTransaction, SmeshError> {
    if tx.is_empty() {
        return Err(SmeshError::InvalidTransaction(
            "transaction must carry at least the 1-byte type prefix".into(),
        ));
    }

    let mut data = path.serialize();
    data.extend_from_slice(tx);

    let result = protocol::execute_chunked(transport, Instruction::SignTx, &data)?;
    parse_sign_response(tx, &result)
}

pub(crate) fn parse_sign_response(
    tx: &[u8],
    data: &[u8],
) -> Result<SignedTransaction, SmeshError> {
    let parts = split_by_lengths(data, &[64, 32])?;
    if !parts[2].is_empty() {
        return Err(SmeshError::InvalidResponse(format!(
            "unexpected {} trailing byte(s) in signature response",
            parts[2].len()
        )));
    }

    let mut signature = [0u8; 64];
    signature.copy_from_slice(parts[0]);
    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(parts[1]);

    Ok(SignedTransaction::splice(tx, signature, public_key))
}
