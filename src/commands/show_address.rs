use crate::apdu::{p1, Instruction};
use crate::error::SmeshError;
use crate::protocol;
use crate::transport::Transport;
use crate::types::Bip32Path;

/// Same wire format as the address query, but P1 asks the device to
/// display the address on screen instead of returning it. Blocks until
/// the user confirms or rejects; the success payload must be empty.
pub fn exec(transport: &dyn Transport, path: &Bip32Path) -> Result<(), SmeshError> {
    let data = path.serialize();
    let result = protocol::execute(transport, Instruction::GetAddress, p1::DISPLAY, data)?;
    if !result.is_empty() {
        return Err(SmeshError::InvalidResponse(format!(
            "show address returned {} unexpected byte(s)",
            result.len()
        )));
    }
    Ok(())
}
