use crate::apdu::{p1, Instruction};
use crate::error::SmeshError;
use crate::protocol;
use crate::transport::Transport;
use crate::types::{Address, Bip32Path};

/// The whole response payload is the address; its length is up to the
/// device firmware.
pub fn exec(transport: &dyn Transport, path: &Bip32Path) -> Result<Address, SmeshError> {
    let data = path.serialize();
    let result = protocol::execute(transport, Instruction::GetAddress, p1::RETURN, data)?;
    if result.is_empty() {
        return Err(SmeshError::InvalidResponse("empty address response".into()));
    }
    Ok(Address(result))
}
