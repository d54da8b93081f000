use crate::apdu::{p1, Instruction};
use crate::error::SmeshError;
use crate::protocol;
use crate::transport::Transport;
use crate::types::AppVersion;

const FLAG_IS_DEBUG: u8 = 0x01;

/// Response: `[major][minor][patch][flags]` - exactly 4 bytes.
pub fn exec(transport: &dyn Transport) -> Result<AppVersion, SmeshError> {
    let result = protocol::execute(transport, Instruction::GetVersion, p1::UNUSED, Vec::new())?;
    parse_version_response(&result)
}

pub(crate) fn parse_version_response(data: &[u8]) -> Result<AppVersion, SmeshError> {
    if data.len() != 4 {
        return Err(SmeshError::InvalidResponse(format!(
            "version response must be 4 bytes, got {}",
            data.len()
        )));
    }

    Ok(AppVersion {
        major: data[0],
        minor: data[1],
        patch: data[2],
        is_debug: data[3] & FLAG_IS_DEBUG == FLAG_IS_DEBUG,
    })
}
