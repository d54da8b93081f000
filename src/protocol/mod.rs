//! Command dispatcher: turns one logical request into one or more APDU
//! exchanges and validates every response envelope.
//!
//! Small payloads go out in a single packet. The signing payload (path
//! prefix plus transaction) can exceed the 240-byte packet limit, in
//! which case it is split into flagged chunks; the device acknowledges
//! each non-final chunk with an empty payload and returns the result
//! only with the final one.

pub mod chunks;

use crate::apdu::{ApduAnswer, ApduCommand, Instruction};
use crate::error::{SmeshError, StatusWord};
use crate::transport::Transport;
use chunks::chunk_payload;

pub(crate) use chunks::MAX_CHUNK_LEN;

/// Send a single-packet request, with busy-retry on the first (only)
/// packet, and return the response payload.
pub fn execute(
    transport: &dyn Transport,
    ins: Instruction,
    p1: u8,
    data: Vec<u8>,
) -> Result<Vec<u8>, SmeshError> {
    debug_assert!(data.len() <= MAX_CHUNK_LEN);
    let cmd = ApduCommand::with_data(ins, p1, data);
    retry_still_in_call(|| exchange(transport, &cmd))
}

/// Send a payload that may span multiple packets.
///
/// Every non-final response must be a bare success (empty payload); the
/// final response's payload is returned. Any failure aborts the whole
/// sequence — partial sequences are never resumed, the caller restarts
/// the operation.
pub fn execute_chunked(
    transport: &dyn Transport,
    ins: Instruction,
    data: &[u8],
) -> Result<Vec<u8>, SmeshError> {
    let chunks = chunk_payload(data);
    let last = chunks.len() - 1;
    log::debug!(
        "sending {} byte payload as {} packet(s)",
        data.len(),
        chunks.len()
    );

    let mut final_payload = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let cmd = ApduCommand::with_data(ins, chunk.flags.bits(), chunk.data.to_vec());

        // Only the first packet may be retried: the "still in call" reply
        // resets the device to a clean state, so resending packet one is
        // safe, while resending a later chunk would desynchronize the
        // sequence.
        let payload = if i == 0 {
            retry_still_in_call(|| exchange(transport, &cmd))?
        } else {
            exchange(transport, &cmd)?
        };

        if i < last {
            if !payload.is_empty() {
                return Err(SmeshError::InvalidResponse(format!(
                    "expected empty acknowledgement for packet {}/{}, got {} bytes",
                    i + 1,
                    last + 1,
                    payload.len()
                )));
            }
        } else {
            final_payload = payload;
        }
    }

    Ok(final_payload)
}

/// One transport round-trip plus envelope validation.
fn exchange(transport: &dyn Transport, cmd: &ApduCommand) -> Result<Vec<u8>, SmeshError> {
    let answer = transport.exchange(cmd).map_err(SmeshError::Transport)?;
    check_status(&answer)
}

/// Strip and validate the 2-byte status word every response carries.
pub(crate) fn check_status(answer: &ApduAnswer) -> Result<Vec<u8>, SmeshError> {
    if answer.raw().len() < 2 {
        return Err(SmeshError::InvalidResponse(format!(
            "response shorter than a status word: {} byte(s)",
            answer.raw().len()
        )));
    }
    let code = answer.retcode();
    if !StatusWord::is_success(code) {
        return Err(SmeshError::from_status(code));
    }
    Ok(answer.data().to_vec())
}

/// An aborted exchange can leave the device mid-stream; it answers the
/// next request with ERR_STILL_IN_CALL *and* resets itself, so the same
/// request is reissued exactly once. Anything else propagates untouched.
fn retry_still_in_call<F>(mut send: F) -> Result<Vec<u8>, SmeshError>
where
    F: FnMut() -> Result<Vec<u8>, SmeshError>,
{
    match send() {
        Err(e) if e.is_still_in_call() => {
            log::debug!("device still in previous call, retrying once");
            send()
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_status_too_short() {
        for raw in [vec![], vec![0x90]] {
            let err = check_status(&ApduAnswer::from_raw(raw)).unwrap_err();
            assert!(matches!(err, SmeshError::InvalidResponse(_)));
        }
    }

    #[test]
    fn check_status_success_strips_word() {
        let answer = ApduAnswer::from_raw(vec![0x01, 0x02, 0x90, 0x00]);
        assert_eq!(check_status(&answer).unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn check_status_bare_success_is_empty() {
        let answer = ApduAnswer::from_raw(vec![0x90, 0x00]);
        assert!(check_status(&answer).unwrap().is_empty());
    }

    #[test]
    fn check_status_maps_error_codes() {
        let answer = ApduAnswer::from_raw(vec![0x6E, 0x09]);
        assert!(matches!(
            check_status(&answer).unwrap_err(),
            SmeshError::UserRejected
        ));
    }

    #[test]
    fn retry_passes_through_success() {
        let mut calls = 0;
        let result = retry_still_in_call(|| {
            calls += 1;
            Ok(vec![1, 2, 3])
        });
        assert_eq!(result.unwrap(), vec![1, 2, 3]);
        assert_eq!(calls, 1);
    }

    #[test]
    fn retry_reissues_once_on_still_in_call() {
        let mut calls = 0;
        let result = retry_still_in_call(|| {
            calls += 1;
            if calls == 1 {
                Err(SmeshError::StillInCall)
            } else {
                Ok(vec![0xAA])
            }
        });
        assert_eq!(result.unwrap(), vec![0xAA]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn retry_gives_up_after_second_failure() {
        let mut calls = 0;
        let result = retry_still_in_call(|| {
            calls += 1;
            Err(SmeshError::StillInCall)
        });
        assert!(matches!(result.unwrap_err(), SmeshError::StillInCall));
        assert_eq!(calls, 2);
    }

    #[test]
    fn retry_skips_other_errors() {
        let mut calls = 0;
        let result = retry_still_in_call(|| {
            calls += 1;
            Err(SmeshError::UserRejected)
        });
        assert!(matches!(result.unwrap_err(), SmeshError::UserRejected));
        assert_eq!(calls, 1);
    }
}
