//! End-to-end tests driving [`LedgerSmesh`] through a scripted mock
//! transport: packet counts, chunk flags, busy-retry, response decoding.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ledger_smesh::apdu::{ApduAnswer, ApduCommand, ChunkFlags};
use ledger_smesh::error::TransportError;
use ledger_smesh::transport::Transport;
use ledger_smesh::{Bip32Path, LedgerSmesh, SmeshError, HARDENED};

/// Replays scripted raw responses and records every command sent.
#[derive(Clone, Default)]
struct MockTransport {
    responses: Arc<Mutex<VecDeque<Vec<u8>>>>,
    sent: Arc<Mutex<Vec<ApduCommand>>>,
}

impl MockTransport {
    fn scripted(responses: &[Vec<u8>]) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.iter().cloned().collect())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn sent(&self) -> Vec<ApduCommand> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, TransportError> {
        self.sent.lock().unwrap().push(command.clone());
        let raw = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Comm("no scripted response left".into()))?;
        Ok(ApduAnswer::from_raw(raw))
    }
}

fn device(transport: &MockTransport) -> LedgerSmesh {
    LedgerSmesh::with_transport(Box::new(transport.clone()))
}

fn ok(payload: &[u8]) -> Vec<u8> {
    let mut raw = payload.to_vec();
    raw.extend_from_slice(&[0x90, 0x00]);
    raw
}

fn test_path() -> Bip32Path {
    Bip32Path::new(vec![44 | HARDENED, 540 | HARDENED, HARDENED, 0, 0]).unwrap()
}

// -- get_version --

#[test]
fn get_version_end_to_end() {
    let transport = MockTransport::scripted(&[ok(&[1, 2, 3, 0])]);
    let version = device(&transport).get_version().unwrap();

    assert_eq!((version.major, version.minor, version.patch), (1, 2, 3));
    assert!(!version.is_debug);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].cla, 0x30);
    assert_eq!(sent[0].ins, 0x00);
    assert_eq!((sent[0].p1, sent[0].p2), (0x00, 0x00));
    assert!(sent[0].data.is_empty());
}

#[test]
fn get_version_retries_once_when_still_in_call() {
    let transport = MockTransport::scripted(&[vec![0x6E, 0x04], ok(&[0, 9, 1, 1])]);
    let version = device(&transport).get_version().unwrap();
    assert!(version.is_debug);

    // identical request reissued
    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].serialize(), sent[1].serialize());
}

#[test]
fn get_version_gives_up_after_second_busy() {
    let transport = MockTransport::scripted(&[vec![0x6E, 0x04], vec![0x6E, 0x04]]);
    let err = device(&transport).get_version().unwrap_err();
    assert!(matches!(err, SmeshError::StillInCall));
    assert_eq!(transport.sent().len(), 2);
}

// -- get_extended_public_key --

#[test]
fn get_extended_public_key_end_to_end() {
    let mut payload = vec![0x11; 32];
    payload.extend_from_slice(&[0x22; 32]);
    let transport = MockTransport::scripted(&[ok(&payload)]);

    let xpub = device(&transport)
        .get_extended_public_key(&test_path())
        .unwrap();
    assert_eq!(xpub.public_key, [0x11; 32]);
    assert_eq!(xpub.chain_code, [0x22; 32]);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].ins, 0x10);
    assert_eq!(sent[0].data, test_path().serialize());
}

#[test]
fn get_extended_public_key_retry_returns_second_attempt() {
    let mut payload = vec![0x44; 32];
    payload.extend_from_slice(&[0x55; 32]);
    let transport = MockTransport::scripted(&[vec![0x6E, 0x04], ok(&payload)]);

    let xpub = device(&transport)
        .get_extended_public_key(&test_path())
        .unwrap();
    assert_eq!(xpub.public_key, [0x44; 32]);
    assert_eq!(transport.sent().len(), 2);
}

#[test]
fn get_extended_public_key_bad_shape_is_fatal() {
    let transport = MockTransport::scripted(&[ok(&[0x00; 40])]);
    let err = device(&transport)
        .get_extended_public_key(&test_path())
        .unwrap_err();
    assert!(matches!(err, SmeshError::InvalidResponse(_)));
}

// -- get_address / show_address --

#[test]
fn get_address_returns_device_bytes_exactly() {
    let addr = [0xC4; 20];
    let transport = MockTransport::scripted(&[ok(&addr)]);

    let address = device(&transport).get_address(&test_path()).unwrap();
    assert_eq!(address.as_ref(), &addr);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].ins, 0x11);
    assert_eq!(sent[0].p1, 0x01); // return mode
}

#[test]
fn show_address_sends_display_mode_and_expects_empty() {
    let transport = MockTransport::scripted(&[ok(&[])]);
    device(&transport).show_address(&test_path()).unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].ins, 0x11);
    assert_eq!(sent[0].p1, 0x02); // display mode
}

#[test]
fn show_address_rejects_unexpected_payload() {
    let transport = MockTransport::scripted(&[ok(&[0x01])]);
    let err = device(&transport).show_address(&test_path()).unwrap_err();
    assert!(matches!(err, SmeshError::InvalidResponse(_)));
}

#[test]
fn deep_paths_fail_validation_instead_of_overflowing_a_packet() {
    // 64 components would serialize to 257 bytes, past both the packet
    // payload limit and the APDU LC byte
    let err = Bip32Path::new(vec![HARDENED; 64]).unwrap_err();
    assert!(matches!(err, SmeshError::InvalidPath(_)));

    // the deepest accepted path still goes through a single packet
    let deepest = Bip32Path::new(vec![HARDENED; 59]).unwrap();
    let addr = [0xC4; 20];
    let transport = MockTransport::scripted(&[ok(&addr)]);
    let address = device(&transport).get_address(&deepest).unwrap();
    assert_eq!(address.as_ref(), &addr);
    assert_eq!(transport.sent()[0].data.len(), 1 + 59 * 4);
}

#[test]
fn user_rejection_propagates_with_no_retry() {
    let transport = MockTransport::scripted(&[vec![0x6E, 0x09]]);
    let err = device(&transport).get_address(&test_path()).unwrap_err();
    assert!(matches!(err, SmeshError::UserRejected));
    assert_eq!(transport.sent().len(), 1);
}

// -- sign_tx --

fn sign_response() -> Vec<u8> {
    let mut payload = vec![0xAA; 64];
    payload.extend_from_slice(&[0xBB; 32]);
    ok(&payload)
}

#[test]
fn sign_tx_single_packet() {
    let tx = {
        let mut tx = vec![0x00];
        tx.extend_from_slice(&[0x77; 99]);
        tx
    };
    let transport = MockTransport::scripted(&[sign_response()]);

    let signed = device(&transport).sign_tx(&test_path(), &tx).unwrap();
    assert_eq!(signed.signature, [0xAA; 64]);
    assert_eq!(signed.public_key, [0xBB; 32]);

    // one packet, flagged as both first and last
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].ins, 0x20);
    assert_eq!(
        sent[0].p1,
        (ChunkFlags::HAS_HEADER | ChunkFlags::IS_LAST).bits()
    );

    // payload is path bytes followed by the transaction
    let mut expected = test_path().serialize();
    expected.extend_from_slice(&tx);
    assert_eq!(sent[0].data, expected);
}

#[test]
fn sign_tx_splices_signature_after_type_prefix() {
    let mut tx = vec![0x00];
    tx.extend_from_slice(&[0x5A; 50]);
    let transport = MockTransport::scripted(&[sign_response()]);

    let signed = device(&transport).sign_tx(&test_path(), &tx).unwrap();
    let raw = signed.as_bytes();
    assert_eq!(raw[0], 0x00);
    assert_eq!(&raw[1..65], &[0xAA; 64]);
    assert_eq!(&raw[65..], &tx[1..]);
}

#[test]
fn sign_tx_chunked_packet_sequence() {
    // path (21 bytes) + tx (500 bytes) = 521 -> 3 packets of 240/240/41
    let mut tx = vec![0x00];
    tx.extend_from_slice(&[0x33; 499]);
    let transport = MockTransport::scripted(&[ok(&[]), ok(&[]), sign_response()]);

    let signed = device(&transport).sign_tx(&test_path(), &tx).unwrap();
    assert_eq!(signed.signature, [0xAA; 64]);

    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(
        sent[0].p1,
        (ChunkFlags::HAS_HEADER | ChunkFlags::HAS_DATA).bits()
    );
    assert_eq!(sent[1].p1, ChunkFlags::HAS_DATA.bits());
    assert_eq!(sent[2].p1, ChunkFlags::IS_LAST.bits());
    assert_eq!(sent[0].data.len(), 240);
    assert_eq!(sent[1].data.len(), 240);
    assert_eq!(sent[2].data.len(), 41);

    // chunks reassemble to path ++ tx
    let mut expected = test_path().serialize();
    expected.extend_from_slice(&tx);
    let rejoined: Vec<u8> = sent.iter().flat_map(|c| c.data.iter().copied()).collect();
    assert_eq!(rejoined, expected);
}

#[test]
fn sign_tx_rejects_data_in_intermediate_ack() {
    let mut tx = vec![0x00];
    tx.extend_from_slice(&[0x33; 499]);
    let transport = MockTransport::scripted(&[ok(&[0xEE]), ok(&[]), sign_response()]);

    let err = device(&transport).sign_tx(&test_path(), &tx).unwrap_err();
    assert!(matches!(err, SmeshError::InvalidResponse(_)));
    // sequence aborted after the bad acknowledgement
    assert_eq!(transport.sent().len(), 1);
}

#[test]
fn sign_tx_aborts_on_mid_sequence_error() {
    let mut tx = vec![0x00];
    tx.extend_from_slice(&[0x33; 499]);
    let transport = MockTransport::scripted(&[ok(&[]), vec![0x6E, 0x09]]);

    let err = device(&transport).sign_tx(&test_path(), &tx).unwrap_err();
    assert!(matches!(err, SmeshError::UserRejected));
    assert_eq!(transport.sent().len(), 2);
}

#[test]
fn sign_tx_busy_retry_applies_to_first_packet_only() {
    let mut tx = vec![0x00];
    tx.extend_from_slice(&[0x33; 499]);
    // first packet busy once, then the full 3-packet run
    let transport =
        MockTransport::scripted(&[vec![0x6E, 0x04], ok(&[]), ok(&[]), sign_response()]);

    device(&transport).sign_tx(&test_path(), &tx).unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[0].serialize(), sent[1].serialize());
    // later chunks are never the retried packet
    assert_eq!(sent[2].p1, ChunkFlags::HAS_DATA.bits());
    assert_eq!(sent[3].p1, ChunkFlags::IS_LAST.bits());
}

#[test]
fn sign_tx_empty_transaction_fails_before_transport() {
    let transport = MockTransport::scripted(&[]);
    let err = device(&transport).sign_tx(&test_path(), &[]).unwrap_err();
    assert!(matches!(err, SmeshError::InvalidTransaction(_)));
    assert!(transport.sent().is_empty());
}

// -- cached pubkey slot --

#[test]
fn cached_pubkey_slot_round_trips() {
    let mut payload = vec![0x11; 32];
    payload.extend_from_slice(&[0x22; 32]);
    let transport = MockTransport::scripted(&[ok(&payload)]);

    let mut smesh = device(&transport);
    assert!(smesh.cached_pubkey().is_none());

    let xpub = smesh.get_extended_public_key(&test_path()).unwrap();
    smesh.set_cached_pubkey(Some(xpub.clone()));
    assert_eq!(smesh.cached_pubkey(), Some(&xpub));

    smesh.set_cached_pubkey(None);
    assert!(smesh.cached_pubkey().is_none());
}
