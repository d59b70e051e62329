use provledger::call::{Call, CallBuilder, CallCodec, CodecError, SignedCall};
use provledger::identity::{Address, Keypair};
use provledger::token::UNLIMITED_ALLOWANCE;

fn approve_call(keypair: &Keypair) -> SignedCall {
    CallBuilder::new()
        .signer(keypair)
        .call(Call::Approve {
            spender: Address::from_bytes([3; 20]),
            amount: UNLIMITED_ALLOWANCE,
        })
        .build()
        .expect("build")
}

/// Test: Every wire form decodes to the same still-valid call
#[test]
fn test_wire_forms_decode() {
    let keypair = Keypair::generate();
    let signed = approve_call(&keypair);

    let binary = CallCodec::decode(&CallCodec::encode(&signed).expect("encode")).expect("decode");
    let hex = CallCodec::decode_hex(&CallCodec::encode_hex(&signed).expect("hex")).expect("unhex");
    let b64 = CallCodec::decode_base64(&CallCodec::encode_base64(&signed).expect("b64")).expect("unb64");

    for decoded in [binary, hex, b64] {
        assert_eq!(decoded, signed);
        assert!(decoded.verify());
        assert_eq!(decoded.id(), signed.id());
    }
}

/// Test: Base64 output is URL safe
#[test]
fn test_base64_is_url_safe() {
    let keypair = Keypair::generate();
    let encoded = CallCodec::encode_base64(&approve_call(&keypair)).expect("encode");

    assert!(!encoded.contains('+'));
    assert!(!encoded.contains('/'));
    assert!(!encoded.contains('='));
}

/// Test: Garbage input yields typed errors
#[test]
fn test_decode_errors() {
    assert!(matches!(CallCodec::decode_hex("not hex"), Err(CodecError::InvalidHex(_))));
    assert!(matches!(CallCodec::decode_base64("***"), Err(CodecError::InvalidBase64(_))));
    assert!(matches!(CallCodec::decode(&[1, 2, 3]), Err(CodecError::DecodeError(_))));
}

/// Test: A flipped byte in the signature stops verification
#[test]
fn test_corrupted_signature_fails_verify() {
    let keypair = Keypair::generate();
    let signed = approve_call(&keypair);
    let mut bytes = CallCodec::encode(&signed).expect("encode");

    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;

    if let Ok(decoded) = CallCodec::decode(&bytes) {
        assert!(!decoded.verify());
    }
}
