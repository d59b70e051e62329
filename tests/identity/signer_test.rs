use provledger::identity::{Keypair, Signature, SignatureError, Signer};

/// Test: A signature verifies only for its own message and key
#[test]
fn test_sign_and_verify() {
    let keypair = Keypair::generate();
    let other = Keypair::generate();
    let signature = Signer::sign(&keypair, b"transfer 500000");

    assert!(Signer::verify(&keypair.public_key(), b"transfer 500000", &signature));
    assert!(!Signer::verify(&keypair.public_key(), b"transfer 500001", &signature));
    assert!(!Signer::verify(&other.public_key(), b"transfer 500000", &signature));
}

/// Test: Signature bytes round trip
#[test]
fn test_signature_from_bytes() {
    let keypair = Keypair::generate();
    let signature = keypair.sign(b"approve");

    let restored = Signature::from_bytes(signature.as_bytes()).expect("Should restore signature");
    assert_eq!(signature, restored);
    assert!(Signer::verify(&keypair.public_key(), b"approve", &restored));
}

/// Test: Signatures must be exactly 64 bytes
#[test]
fn test_signature_wrong_length() {
    assert!(matches!(Signature::from_bytes(&[0u8; 63]), Err(SignatureError::InvalidLength(_))));
}
