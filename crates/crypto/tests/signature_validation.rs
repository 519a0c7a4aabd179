use shardnet_crypto::{LocalKeySigner, MultiKeySigner, Signer};
use shardnet_types::MAX_AUTH_DATA_BYTES;

const DETERMINISTIC_KEY: [u8; 32] = [42u8; 32];

#[test]
fn secp256k1_signature_roundtrip_succeeds() {
    let signer = LocalKeySigner::random();
    let digest = [0x5Au8; 32];

    let signature = signer.sign(&digest).unwrap();
    assert!(signer.verify(&digest, &signature));
}

#[test]
fn secp256k1_signature_rejects_tampered_signature() {
    let signer = LocalKeySigner::random();
    let digest = [0x5Au8; 32];

    let mut signature = signer.sign(&digest).unwrap();
    signature[0] ^= 0xFF;

    assert!(!signer.verify(&digest, &signature));
}

#[test]
fn deterministic_key_derivation_is_reproducible() {
    let a = LocalKeySigner::from_private_key(&DETERMINISTIC_KEY).unwrap();
    let b = LocalKeySigner::from_private_key(&DETERMINISTIC_KEY).unwrap();

    assert_eq!(a.public_key(), b.public_key());
    assert_eq!(a.address(1).unwrap(), b.address(1).unwrap());
}

#[test]
fn schemes_are_interchangeable_behind_the_trait() {
    // The envelope layer sees only `&dyn Signer`; both schemes must
    // produce auth data that fits the transaction schema.
    let single = LocalKeySigner::random();
    let multi =
        MultiKeySigner::new(vec![LocalKeySigner::random(), LocalKeySigner::random()]).unwrap();
    let signers: Vec<&dyn Signer> = vec![&single, &multi];

    let digest = [0x17u8; 32];
    for signer in signers {
        let auth_data = signer.sign(&digest).unwrap();
        assert!(!auth_data.is_empty());
        assert!(auth_data.len() <= MAX_AUTH_DATA_BYTES);
    }
}
