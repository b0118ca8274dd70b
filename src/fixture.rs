use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use num_bigint::BigUint;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::sha2::Sha256;
use rsa::signature::{Keypair, RandomizedSigner, SignatureEncoding, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Serialize;

use crate::certificate;
use crate::error::FixtureError;
use crate::padding::sha256_pad;
use crate::words::split_to_words;

const SHA_BLOCK_BITS: usize = 512;

/// Everything the builder needs, passed in explicitly. The word parameters
/// are the circuit's input schema and are not negotiable at runtime;
/// `assets_dir` turns on the diagnostic PEM export.
#[derive(Clone, Debug)]
pub struct FixtureParams {
    pub key_bits: usize,
    pub word_bits: u64,
    pub signature_words: usize,
    pub modulus_words: usize,
    pub assets_dir: Option<PathBuf>,
}

impl Default for FixtureParams {
    fn default() -> Self {
        Self {
            key_bits: 2048,
            word_bits: 121,
            signature_words: 17,
            modulus_words: 34,
            assets_dir: None,
        }
    }
}

pub struct SignatureFixture {
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
    pub public_key: RsaPublicKey,
    pub certificate_pem: String,
    pub padded_message: Vec<u8>,
    pub message_bit_len: u64,
    pub signature_words: Vec<BigUint>,
    pub modulus_words: Vec<BigUint>,
}

/// Input bundle in the exact shape the rsa-verifier circuit declares, big
/// values as decimal strings, least significant word first.
#[derive(Clone, Debug, Serialize)]
pub struct CircuitInputs {
    #[serde(rename = "SODSignedDataPadded")]
    pub padded_message: Vec<String>,
    #[serde(rename = "SODSignedDataPaddedLength")]
    pub message_bit_len: String,
    #[serde(rename = "SODSignature")]
    pub signature: Vec<String>,
    #[serde(rename = "dsPublicKey")]
    pub public_key: Vec<String>,
}

impl SignatureFixture {
    pub fn circuit_inputs(&self) -> CircuitInputs {
        CircuitInputs {
            padded_message: self.padded_message.iter().map(|b| b.to_string()).collect(),
            message_bit_len: self.message_bit_len.to_string(),
            signature: self.signature_words.iter().map(|w| w.to_string()).collect(),
            public_key: self.modulus_words.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Generate a keypair, sign `payload`, self-verify, and encode everything
/// the circuit wants. Either returns a fully valid fixture or fails; no
/// partial bundle is ever observable.
pub fn build_fixture(
    payload: &str,
    params: &FixtureParams,
) -> Result<SignatureFixture, FixtureError> {
    let mut rng = rand_core::OsRng;

    info!("generating {}-bit RSA keypair", params.key_bits);
    let private_key =
        RsaPrivateKey::new(&mut rng, params.key_bits).map_err(FixtureError::KeyGeneration)?;
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let verifying_key = signing_key.verifying_key();

    let signature = signing_key.sign_with_rng(&mut rng, payload.as_bytes());

    // a fixture whose signature does not verify must never reach the circuit
    verifying_key
        .verify(payload.as_bytes(), &signature)
        .map_err(|_| FixtureError::SignatureVerification)?;

    let certificate_pem =
        certificate::self_signed(&private_key, &certificate::default_extensions())?;

    if let Some(dir) = &params.assets_dir {
        write_pem_files(dir, &private_key, &certificate_pem)?;
    }

    let (padded_message, message_bit_len) = sha256_pad(payload.as_bytes(), SHA_BLOCK_BITS);

    let signature_bytes = signature.to_vec();
    let signature_int = BigUint::from_bytes_be(&signature_bytes);
    let signature_words = split_to_words(&signature_int, params.word_bits, params.signature_words)?;

    let public_key = private_key.to_public_key();
    let modulus = BigUint::from_bytes_be(&public_key.n().to_bytes_be());
    let mut modulus_words = split_to_words(&modulus, params.word_bits, params.modulus_words)?;

    // the circuit takes only the first signature_words words of the wider
    // modulus decomposition; the dropped tail has to actually be zero
    let tail = modulus_words.split_off(params.signature_words);
    if tail.iter().any(|w| w.bits() != 0) {
        return Err(FixtureError::Truncation {
            value_bits: modulus.bits(),
            capacity_bits: params.word_bits * params.signature_words as u64,
        });
    }

    debug!(
        "fixture ready: {} padded bytes, {} signature words, {} modulus words",
        padded_message.len(),
        signature_words.len(),
        modulus_words.len()
    );

    Ok(SignatureFixture {
        payload: payload.as_bytes().to_vec(),
        signature: signature_bytes,
        public_key,
        certificate_pem,
        padded_message,
        message_bit_len,
        signature_words,
        modulus_words,
    })
}

fn write_pem_files(
    dir: &Path,
    private_key: &RsaPrivateKey,
    certificate_pem: &str,
) -> Result<(), FixtureError> {
    fs::create_dir_all(dir)?;

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| FixtureError::PemEncode(e.to_string()))?;
    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| FixtureError::PemEncode(e.to_string()))?;

    fs::write(dir.join("testPrivateKey.pem"), private_pem.as_bytes())?;
    fs::write(dir.join("testPublicKey.pem"), public_pem)?;
    fs::write(dir.join("testCertificate.pem"), certificate_pem)?;

    debug!("wrote PEM files to {}", dir.display());
    Ok(())
}

#[test]
fn test_build_fixture_hello_world() {
    use crate::words::assemble_words;

    let fixture = build_fixture("Hello World", &FixtureParams::default()).unwrap();

    assert_eq!(fixture.payload, b"Hello World");
    assert_eq!(fixture.signature.len(), 256);
    assert_eq!(fixture.message_bit_len, 88);
    assert_eq!(fixture.padded_message.len(), 64);
    assert_eq!(&fixture.padded_message[..11], b"Hello World");
    assert_eq!(fixture.padded_message[11], 0x80);

    // word arrays reconstruct the original integers exactly
    let signature_int = BigUint::from_bytes_be(&fixture.signature);
    assert_eq!(fixture.signature_words.len(), 17);
    assert_eq!(assemble_words(&fixture.signature_words, 121), signature_int);

    let modulus = BigUint::from_bytes_be(&fixture.public_key.n().to_bytes_be());
    assert_eq!(modulus.bits(), 2048);
    assert_eq!(fixture.modulus_words.len(), 17);
    assert_eq!(assemble_words(&fixture.modulus_words, 121), modulus);
}

#[test]
fn test_fixture_signature_verifies_and_tampering_fails() {
    use rsa::pkcs1v15::{Signature, VerifyingKey};

    let fixture = build_fixture("Hello World", &FixtureParams::default()).unwrap();

    let verifying_key = VerifyingKey::<Sha256>::new(fixture.public_key.clone());
    let signature = Signature::try_from(fixture.signature.as_slice()).unwrap();

    assert!(verifying_key.verify(&fixture.payload, &signature).is_ok());

    // any single flipped payload bit must break verification
    for bit in [0, 3, 7] {
        let mut tampered = fixture.payload.clone();
        tampered[0] ^= 1 << bit;
        assert!(verifying_key.verify(&tampered, &signature).is_err());
    }
    let mut tampered = fixture.payload.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x80;
    assert!(verifying_key.verify(&tampered, &signature).is_err());
}

#[test]
fn test_circuit_inputs_schema() {
    let fixture = build_fixture("Hello World", &FixtureParams::default()).unwrap();
    let inputs = fixture.circuit_inputs();

    assert_eq!(inputs.padded_message.len(), 64);
    assert_eq!(inputs.message_bit_len, "88");
    assert_eq!(inputs.signature.len(), 17);
    assert_eq!(inputs.public_key.len(), 17);
    assert_eq!(inputs.padded_message[11], "128");

    // the serialized field names are the circuit's declared schema
    let json = serde_json::to_value(&inputs).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 4);
    for field in [
        "SODSignedDataPadded",
        "SODSignedDataPaddedLength",
        "SODSignature",
        "dsPublicKey",
    ] {
        assert!(object.contains_key(field), "missing {field}");
    }
}

#[test]
fn test_fixture_writes_pem_files_on_request() {
    use crate::extract::extract_public_key_from_file;
    use rsa::pkcs8::DecodePrivateKey;

    let dir = std::env::temp_dir().join(format!("rsa-fixture-pems-{}", std::process::id()));
    let params = FixtureParams {
        assets_dir: Some(dir.clone()),
        ..FixtureParams::default()
    };

    let fixture = build_fixture("Hello World", &params).unwrap();

    let imported = extract_public_key_from_file(&dir.join("testCertificate.pem")).unwrap();
    assert_eq!(imported.as_ref().n(), fixture.public_key.n());
    assert_eq!(imported.as_ref().e(), fixture.public_key.e());

    let private_pem = fs::read_to_string(dir.join("testPrivateKey.pem")).unwrap();
    let reloaded = RsaPrivateKey::from_pkcs8_pem(&private_pem).unwrap();
    assert_eq!(reloaded.n(), fixture.public_key.n());

    assert!(dir.join("testPublicKey.pem").exists());
    fs::remove_dir_all(&dir).unwrap();
}
