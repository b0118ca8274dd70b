use thiserror::Error;

/// Everything here is fatal where it occurs: a fixture is either fully
/// valid or the call fails, no partial bundles escape.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("key generation failed: {0}")]
    KeyGeneration(rsa::Error),
    #[error("signature failed self-verification")]
    SignatureVerification,
    #[error("value of {value_bits} bits does not fit in {capacity_bits} bits of words")]
    Truncation { value_bits: u64, capacity_bits: u64 },
    #[error("malformed PEM input: {0}")]
    MalformedInput(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("certificate build failed: {0}")]
    CertificateBuild(String),
    #[error("PEM encoding failed: {0}")]
    PemEncode(String),
    #[error("PEM write failed: {0}")]
    PemWrite(#[from] std::io::Error),
}
