//! Deterministic test fixtures for an RSA-SHA256 verifier circuit.
//!
//! A payload goes in; out come a fresh 2048-bit keypair, a self-signed
//! certificate, a PKCS1v1.5/SHA-256 signature that has already survived
//! self-verification, and the signature/modulus re-encoded as 121-bit
//! words the circuit's field arithmetic expects. Witness execution lives
//! behind the `circuit::CircuitHarness` trait; this crate only prepares
//! bit-exact inputs for it.

pub mod certificate;
pub mod circuit;
mod error;
pub mod extract;
pub mod fixture;
pub mod padding;
pub mod words;

pub use error::FixtureError;
pub use fixture::{build_fixture, CircuitInputs, FixtureParams, SignatureFixture};
