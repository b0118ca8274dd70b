use num_bigint::BigUint;

use crate::error::FixtureError;

/// Base-2^W positional split, least significant word first, every word in
/// [0, 2^W). Fails instead of dropping high bits: a circuit fed a truncated
/// modulus produces a wrong witness without any other symptom.
pub fn split_to_words(
    value: &BigUint,
    word_bits: u64,
    word_count: usize,
) -> Result<Vec<BigUint>, FixtureError> {
    assert!(word_bits > 0);
    assert!(word_count > 0);

    let capacity_bits = word_bits * word_count as u64;
    if value.bits() > capacity_bits {
        return Err(FixtureError::Truncation {
            value_bits: value.bits(),
            capacity_bits,
        });
    }

    let mask = (BigUint::from(1u8) << word_bits) - 1u8;
    let words = (0..word_count as u64)
        .map(|i| (value >> (i * word_bits)) & &mask)
        .collect();

    Ok(words)
}

/// Inverse of `split_to_words`: Σ word[i] · 2^(i·W).
pub fn assemble_words(words: &[BigUint], word_bits: u64) -> BigUint {
    words
        .iter()
        .rev()
        .fold(BigUint::default(), |acc, w| (acc << word_bits) | w)
}

#[test]
fn test_split_assemble_round_trip() {
    let value = BigUint::parse_bytes(
        b"e5ab8aa543b1e268742a3d3e0ca1256c5345e01256d7b60d1f6f0e3763d8e0b1\
          9c4c51aa6ba8b6e5d2f77e0d3a4c8f9b0217356d8a9e4f1c2b3d4e5f60718293",
        16,
    )
    .unwrap();

    let words = split_to_words(&value, 121, 17).unwrap();
    assert_eq!(words.len(), 17);
    for w in &words {
        assert!(w.bits() <= 121);
    }
    assert_eq!(assemble_words(&words, 121), value);
}

#[test]
fn test_split_zero() {
    let words = split_to_words(&BigUint::default(), 121, 17).unwrap();
    assert!(words.iter().all(|w| w.bits() == 0));
    assert_eq!(assemble_words(&words, 121), BigUint::default());
}

#[test]
fn test_split_exact_capacity() {
    // 2^(121 * 17) - 1 fills every word completely
    let value = (BigUint::from(1u8) << (121u64 * 17)) - 1u8;
    let words = split_to_words(&value, 121, 17).unwrap();
    let full = (BigUint::from(1u8) << 121u64) - 1u8;
    assert!(words.iter().all(|w| *w == full));
    assert_eq!(assemble_words(&words, 121), value);
}

#[test]
fn test_split_rejects_oversized_value() {
    let value = BigUint::from(1u8) << (121u64 * 17);
    match split_to_words(&value, 121, 17) {
        Err(FixtureError::Truncation {
            value_bits,
            capacity_bits,
        }) => {
            assert_eq!(value_bits, 121 * 17 + 1);
            assert_eq!(capacity_bits, 121 * 17);
        }
        other => panic!("expected truncation failure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_split_small_words() {
    // 0x0504030201 over 8-bit words reads off the bytes little endian
    let value = BigUint::from(0x0504030201u64);
    let words = split_to_words(&value, 8, 6).unwrap();
    let bytes: Vec<u8> = words.iter().map(|w| w.to_bytes_le()[0]).collect();
    assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04, 0x05, 0x00]);
}
