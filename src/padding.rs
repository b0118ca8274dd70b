use num_integer::Integer;

/// SHA-256 message-schedule padding over `block_bits`-bit blocks:
/// data || 0x80 || zeros || bit length as 8 bytes big endian.
///
/// Returns the padded buffer and the bit count of the *unpadded* data; the
/// circuit needs the original length to know how much of the buffer is
/// authentic. Pure, no hidden state.
pub fn sha256_pad(data: &[u8], block_bits: usize) -> (Vec<u8>, u64) {
    assert!(block_bits > 0 && block_bits % 8 == 0);
    let block_bytes = block_bits / 8;
    // the trailing length field must fit in a block alongside the 0x80 marker
    assert!(block_bytes > 8);

    let bit_len = data.len() as u64 * 8;

    // 0x80 marker plus 8 length bytes, rounded up to whole blocks
    let blocks = Integer::div_ceil(&(data.len() + 9), &block_bytes);
    let mut padded = Vec::with_capacity(blocks * block_bytes);

    padded.extend_from_slice(data);
    padded.push(0x80);
    padded.resize(blocks * block_bytes - 8, 0x00);
    padded.extend_from_slice(&bit_len.to_be_bytes());

    (padded, bit_len)
}

#[test]
fn test_pad_hello_world() {
    let (padded, bit_len) = sha256_pad(b"Hello World", 512);

    assert_eq!(bit_len, 88);
    assert_eq!(padded.len(), 64);
    assert_eq!(&padded[..11], b"Hello World");
    assert_eq!(padded[11], 0x80);
    assert!(padded[12..56].iter().all(|&b| b == 0x00));
    assert_eq!(&padded[56..], 88u64.to_be_bytes());
}

#[test]
fn test_pad_empty() {
    let (padded, bit_len) = sha256_pad(b"", 512);
    assert_eq!(bit_len, 0);
    assert_eq!(padded.len(), 64);
    assert_eq!(padded[0], 0x80);
    assert!(padded[1..].iter().all(|&b| b == 0x00));
}

#[test]
fn test_pad_block_boundaries() {
    // 55 bytes is the most that still fits one block with marker and length
    let (padded, _) = sha256_pad(&[0xaa; 55], 512);
    assert_eq!(padded.len(), 64);

    // one more byte forces a second block
    let (padded, bit_len) = sha256_pad(&[0xaa; 56], 512);
    assert_eq!(padded.len(), 128);
    assert_eq!(bit_len, 448);
    assert_eq!(padded[56], 0x80);
    assert_eq!(&padded[120..], 448u64.to_be_bytes());
}

#[test]
fn test_pad_matches_fips_abc_vector() {
    // the padded single block for "abc" from the SHA-256 specification:
    // 61 62 63 80 00 .. 00 | 00 00 00 00 00 00 00 18
    let (padded, bit_len) = sha256_pad(b"abc", 512);

    let mut expected = vec![0x61, 0x62, 0x63, 0x80];
    expected.resize(63, 0x00);
    expected.push(0x18);

    assert_eq!(padded, expected);
    assert_eq!(bit_len, 24);
}

#[test]
fn test_pad_is_deterministic() {
    let a = sha256_pad(b"same input", 512);
    let b = sha256_pad(b"same input", 512);
    assert_eq!(a, b);
}
