//! Internet checksum (RFC 1071)

/// Computes the 16-bit one's complement checksum of `data`.
///
/// Words are summed in host byte order and the folded result is converted to
/// network order at the end, so the returned value is meant to be written
/// with `to_be_bytes` (or pnet's `set_checksum`). A trailing odd byte is
/// summed as a zero-padded word.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u64 = 0;

    let mut words = data.chunks_exact(2);
    for word in &mut words {
        sum += u16::from_ne_bytes([word[0], word[1]]) as u64;
    }
    if let [last] = words.remainder() {
        sum += u16::from_ne_bytes([*last, 0]) as u64;
    }

    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    (!(sum as u16)).to_be()
}

/// True when `data` already carries a valid checksum field.
pub fn verify(data: &[u8]) -> bool {
    checksum(data) == 0
}
