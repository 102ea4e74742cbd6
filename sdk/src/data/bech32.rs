//! Checksummed bech32 codec (BIP-173 charset and polymod), used for the
//! human-readable account address form.

use thiserror::Error;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GENERATOR: [u32; 5] = [
    0x3b6a_57b2,
    0x2650_8e6d,
    0x1ea1_19fa,
    0x3d42_33dd,
    0x2a14_62b3,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Bech32Error {
    #[error("missing separator")]
    MissingSeparator,

    #[error("invalid length")]
    InvalidLength,

    #[error("mixed-case string")]
    MixedCase,

    #[error("invalid character {0:?}")]
    InvalidChar(char),

    #[error("data value {0} out of range")]
    InvalidData(u8),

    #[error("invalid padding")]
    InvalidPadding,

    #[error("checksum mismatch")]
    ChecksumMismatch,
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(value);
        for (i, generator) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= generator;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(hrp.len() * 2 + 1);
    for b in hrp.bytes() {
        out.push(b >> 5);
    }
    out.push(0);
    for b in hrp.bytes() {
        out.push(b & 0x1f);
    }
    out
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; 6]);
    let residue = polymod(&values) ^ 1;
    let mut checksum = [0u8; 6];
    for (i, c) in checksum.iter_mut().enumerate() {
        *c = ((residue >> (5 * (5 - i))) & 0x1f) as u8;
    }
    checksum
}

fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == 1
}

// Regroup the bit stream; `pad` is true when widening 8 -> 5 on encode and
// false when narrowing back, where leftover non-zero bits are an error.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>, Bech32Error> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let mut out = Vec::with_capacity((data.len() * from as usize).div_ceil(to as usize));
    for &value in data {
        if u32::from(value) >> from != 0 {
            return Err(Bech32Error::InvalidData(value));
        }
        acc = (acc << from) | u32::from(value);
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max) != 0 {
        return Err(Bech32Error::InvalidPadding);
    }
    Ok(out)
}

/// Encode raw bytes under the given human-readable part.
pub fn encode(hrp: &str, payload: &[u8]) -> Result<String, Bech32Error> {
    let data = convert_bits(payload, 8, 5, true)?;
    let checksum = create_checksum(hrp, &data);
    let mut encoded = String::with_capacity(hrp.len() + 1 + data.len() + 6);
    encoded.push_str(hrp);
    encoded.push('1');
    for value in data.iter().chain(checksum.iter()) {
        encoded.push(CHARSET[*value as usize] as char);
    }
    Ok(encoded)
}

/// Decode a bech32 string into its human-readable part and raw bytes.
pub fn decode(encoded: &str) -> Result<(String, Vec<u8>), Bech32Error> {
    let has_lower = encoded.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = encoded.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Bech32Error::MixedCase);
    }
    let encoded = encoded.to_ascii_lowercase();

    let separator = encoded.rfind('1').ok_or(Bech32Error::MissingSeparator)?;
    if separator == 0 || separator + 7 > encoded.len() {
        return Err(Bech32Error::InvalidLength);
    }
    let hrp = &encoded[..separator];
    if !hrp.bytes().all(|b| (33..=126).contains(&b)) {
        return Err(Bech32Error::InvalidLength);
    }

    let mut data = Vec::with_capacity(encoded.len() - separator - 1);
    for c in encoded[separator + 1..].bytes() {
        let value = CHARSET
            .iter()
            .position(|&x| x == c)
            .ok_or(Bech32Error::InvalidChar(c as char))?;
        data.push(value as u8);
    }

    if !verify_checksum(hrp, &data) {
        return Err(Bech32Error::ChecksumMismatch);
    }
    let payload = convert_bits(&data[..data.len() - 6], 5, 8, false)?;
    Ok((hrp.to_string(), payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let payloads: [&[u8]; 4] = [&[], &[0u8; 32], &[0xff; 32], &[1, 2, 3, 4, 5]];
        for payload in payloads {
            let encoded = encode("erd", payload).unwrap();
            let (hrp, decoded) = decode(&encoded).unwrap();
            assert_eq!(hrp, "erd");
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn test_reference_strings_decode() {
        // Valid strings from the bech32 reference test set
        assert!(decode("a12uel5l").is_ok());
        assert!(decode("abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw").is_ok());
    }

    #[test]
    fn test_corrupted_checksum_rejected() {
        let encoded = encode("erd", &[7u8; 32]).unwrap();
        let mut corrupted = encoded.clone();
        // swap the last character for a different charset character
        let last = corrupted.pop().unwrap();
        corrupted.push(if last == 'q' { 'p' } else { 'q' });
        assert_eq!(decode(&corrupted), Err(Bech32Error::ChecksumMismatch));
    }

    #[test]
    fn test_mixed_case_rejected() {
        let encoded = encode("erd", &[7u8; 32]).unwrap();
        let mixed = format!("Erd{}", &encoded[3..]);
        assert_eq!(decode(&mixed), Err(Bech32Error::MixedCase));
    }

    #[test]
    fn test_missing_separator() {
        assert_eq!(decode("qqqqqq"), Err(Bech32Error::MissingSeparator));
    }
}
