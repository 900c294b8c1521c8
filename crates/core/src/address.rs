//! Address canonicalization
//!
//! Accepts 40 hex digits with or without a `0x` prefix. Single-case input
//! carries no checksum and is accepted as-is; mixed-case input must already
//! be a valid EIP-55 checksum.

use std::str::FromStr;

use alloy::primitives::Address;

use crate::{CoreError, Result};

const ADDRESS_HEX_LEN: usize = 40;

/// Parse a raw address string, enforcing the EIP-55 checksum when present.
pub fn normalize_address(raw: &str) -> Result<Address> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);

    if digits.len() != ADDRESS_HEX_LEN || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidAddress(raw.to_string()));
    }

    let address =
        Address::from_str(digits).map_err(|_| CoreError::InvalidAddress(raw.to_string()))?;

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = address.to_checksum(None);
        if &expected[2..] != digits {
            return Err(CoreError::InvalidChecksum(raw.to_string()));
        }
    }

    Ok(address)
}

/// Checksummed string form of a raw address
pub fn checksummed(raw: &str) -> Result<String> {
    normalize_address(raw).map(|address| address.to_checksum(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    // EIP-55 reference vectors
    const VECTORS: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_lowercase_is_checksummed() {
        for vector in VECTORS {
            let lower = vector.to_lowercase();
            assert_eq!(checksummed(&lower).unwrap(), vector);
        }
    }

    #[test]
    fn test_uppercase_digits_accepted() {
        let upper = format!("0x{}", VECTORS[0][2..].to_uppercase());
        assert_eq!(checksummed(&upper).unwrap(), VECTORS[0]);
    }

    #[test]
    fn test_missing_prefix_accepted() {
        assert_eq!(checksummed(&VECTORS[1][2..]).unwrap(), VECTORS[1]);
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        for vector in VECTORS {
            let once = checksummed(&vector.to_lowercase()).unwrap();
            let twice = checksummed(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // flip the case of one letter
        let tampered = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(
            normalize_address(tampered),
            Err(CoreError::InvalidChecksum(tampered.to_string()))
        );
    }

    #[test]
    fn test_malformed_rejected() {
        for raw in [
            "not-an-address",
            "",
            "0x",
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea",
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed00",
            "0xZaaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            " 0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
        ] {
            assert_eq!(
                normalize_address(raw),
                Err(CoreError::InvalidAddress(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_address() {
        let zero = format!("0x{}", "0".repeat(40));
        assert_eq!(normalize_address(&zero).unwrap(), Address::ZERO);
    }
}
