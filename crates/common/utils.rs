use ethereum_types::H256;

use crate::errors::CodecError;

/// Decodes a `0x`-prefixed hex string. Exactly one `0x` is stripped; anything
/// else (no prefix, odd length, non-hex digits) is rejected.
pub fn decode_prefixed_hex(input: &str) -> Result<Vec<u8>, CodecError> {
    let Some(stripped) = input.strip_prefix("0x") else {
        return Err(CodecError::MissingHexPrefix(input.to_string()));
    };
    hex::decode(stripped).map_err(|source| CodecError::InvalidHex {
        input: input.to_string(),
        source,
    })
}

/// Lowercase hex with a `0x` prefix.
pub fn encode_prefixed_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a 32-byte hash given as `0x` followed by 64 hex digits.
pub fn parse_hash(input: &str) -> Result<H256, CodecError> {
    let bytes = decode_prefixed_hex(input)?;
    if bytes.len() != H256::len_bytes() {
        return Err(CodecError::InvalidLength {
            expected: H256::len_bytes(),
            actual: bytes.len(),
        });
    }
    Ok(H256::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_requires_prefix() {
        assert!(matches!(
            decode_prefixed_hex("abcd"),
            Err(CodecError::MissingHexPrefix(_))
        ));
        assert_eq!(decode_prefixed_hex("0xabcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(decode_prefixed_hex("0x").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_rejects_odd_length() {
        assert!(matches!(
            decode_prefixed_hex("0xabc"),
            Err(CodecError::InvalidHex { .. })
        ));
    }

    #[test]
    fn decode_strips_a_single_prefix() {
        assert!(decode_prefixed_hex("0x0xab").is_err());
    }

    #[test]
    fn parse_hash_checks_length() {
        let short = format!("0x{}", "ab".repeat(31));
        assert!(matches!(
            parse_hash(&short),
            Err(CodecError::InvalidLength {
                expected: 32,
                actual: 31
            })
        ));

        let upper = format!("0x{}", "AB".repeat(32));
        assert_eq!(parse_hash(&upper).unwrap(), H256::repeat_byte(0xab));
    }

    #[test]
    fn encode_is_lowercase_and_prefixed() {
        assert_eq!(encode_prefixed_hex([0xABu8, 0x01]), "0xab01");
        assert_eq!(encode_prefixed_hex(Vec::<u8>::new()), "0x");
    }
}
