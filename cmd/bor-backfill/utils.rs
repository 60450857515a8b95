use bor_backfill_common::{Address, H256, utils::decode_prefixed_hex};

pub fn parse_hash(input: &str) -> eyre::Result<H256> {
    Ok(bor_backfill_common::utils::parse_hash(input)?)
}

pub fn parse_address(input: &str) -> eyre::Result<Address> {
    let bytes = decode_prefixed_hex(input)?;
    if bytes.len() != Address::len_bytes() {
        eyre::bail!(
            "expected a {}-byte address, got {} bytes",
            Address::len_bytes(),
            bytes.len()
        );
    }
    Ok(Address::from_slice(&bytes))
}

/// Key prefixes are given as plain text unless `0x`-prefixed.
pub fn parse_prefix(input: &str) -> eyre::Result<Vec<u8>> {
    if input.starts_with("0x") {
        Ok(decode_prefixed_hex(input)?)
    } else {
        Ok(input.as_bytes().to_vec())
    }
}
