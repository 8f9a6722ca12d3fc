//! Chain id and account validation applied to every state update.

use std::str::FromStr;

use alloy::primitives::Address;
use serde_json::Value;

use crate::ports::Web3Error;

/// Upper bound accepted for `chain_id`: `floor((2**53 - 39) / 2)`, the same
/// limit MetaMask enforces.
pub const MAX_SAFE_CHAIN_ID: u64 = 4_503_599_627_370_476;

pub fn validate_chain_id(chain_id: u64) -> Result<(), Web3Error> {
    if chain_id == 0 || chain_id > MAX_SAFE_CHAIN_ID {
        return Err(Web3Error::InvalidChainId(chain_id.to_string()));
    }
    Ok(())
}

/// Parses an account and checks its EIP-55 checksum. All-lowercase and
/// all-uppercase input carries no checksum and is accepted as is.
pub fn validate_account(account: &str) -> Result<Address, Web3Error> {
    let digits = account.strip_prefix("0x").unwrap_or(account);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid_address(account, "expected 20 bytes of hex"));
    }
    let address = Address::from_str(digits)
        .map_err(|_| invalid_address(account, "expected 20 bytes of hex"))?;

    let mixed_case = digits.bytes().any(|b| b.is_ascii_uppercase())
        && digits.bytes().any(|b| b.is_ascii_lowercase());
    if mixed_case && address.to_checksum(None)[2..] != *digits {
        return Err(invalid_address(account, "bad address checksum"));
    }
    Ok(address)
}

fn invalid_address(account: &str, reason: &'static str) -> Web3Error {
    Web3Error::InvalidAddress {
        address: account.to_owned(),
        reason,
    }
}

/// Decodes a chain id as reported by a wallet: a hex quantity, a decimal
/// string or a JSON number. Fractional and negative numbers are rejected.
pub fn parse_chain_id(value: &Value) -> Result<u64, Web3Error> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    if let Some(f) = value.as_f64() {
        if f.fract() != 0.0 || f < 0.0 || f > MAX_SAFE_CHAIN_ID as f64 {
            return Err(Web3Error::InvalidChainId(value.to_string()));
        }
        return Ok(f as u64);
    }
    let raw = value
        .as_str()
        .ok_or_else(|| Web3Error::InvalidChainId(value.to_string()))?;
    parse_chain_id_str(raw)
}

pub fn parse_chain_id_str(raw: &str) -> Result<u64, Web3Error> {
    let parsed = if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        raw.parse()
    };
    parsed.map_err(|_| Web3Error::InvalidChainId(raw.to_owned()))
}

pub fn to_hex_chain_id(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chain_id_bounds() {
        assert!(validate_chain_id(1).is_ok());
        assert!(validate_chain_id(MAX_SAFE_CHAIN_ID).is_ok());
        assert!(validate_chain_id(0).is_err());
        assert!(validate_chain_id(MAX_SAFE_CHAIN_ID + 1).is_err());
    }

    #[test]
    fn parses_wallet_chain_ids() {
        assert_eq!(parse_chain_id(&json!("0x1")).unwrap(), 1);
        assert_eq!(parse_chain_id(&json!("0x2105")).unwrap(), 8453);
        assert_eq!(parse_chain_id(&json!("137")).unwrap(), 137);
        assert_eq!(parse_chain_id(&json!(10)).unwrap(), 10);
        assert_eq!(parse_chain_id(&json!(10.0)).unwrap(), 10);
        assert!(parse_chain_id(&json!(1.5)).is_err());
        assert!(parse_chain_id(&json!(-1)).is_err());
        assert!(parse_chain_id(&json!("0xzz")).is_err());
        assert!(parse_chain_id(&json!(null)).is_err());
    }

    #[test]
    fn checksums_lowercase_accounts() {
        let addr = validate_account("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(addr.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        let no_prefix = validate_account("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(no_prefix, addr);
        let upper = validate_account("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        assert_eq!(upper, addr);
    }

    #[test]
    fn rejects_bad_checksum_and_garbage() {
        let err = validate_account("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD").unwrap_err();
        assert!(err.to_string().contains("bad address checksum"));
        assert!(validate_account("0x1234").is_err());
        assert!(validate_account("0xgggggggggggggggggggggggggggggggggggggggg").is_err());
        assert!(validate_account("").is_err());
    }

    #[test]
    fn hex_chain_id_roundtrips_through_parser() {
        assert_eq!(to_hex_chain_id(8453), "0x2105");
        assert_eq!(parse_chain_id_str(&to_hex_chain_id(42161)).unwrap(), 42161);
    }
}
