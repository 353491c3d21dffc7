use alloy_primitives::Address;

fn hex_body(address: &str) -> Option<&str> {
    let body = address.strip_prefix("0x")?;
    (body.len() == 40).then_some(body)
}

/// EIP-55 mixed-case rendering of a 20-byte hex address.
pub fn to_checksum_address(address: &str) -> Option<String> {
    hex_body(address)?;
    address.parse::<Address>().ok().map(|a| a.to_checksum(None))
}

/// Single-case addresses carry no checksum and are accepted as is. Mixed
/// case must match EIP-55.
pub fn is_valid_address(address: &str) -> bool {
    let Some(body) = hex_body(address) else {
        return false;
    };
    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(address, None).is_ok()
    } else {
        address.parse::<Address>().is_ok()
    }
}

pub fn shorten_address(address: &str) -> String {
    shorten(address, 6, 4)
}

pub fn shorten_hash(hash: &str) -> String {
    shorten(hash, 10, 8)
}

fn shorten(value: &str, head: usize, tail: usize) -> String {
    if !value.is_ascii() || value.len() <= head + tail {
        return value.to_string();
    }
    format!("{}...{}", &value[..head], &value[value.len() - tail..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &[&str] = &[
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_vectors() {
        for addr in CHECKSUMMED {
            assert_eq!(to_checksum_address(&addr.to_lowercase()).as_deref(), Some(*addr));
            assert!(is_valid_address(addr));
        }
    }

    #[test]
    fn test_single_case_addresses_are_valid() {
        assert!(is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(is_valid_address("0x52908400098527886E0F7030069857D2E4169EE7"));
    }

    #[test]
    fn test_bad_checksum_is_invalid() {
        assert!(!is_valid_address("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn test_malformed_addresses() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
        assert!(!is_valid_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea"));
        assert!(!is_valid_address("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(
            shorten_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            "0x5aAe...eAed"
        );
        assert_eq!(
            shorten_hash("0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b"),
            "0x88df0164...a713944b"
        );
        assert_eq!(shorten_address("0x12"), "0x12");
    }
}
