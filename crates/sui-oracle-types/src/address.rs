//! Address text form.
//!
//! Log entries always carry the full form produced by [`address_to_string`],
//! so consumers can compare addresses and object IDs as plain strings.

use move_core_types::account_address::AccountAddress;

/// Address of the harness package that owns the `log` and `oracle` event types.
pub const HARNESS_ADDRESS: AccountAddress = AccountAddress::new([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xde, 0xad,
    0xbe, 0xef,
]);

/// Canonical text form of an address: `0x` followed by 64 lowercase hex digits.
///
/// ```
/// use sui_oracle_types::address::address_to_string;
/// use sui_oracle_types::AccountAddress;
///
/// assert_eq!(
///     address_to_string(&AccountAddress::TWO),
///     "0x0000000000000000000000000000000000000000000000000000000000000002"
/// );
/// ```
pub fn address_to_string(addr: &AccountAddress) -> String {
    format!("0x{}", hex::encode(addr.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_address_text() {
        assert_eq!(
            address_to_string(&HARNESS_ADDRESS),
            "0x00000000000000000000000000000000000000000000000000000000deadbeef"
        );
    }
}
