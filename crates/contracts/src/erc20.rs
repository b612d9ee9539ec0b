//! Read-only subset of the ERC-20 interface.

use ethers::types::Address;

use crate::{prelude::*, Contract};

tracked_abi!(
    /// `name`, `symbol`, `decimals`, `totalSupply`, `balanceOf` and `allowance`.
    ERC20_ABI,
    "abi/ERC20.json"
);

pub const NAME: &str = "name";
pub const SYMBOL: &str = "symbol";
pub const DECIMALS: &str = "decimals";
pub const TOTAL_SUPPLY: &str = "totalSupply";
pub const BALANCE_OF: &str = "balanceOf";
pub const ALLOWANCE: &str = "allowance";

/// Binds a token at `address` to the built-in ERC-20 interface.
pub fn erc20<B, M>(address: Address, client: B) -> Contract<B, M> {
    Contract::new(address, ERC20_ABI.clone(), client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_abi_has_read_functions() {
        for name in [NAME, SYMBOL, DECIMALS, TOTAL_SUPPLY, BALANCE_OF, ALLOWANCE] {
            assert!(ERC20_ABI.function(name).is_ok(), "missing {name}");
        }
        assert_eq!(ERC20_ABI.function(BALANCE_OF).unwrap().inputs.len(), 1);
        assert_eq!(ERC20_ABI.function(ALLOWANCE).unwrap().inputs.len(), 2);
    }
}
