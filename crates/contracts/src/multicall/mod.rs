//! Batching of read-only calls through the Multicall3 aggregator.
//!
//! ```ignore
//! let multicall = Multicall3::canonical(client);
//!
//! let (mut symbol, mut decimals, mut balance) = (String::new(), 0u8, U256::zero());
//! let block = multicall
//!     .caller()
//!     .add_call(token, &ERC20_ABI, "symbol", &mut symbol, ())
//!     .add_call(token, &ERC20_ABI, "decimals", &mut decimals, ())
//!     .add_call(token, &ERC20_ABI, "balanceOf", &mut balance, holder)
//!     .aggregate()
//!     .await?;
//! ```
mod caller;
mod contract;
mod errors;

pub use self::{
    caller::Caller,
    contract::{Multicall3, MULTICALL3_ADDRESS},
    errors::{AggregateError, CallInfo, InvalidReturnData, LengthMismatch},
};

pub(crate) mod raw {
    use crate::prelude::*;

    tracked_abi!(MULTICALL3_ABI, "abi/Multicall3.json");

    pub(crate) const AGGREGATE: &str = "aggregate";
    pub(crate) const TRY_AGGREGATE: &str = "tryAggregate";
    pub(crate) const GET_ETH_BALANCE: &str = "getEthBalance";
}
