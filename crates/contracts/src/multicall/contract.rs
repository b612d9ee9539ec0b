use core::{
    borrow::Borrow,
    fmt::{self, Debug},
};

#[cfg(not(feature = "legacy"))]
use ethers::types::Eip1559TransactionRequest;
#[cfg(feature = "legacy")]
use ethers::types::TransactionRequest;
use ethers::{
    abi::{AbiError, Token},
    providers::Middleware,
    types::{transaction::eip2718::TypedTransaction, Address, Bytes, H160, U256},
};
use hex_literal::hex;
use impl_tools::autoimpl;

use crate::Contract;

use super::{
    caller::Caller,
    errors::{AggregateError, InvalidReturnData},
    raw,
};

/// Multicall3 is deployed at the same address on every supported chain.
/// See <https://github.com/mds1/multicall#multicall3-contract-addresses>
pub const MULTICALL3_ADDRESS: Address = H160(hex!("cA11bde05977b3631167028862bE2a173976CA11"));

#[autoimpl(Deref using self.contract)]
pub struct Multicall3<B, M> {
    contract: Contract<B, M>,
}

impl<B, M> Multicall3<B, M> {
    pub fn new(address: Address, client: B) -> Self {
        Self {
            contract: Contract::new(address, raw::MULTICALL3_ABI.clone(), client),
        }
    }

    /// Aggregator at [`MULTICALL3_ADDRESS`].
    pub fn canonical(client: B) -> Self {
        Self::new(MULTICALL3_ADDRESS, client)
    }

    /// Starts a new batch. Each [`Caller`] is executed at most once.
    pub fn caller(&self) -> Caller<'_, B, M> {
        Caller::new(self)
    }

    pub(crate) fn encode(&self, function: &str, tokens: &[Token]) -> Result<Bytes, AbiError> {
        Ok(self.abi().function(function)?.encode_input(tokens)?.into())
    }

    /// Decodes `aggregate` output: `(uint256 blockNumber, bytes[] returnData)`.
    pub(crate) fn decode_aggregate(&self, response: &[u8]) -> Result<(U256, Vec<Bytes>), AbiError> {
        let mut tokens = self
            .abi()
            .function(raw::AGGREGATE)?
            .decode_output(response)?
            .into_iter();

        let block_number = tokens
            .next()
            .and_then(Token::into_uint)
            .ok_or(InvalidReturnData)?;
        let return_data = tokens
            .next()
            .and_then(Token::into_array)
            .ok_or(InvalidReturnData)?
            .into_iter()
            .map(|t| t.into_bytes().map(Bytes::from).ok_or(InvalidReturnData))
            .collect::<Result<_, _>>()?;

        Ok((block_number, return_data))
    }

    /// Decodes `tryAggregate` output: `(bool success, bytes returnData)[]`.
    pub(crate) fn decode_try_aggregate(
        &self,
        response: &[u8],
    ) -> Result<Vec<(bool, Bytes)>, AbiError> {
        self.abi()
            .function(raw::TRY_AGGREGATE)?
            .decode_output(response)?
            .into_iter()
            .next()
            .and_then(Token::into_array)
            .ok_or(InvalidReturnData)?
            .into_iter()
            .map(|result| match result {
                Token::Tuple(fields) => match <[Token; 2]>::try_from(fields) {
                    Ok([Token::Bool(success), Token::Bytes(data)]) => Ok((success, data.into())),
                    _ => Err(InvalidReturnData.into()),
                },
                _ => Err(InvalidReturnData.into()),
            })
            .collect()
    }

    pub(crate) fn transaction(&self, data: Bytes) -> TypedTransaction {
        #[cfg(not(feature = "legacy"))]
        let tx = Eip1559TransactionRequest::new().to(self.address()).data(data);
        #[cfg(feature = "legacy")]
        let tx = TransactionRequest::new().to(self.address()).data(data);
        tx.into()
    }
}

impl<B, M> Multicall3<B, M>
where
    B: Borrow<M>,
    M: Middleware,
{
    /// Performs the single `eth_call` of a batch against the latest block.
    pub(crate) async fn call(&self, data: Bytes) -> Result<Bytes, AggregateError<M>> {
        self.client()
            .call(&self.transaction(data), None)
            .await
            .map_err(AggregateError::Network)
    }
}

impl<B, M> Debug for Multicall3<B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Multicall3").field(&self.address()).finish()
    }
}
