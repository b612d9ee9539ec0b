use core::{
    borrow::Borrow,
    fmt::{self, Debug},
};

use ethers::{
    abi::{Abi, AbiError, Detokenize, Token, Tokenize},
    providers::Middleware,
    types::{Address, Bytes, U256},
};
use tracing::{debug, instrument, trace};

use crate::Contract;

use super::{
    contract::Multicall3,
    errors::{AggregateError, CallInfo, LengthMismatch},
    raw,
};

type Encoder<'a> = Box<dyn Fn(&[Token]) -> Result<Bytes, AbiError> + Send + 'a>;
type Decoder<'a> = Box<dyn FnOnce(&[u8]) -> Result<(), AbiError> + Send + 'a>;

/// Deferred sub-call: nothing is checked against the interface descriptor
/// until the batch is executed.
struct SubCall<'a> {
    target: Address,
    function: String,
    args: Vec<Token>,
    encode: Encoder<'a>,
    decode: Decoder<'a>,
}

impl SubCall<'_> {
    fn info(&self, index: usize) -> CallInfo {
        CallInfo {
            index,
            target: self.target,
            function: self.function.clone(),
        }
    }
}

/// Accumulates sub-calls for one Multicall3 round trip.
#[must_use = "calls are only performed by `aggregate` or `try_aggregate`"]
pub struct Caller<'a, B, M> {
    multicall: &'a Multicall3<B, M>,
    calls: Vec<SubCall<'a>>,
}

impl<'a, B, M> Caller<'a, B, M> {
    pub(super) fn new(multicall: &'a Multicall3<B, M>) -> Self {
        Self {
            multicall,
            calls: Vec::new(),
        }
    }

    /// Registers `function` of `abi` to be called on `target` with positional
    /// `args`, decoding its return values into `out`.
    ///
    /// `args` follows [`Tokenize`]: `()` for no arguments, a single value, or
    /// a tuple for several. Unknown functions and argument mismatches are
    /// reported by [`aggregate`](Self::aggregate), not here.
    pub fn add_call<T>(
        mut self,
        target: Address,
        abi: &'a Abi,
        function: impl Into<String>,
        out: &'a mut T,
        args: impl Tokenize,
    ) -> Self
    where
        T: Detokenize + Send + 'a,
    {
        let function = function.into();

        let encode: Encoder<'a> = Box::new({
            let function = function.clone();
            move |args: &[Token]| -> Result<Bytes, AbiError> {
                Ok(abi.function(&function)?.encode_input(args)?.into())
            }
        });
        let decode: Decoder<'a> = Box::new({
            let function = function.clone();
            move |data: &[u8]| -> Result<(), AbiError> {
                let tokens = abi.function(&function)?.decode_output(data)?;
                *out = T::from_tokens(tokens)?;
                Ok(())
            }
        });

        self.calls.push(SubCall {
            target,
            function,
            args: args.into_tokens(),
            encode,
            decode,
        });
        self
    }

    /// Same as [`add_call`](Self::add_call) with target and interface taken
    /// from a contract binding.
    pub fn add_contract_call<T, CB, CM>(
        self,
        contract: &'a Contract<CB, CM>,
        function: impl Into<String>,
        out: &'a mut T,
        args: impl Tokenize,
    ) -> Self
    where
        T: Detokenize + Send + 'a,
    {
        self.add_call(contract.address(), contract.abi(), function, out, args)
    }

    /// Registers the aggregator's own `getEthBalance(account)`.
    pub fn add_eth_balance(self, account: Address, out: &'a mut U256) -> Self {
        let multicall = self.multicall;
        self.add_call(
            multicall.address(),
            multicall.abi(),
            raw::GET_ETH_BALANCE,
            out,
            account,
        )
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl<'a, B, M> Caller<'a, B, M>
where
    B: Borrow<M>,
    M: Middleware,
{
    /// Executes all registered calls through `aggregate` in a single
    /// `eth_call` against the latest block and writes every result into its
    /// output slot, in registration order.
    ///
    /// Any failing sub-call fails the whole batch. On a decoding failure the
    /// outputs of preceding calls are already written, following ones are
    /// not. Returns the block number the calls were evaluated at.
    #[instrument(
        level = "debug",
        skip_all,
        fields(multicall = ?self.multicall.address(), calls = self.calls.len())
    )]
    pub async fn aggregate(self) -> Result<U256, AggregateError<M>> {
        let Self { multicall, calls } = self;
        let expected = calls.len();

        let (raw_calls, decoders) = encode_calls::<M>(calls)?;
        let data = multicall
            .encode(raw::AGGREGATE, &[Token::Array(raw_calls)])
            .map_err(AggregateError::AggregateEncoding)?;

        debug!("sending aggregate call");
        let response = multicall.call(data).await?;

        let (block_number, return_data) = multicall
            .decode_aggregate(&response)
            .and_then(|(block_number, return_data)| {
                if return_data.len() != expected {
                    return Err(LengthMismatch {
                        expected,
                        got: return_data.len(),
                    }
                    .into());
                }
                Ok((block_number, return_data))
            })
            .map_err(AggregateError::AggregateDecoding)?;
        debug!(%block_number, "aggregate call returned");

        for ((info, decode), data) in decoders.into_iter().zip(return_data) {
            trace!(index = info.index, function = %info.function, "decoding result");
            decode(&data).map_err(|e| AggregateError::Decoding(info, e))?;
        }
        Ok(block_number)
    }

    /// Executes all registered calls through `tryAggregate`, which tolerates
    /// individual reverts.
    ///
    /// Returns one success flag per call, in registration order. Only
    /// successful calls are decoded into their output slots; slots of reverted
    /// calls are left untouched.
    #[instrument(
        level = "debug",
        skip_all,
        fields(multicall = ?self.multicall.address(), calls = self.calls.len())
    )]
    pub async fn try_aggregate(self) -> Result<Vec<bool>, AggregateError<M>> {
        let Self { multicall, calls } = self;
        let expected = calls.len();

        let (raw_calls, decoders) = encode_calls::<M>(calls)?;
        let data = multicall
            .encode(
                raw::TRY_AGGREGATE,
                &[Token::Bool(false), Token::Array(raw_calls)],
            )
            .map_err(AggregateError::AggregateEncoding)?;

        debug!("sending tryAggregate call");
        let response = multicall.call(data).await?;

        let results = multicall
            .decode_try_aggregate(&response)
            .and_then(|results| {
                if results.len() != expected {
                    return Err(LengthMismatch {
                        expected,
                        got: results.len(),
                    }
                    .into());
                }
                Ok(results)
            })
            .map_err(AggregateError::AggregateDecoding)?;

        let mut succeeded = Vec::with_capacity(expected);
        for ((info, decode), (success, data)) in decoders.into_iter().zip(results) {
            if success {
                trace!(index = info.index, function = %info.function, "decoding result");
                decode(&data).map_err(|e| AggregateError::Decoding(info, e))?;
            } else {
                debug!(index = info.index, function = %info.function, "call reverted");
            }
            succeeded.push(success);
        }
        Ok(succeeded)
    }
}

/// Encodes sub-calls into `(address target, bytes callData)` tuples, stopping
/// at the first one that does not match its interface.
#[allow(clippy::type_complexity)]
fn encode_calls<'a, M: Middleware>(
    calls: Vec<SubCall<'a>>,
) -> Result<(Vec<Token>, Vec<(CallInfo, Decoder<'a>)>), AggregateError<M>> {
    let mut raw_calls = Vec::with_capacity(calls.len());
    let mut decoders = Vec::with_capacity(calls.len());
    for (index, call) in calls.into_iter().enumerate() {
        let info = call.info(index);
        let calldata =
            (call.encode)(&call.args).map_err(|e| AggregateError::Encoding(info.clone(), e))?;
        raw_calls.push(Token::Tuple(vec![
            Token::Address(call.target),
            Token::Bytes(calldata.to_vec()),
        ]));
        decoders.push((info, call.decode));
    }
    Ok((raw_calls, decoders))
}

impl<B, M> Debug for Caller<'_, B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caller")
            .field("multicall", &self.multicall.address())
            .field(
                "calls",
                &self
                    .calls
                    .iter()
                    .map(|c| (c.target, c.function.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
