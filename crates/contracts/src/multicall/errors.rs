use core::fmt::{self, Display};

use ethers::{
    abi::{self, AbiError},
    providers::Middleware,
    types::Address,
};
use thiserror::Error as ThisError;

/// Position and identity of a sub-call within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub index: usize,
    pub target: Address,
    pub function: String,
}

impl Display for CallInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "call #{} ({} on {:?})",
            self.index, self.function, self.target
        )
    }
}

#[derive(ThisError, Debug)]
pub enum AggregateError<M: Middleware> {
    /// A sub-call could not be encoded against its interface descriptor:
    /// unknown function, wrong argument count or argument types.
    #[error("failed to encode {0}: {1}")]
    Encoding(CallInfo, #[source] AbiError),

    /// The aggregator's own call could not be encoded
    #[error("failed to encode aggregate call: {0}")]
    AggregateEncoding(#[source] AbiError),

    /// Thrown when the client fails to perform the call: transport errors,
    /// timeouts and reverts reported by the node
    #[error(transparent)]
    Network(M::Error),

    /// The aggregator's response does not have the declared return shape
    #[error("failed to decode aggregate response: {0}")]
    AggregateDecoding(#[source] AbiError),

    /// A sub-call's return data does not match its output type
    #[error("failed to decode {0}: {1}")]
    Decoding(CallInfo, #[source] AbiError),
}

impl<M: Middleware> AggregateError<M> {
    /// The sub-call this error is attributed to, if any.
    pub fn call_info(&self) -> Option<&CallInfo> {
        match self {
            Self::Encoding(info, _) | Self::Decoding(info, _) => Some(info),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[derive(ThisError, Debug)]
#[error("aggregator returned {got} results for {expected} calls")]
pub struct LengthMismatch {
    pub expected: usize,
    pub got: usize,
}

impl From<LengthMismatch> for AbiError {
    fn from(e: LengthMismatch) -> Self {
        Self::DecodingError(abi::Error::Other(e.to_string().into()))
    }
}

#[derive(ThisError, Debug)]
#[error("invalid return data")]
pub struct InvalidReturnData;

impl From<InvalidReturnData> for AbiError {
    fn from(e: InvalidReturnData) -> Self {
        Self::DecodingError(abi::Error::Other(e.to_string().into()))
    }
}
