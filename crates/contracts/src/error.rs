use ethers::abi::Abi;
use thiserror::Error as ThisError;

/// Interface description text is not a valid JSON ABI.
#[derive(ThisError, Debug)]
#[error("invalid interface description: {0}")]
pub struct InterfaceParseError(#[from] serde_json::Error);

/// Parses a JSON ABI (as emitted by solc or etherscan) into an interface
/// descriptor usable with [`Caller::add_call`](crate::multicall::Caller::add_call).
pub fn parse_abi(json: impl AsRef<str>) -> Result<Abi, InterfaceParseError> {
    serde_json::from_str(json.as_ref()).map_err(Into::into)
}
