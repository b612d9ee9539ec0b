use core::{
    borrow::Borrow,
    fmt::{self, Debug},
    marker::PhantomData,
};
use std::sync::Arc;

use ethers::{abi::Abi, types::Address};

use crate::error::{parse_abi, InterfaceParseError};

/// A deployed contract: its address, its interface descriptor and the client
/// used to reach it.
pub struct Contract<B, M> {
    address: Address,
    abi: Arc<Abi>,
    client: B,
    _middleware: PhantomData<M>,
}

impl<B, M> Contract<B, M> {
    pub fn new(address: Address, abi: impl Into<Arc<Abi>>, client: B) -> Self {
        Self {
            address,
            abi: abi.into(),
            client,
            _middleware: PhantomData,
        }
    }

    pub fn from_json(
        address: Address,
        json: impl AsRef<str>,
        client: B,
    ) -> Result<Self, InterfaceParseError> {
        Ok(Self::new(address, parse_abi(json)?, client))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }
}

impl<B, M> Contract<B, M>
where
    B: Borrow<M>,
{
    pub fn client(&self) -> &M {
        self.client.borrow()
    }
}

impl<B: Clone, M> Clone for Contract<B, M> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            abi: self.abi.clone(),
            client: self.client.clone(),
            _middleware: PhantomData,
        }
    }
}

impl<B, M> Debug for Contract<B, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("functions", &self.abi.functions.len())
            .finish()
    }
}
