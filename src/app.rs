use std::sync::Arc;

use anyhow::Context;
use ethers::{
    providers::{Http, JsonRpcClient, Provider},
    types::{Address, U256},
    utils::format_units,
};
use multix_contracts::{
    erc20::{erc20, BALANCE_OF, DECIMALS, NAME, SYMBOL},
    multicall::Multicall3,
    Contract,
};
use tracing::{debug, info};

use crate::{config::Config, timeout::TimeoutProvider};

pub type Client<P> = Provider<TimeoutProvider<P>>;

/// Token state read in a single batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenReport {
    pub block_number: U256,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub balance: U256,
    pub eth_balance: U256,
}

impl TokenReport {
    pub fn formatted_balance(&self) -> String {
        format_units(self.balance, u32::from(self.decimals))
            .unwrap_or_else(|_| self.balance.to_string())
    }
}

pub struct App<P: JsonRpcClient + 'static> {
    multicall: Multicall3<Arc<Client<P>>, Client<P>>,
    token: Contract<Arc<Client<P>>, Client<P>>,
    holder: Address,
}

impl App<Http> {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        info!(node = %config.node, timeout = ?config.timeout, "connecting");
        let client = Provider::new(TimeoutProvider::new(
            Http::new(config.node),
            config.timeout,
        ));
        Ok(Self::new(
            Arc::new(client),
            config.multicall,
            config.token,
            config.holder,
        ))
    }
}

impl<P: JsonRpcClient + 'static> App<P> {
    pub fn new(client: Arc<Client<P>>, multicall: Address, token: Address, holder: Address) -> Self {
        Self {
            token: erc20(token, client.clone()),
            multicall: Multicall3::new(multicall, client),
            holder,
        }
    }

    pub async fn token_report(&self) -> anyhow::Result<TokenReport> {
        let mut report = TokenReport::default();

        debug!(token = ?self.token.address(), holder = ?self.holder, "requesting token report");
        report.block_number = self
            .multicall
            .caller()
            .add_contract_call(&self.token, NAME, &mut report.name, ())
            .add_contract_call(&self.token, SYMBOL, &mut report.symbol, ())
            .add_contract_call(&self.token, DECIMALS, &mut report.decimals, ())
            .add_contract_call(&self.token, BALANCE_OF, &mut report.balance, self.holder)
            .add_eth_balance(self.holder, &mut report.eth_balance)
            .aggregate()
            .await
            .with_context(|| format!("multicall to {:?} failed", self.multicall.address()))?;

        Ok(report)
    }
}
