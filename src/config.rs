use std::time::Duration;

use ethers::types::{Address, H160};
use hex_literal::hex;
use multix_contracts::multicall::MULTICALL3_ADDRESS;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// USDC on Ethereum mainnet
pub const DEFAULT_TOKEN: Address = H160(hex!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
pub const DEFAULT_HOLDER: Address = H160(hex!("d166B8Fca31A21962AAE30EBaaA2B5464e8Ea2B3"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Contents of the optional TOML config file. Every field may be omitted.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    pub multicall: Option<Address>,
    pub token: Option<Address>,
    pub holder: Option<Address>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    pub node: Option<Url>,
    pub timeout_secs: Option<u64>,
}

/// Values given on the command line or through the environment. They take
/// precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub node: Option<Url>,
    pub timeout_secs: Option<u64>,
    pub multicall: Option<Address>,
    pub token: Option<Address>,
    pub holder: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node: Url,
    pub timeout: Duration,
    pub multicall: Address,
    pub token: Address,
    pub holder: Address,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("node URL is not set: pass --rpc-url, set MAINNET_RPC_URL or network.node")]
    MissingNode,
}

impl Config {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        Ok(Self {
            node: overrides
                .node
                .or(file.network.node)
                .ok_or(ConfigError::MissingNode)?,
            timeout: overrides
                .timeout_secs
                .or(file.network.timeout_secs)
                .map_or(DEFAULT_TIMEOUT, Duration::from_secs),
            multicall: overrides
                .multicall
                .or(file.multicall)
                .unwrap_or(MULTICALL3_ADDRESS),
            token: overrides.token.or(file.token).unwrap_or(DEFAULT_TOKEN),
            holder: overrides.holder.or(file.holder).unwrap_or(DEFAULT_HOLDER),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_file() {
        let file: FileConfig = toml::from_str(
            r#"
            token = "0x6B175474E89094C44Da98b954EedeAC495271d0F"

            [network]
            node = "http://file.example:8545/"
            timeout_secs = 3
            "#,
        )
        .unwrap();
        let overrides = Overrides {
            node: Some("http://cli.example:8545".parse().unwrap()),
            ..Default::default()
        };

        let config = Config::resolve(file, overrides).unwrap();
        assert_eq!(config.node.as_str(), "http://cli.example:8545/");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(
            config.token,
            "0x6B175474E89094C44Da98b954EedeAC495271d0F"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(config.holder, DEFAULT_HOLDER);
        assert_eq!(config.multicall, MULTICALL3_ADDRESS);
    }

    #[test]
    fn defaults_apply() {
        let config = Config::resolve(
            FileConfig::default(),
            Overrides {
                node: Some("http://localhost:8545".parse().unwrap()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.token, DEFAULT_TOKEN);
    }

    #[test]
    fn node_is_required() {
        assert!(matches!(
            Config::resolve(FileConfig::default(), Overrides::default()),
            Err(ConfigError::MissingNode)
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("nodes = 1").is_err());
    }
}
