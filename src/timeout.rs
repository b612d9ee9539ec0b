use core::{
    fmt::{self, Debug},
    future::Future,
    marker,
    ops::Deref,
    pin::Pin,
};

use ethers::providers::{JsonRpcClient, JsonRpcError, ProviderError, RpcError};
use futures::{FutureExt, TryFutureExt};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::time::{timeout, Duration};

#[derive(Error, Debug)]
pub enum TimeoutProviderError<P: JsonRpcClient> {
    /// Timeout exceeded
    #[error("timeout exceeded: {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Inner(P::Error),
}

impl<P: JsonRpcClient> RpcError for TimeoutProviderError<P> {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Inner(e) => e.as_error_response(),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            Self::Inner(e) => e.as_serde_error(),
            _ => None,
        }
    }
}

impl<P> From<TimeoutProviderError<P>> for ProviderError
where
    P: JsonRpcClient + 'static,
{
    fn from(value: TimeoutProviderError<P>) -> Self {
        if let TimeoutProviderError::Inner(e) = value {
            return e.into();
        }
        Self::JsonRpcClientError(Box::new(value))
    }
}

pub struct TimeoutProvider<P: JsonRpcClient> {
    inner: P,
    timeout: Duration,
}

impl<P: JsonRpcClient> Deref for TimeoutProvider<P> {
    type Target = P;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<P: JsonRpcClient> Debug for TimeoutProvider<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutProvider")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<P: JsonRpcClient> TimeoutProvider<P> {
    pub fn new(client: P, timeout: Duration) -> Self {
        Self {
            inner: client,
            timeout,
        }
    }
}

impl<P> JsonRpcClient for TimeoutProvider<P>
where
    P: JsonRpcClient + 'static,
{
    type Error = TimeoutProviderError<P>;

    fn request<'life0, 'life1, 'async_trait, T, R>(
        &'life0 self,
        method: &'life1 str,
        params: T,
    ) -> Pin<Box<dyn Future<Output = Result<R, Self::Error>> + marker::Send + 'async_trait>>
    where
        T: Debug + Serialize + Send + Sync,
        R: DeserializeOwned + Send,
        T: 'async_trait,
        R: 'async_trait,
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let after = self.timeout;
        timeout(
            after,
            self.inner
                .request(method, params)
                .map_err(TimeoutProviderError::Inner),
        )
        .map_err(move |_| TimeoutProviderError::Timeout(after))
        .map(|res| res.and_then(|r| r))
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use ethers::{
        providers::{MockError, MockProvider, Provider},
        types::{Address, U256},
    };
    use multix_contracts::{
        erc20::{DECIMALS, ERC20_ABI},
        multicall::Multicall3,
    };

    use super::*;

    /// Transport that answers after an hour.
    #[derive(Debug)]
    struct Slow;

    impl JsonRpcClient for Slow {
        type Error = MockError;

        fn request<'life0, 'life1, 'async_trait, T, R>(
            &'life0 self,
            _method: &'life1 str,
            _params: T,
        ) -> Pin<Box<dyn Future<Output = Result<R, Self::Error>> + marker::Send + 'async_trait>>
        where
            T: Debug + Serialize + Send + Sync,
            R: DeserializeOwned + Send,
            T: 'async_trait,
            R: 'async_trait,
            'life0: 'async_trait,
            'life1: 'async_trait,
            Self: 'async_trait,
        {
            tokio::time::sleep(Duration::from_secs(3600))
                .map(|()| Err(MockError::EmptyResponses))
                .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn request_times_out() {
        let provider = TimeoutProvider::new(Slow, Duration::from_secs(5));

        let res: Result<U256, _> = provider.request("eth_blockNumber", ()).await;
        assert!(matches!(
            res,
            Err(TimeoutProviderError::Timeout(d)) if d == Duration::from_secs(5)
        ));
    }

    #[tokio::test]
    async fn inner_errors_pass_through() {
        let provider = TimeoutProvider::new(MockProvider::new(), Duration::from_secs(5));

        let res: Result<U256, _> = provider.request("eth_blockNumber", ()).await;
        assert!(matches!(
            res,
            Err(TimeoutProviderError::Inner(MockError::EmptyResponses))
        ));
    }

    #[tokio::test]
    async fn answers_within_deadline() {
        let mock = MockProvider::new();
        mock.push::<U256, _>(U256::from(12)).unwrap();
        let provider = TimeoutProvider::new(mock, Duration::from_secs(5));

        let res: U256 = provider.request("eth_blockNumber", ()).await.unwrap();
        assert_eq!(res, U256::from(12));
    }

    #[tokio::test(start_paused = true)]
    async fn batch_deadline_is_a_network_error() {
        type Client = Provider<TimeoutProvider<Slow>>;
        let multicall: Multicall3<Client, Client> = Multicall3::canonical(Provider::new(
            TimeoutProvider::new(Slow, Duration::from_secs(5)),
        ));

        let mut decimals = 9u8;
        let err = multicall
            .caller()
            .add_call(Address::repeat_byte(0xa0), &*ERC20_ABI, DECIMALS, &mut decimals, ())
            .aggregate()
            .await
            .unwrap_err();

        assert!(err.is_network(), "{err:?}");
        assert!(err.to_string().contains("timeout exceeded"), "{err}");
        assert_eq!(decimals, 9);
    }
}
