pub(crate) mod prelude {
    /// Declares a lazily parsed, process-wide `Abi` from a JSON file
    /// relative to the crate root. The file is tracked by cargo through
    /// `include_str!`.
    #[allow(unused_macros)]
    macro_rules! tracked_abi {
        ($(#[$attr:meta])* $name:ident, $path:literal) => {
            ::lazy_static::lazy_static! {
                $(#[$attr])*
                pub static ref $name: ::ethers::abi::Abi = ::serde_json::from_str(
                    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/", $path)),
                )
                .expect(concat!("built-in ABI is invalid: ", $path));
            }
        };
    }
    pub(crate) use tracked_abi;
}

mod contract;
mod error;

pub use self::{
    contract::Contract,
    error::{parse_abi, InterfaceParseError},
};

#[cfg(feature = "multicall")]
pub mod multicall;

#[cfg(feature = "erc20")]
pub mod erc20;
