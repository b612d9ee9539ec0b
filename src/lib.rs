pub mod app;
pub mod config;
pub mod timeout;

pub use self::{
    app::{App, TokenReport},
    config::{Config, FileConfig, Overrides},
};
