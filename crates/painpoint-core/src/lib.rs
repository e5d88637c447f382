pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod io;
pub mod ledger;
pub mod paths;
pub mod record;
pub mod view;
pub mod writer;

pub use error::{PainPointError, Result};
