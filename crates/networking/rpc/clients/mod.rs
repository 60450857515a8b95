pub mod eth;
pub mod explorer;

pub use eth::{EthClient, errors::EthClientError};
pub use explorer::{ExplorerClient, errors::ExplorerError};
