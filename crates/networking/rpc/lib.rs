pub mod clients;
pub mod rpc_types;
pub mod types;

pub use clients::{EthClient, ExplorerClient};
