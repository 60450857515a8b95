mod instruction;
mod receipt;
mod transaction;

pub use instruction::*;
pub use receipt::*;
pub use transaction::*;

pub type BlockNumber = u64;
pub type BlockHash = ethereum_types::H256;
