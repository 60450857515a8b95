//! Discovery of state-sync transactions missing from a node and conversion
//! into write instructions for its chain database.

pub mod error;
pub mod presence;
pub mod receipt_fetcher;
pub mod scanner;
pub mod sources;

pub use error::{ReceiptFetchError, ScanError, SourceError};
pub use presence::TransactionLookup;
pub use receipt_fetcher::{ReceiptFetcher, ReceiptSource};
pub use scanner::{ChainScanner, FailurePolicy, ScanConfig, ScanResult};
pub use sources::{ExplorerSource, LogFilterSource, StateSyncSource};
