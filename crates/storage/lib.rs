mod backend;
pub mod error;
pub mod instructions;
pub mod keys;
pub mod store;

pub use error::StoreError;
pub use instructions::InstructionStore;
pub use keys::{KeyCodec, KeyPrefixes};
pub use store::{ApplySummary, DeleteOutcome, KvApplier};
