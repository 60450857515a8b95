use ethereum_types::{Address, H160, H256};

/// Prefix of the node's transaction lookup entries: prefix || tx hash -> block number.
pub const BOR_TX_LOOKUP_PREFIX: &[u8] = b"matic-bor-tx-lookup-";

/// Prefix of the node's state-sync receipts: prefix || number (8 BE) || block hash -> receipt.
pub const BOR_RECEIPT_PREFIX: &[u8] = b"matic-bor-receipt-";

/// Location of the key-value store inside a node data directory.
pub const CHAINDATA_SUBPATH: [&str; 2] = ["bor", "chaindata"];

/// State-sync transactions are sent from and to this address.
pub const ZERO_ADDRESS: Address = H160([0u8; 20]);

/// StateReceiver system contract, emitter of one `StateCommitted` log per synced state.
pub const STATE_RECEIVER_ADDRESS: Address = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x10, 0x01,
]);

/// keccak256("StateCommitted(uint256,bool)")
pub const STATE_COMMITTED_TOPIC: H256 = H256([
    0x5a, 0x22, 0x72, 0x55, 0x90, 0xb0, 0xa5, 0x1c, 0x92, 0x39, 0x40, 0x22, 0x3f, 0x74, 0x58,
    0x51, 0x21, 0x64, 0xb1, 0x11, 0x33, 0x59, 0xa7, 0x35, 0xe8, 0x6e, 0x7f, 0x27, 0xf4, 0x47,
    0x91, 0xee,
]);

/// Byte value stored as `PostStateOrStatus` for a successful receipt.
pub const RECEIPT_STATUS_SUCCESSFUL: u8 = 0x01;
