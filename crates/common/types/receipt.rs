use alloy_rlp::{BufMut, Decodable, Encodable, Header};
use bytes::Bytes;
use ethereum_types::{Address, H256};
use serde::{Deserialize, Serialize};

use crate::constants::RECEIPT_STATUS_SUCCESSFUL;
use crate::errors::CodecError;

/// Outcome recorded in a stored receipt's `PostStateOrStatus` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Failed,
    Successful,
}

impl ReceiptStatus {
    fn as_bytes(&self) -> &'static [u8] {
        match self {
            ReceiptStatus::Failed => &[],
            ReceiptStatus::Successful => &[RECEIPT_STATUS_SUCCESSFUL],
        }
    }
}

/// Log as kept in the node's receipt storage: `[address, topics, data]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLog {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
}

impl StoredLog {
    fn topics_as_arrays(&self) -> Vec<[u8; 32]> {
        self.topics.iter().map(|topic| topic.0).collect()
    }

    fn payload_length(&self) -> usize {
        self.address.0.length() + self.topics_as_arrays().length() + self.data.length()
    }
}

impl Encodable for StoredLog {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        self.address.0.encode(out);
        self.topics_as_arrays().encode(out);
        self.data.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

impl Decodable for StoredLog {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let mut payload = list_payload(buf)?;
        let address = <[u8; 20]>::decode(&mut payload)?;
        let topics = Vec::<[u8; 32]>::decode(&mut payload)?;
        let data = Bytes::decode(&mut payload)?;
        if !payload.is_empty() {
            return Err(alloy_rlp::Error::Custom("trailing bytes in stored log"));
        }
        Ok(StoredLog {
            address: Address::from(address),
            topics: topics.into_iter().map(H256::from).collect(),
            data,
        })
    }
}

/// Receipt in the node's storage format: `[status, cumulative_gas_used, logs]`.
///
/// State-sync receipts are written with `Successful` status and zero gas no
/// matter what the source reported: the node defines state-sync transactions
/// as free and always successful, and only the logs are recovered remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReceipt {
    pub status: ReceiptStatus,
    pub cumulative_gas_used: u64,
    pub logs: Vec<StoredLog>,
}

impl StoredReceipt {
    pub fn successful(logs: Vec<StoredLog>) -> Self {
        Self {
            status: ReceiptStatus::Successful,
            cumulative_gas_used: 0,
            logs,
        }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    pub fn decode_from_slice(mut rlp: &[u8]) -> Result<Self, CodecError> {
        let receipt = Self::decode_with_status(&mut rlp)?;
        if !rlp.is_empty() {
            return Err(alloy_rlp::Error::Custom("trailing bytes after stored receipt").into());
        }
        Ok(receipt)
    }

    fn payload_length(&self) -> usize {
        self.status.as_bytes().length() + self.cumulative_gas_used.length() + self.logs.length()
    }

    fn decode_with_status(buf: &mut &[u8]) -> Result<Self, CodecError> {
        let mut payload = list_payload(buf)?;
        let status = Bytes::decode(&mut payload)?;
        let status = match status.as_ref() {
            [] => ReceiptStatus::Failed,
            [RECEIPT_STATUS_SUCCESSFUL] => ReceiptStatus::Successful,
            other => return Err(CodecError::UnsupportedStatus(hex::encode(other))),
        };
        let cumulative_gas_used = u64::decode(&mut payload)?;
        let logs = Vec::<StoredLog>::decode(&mut payload)?;
        if !payload.is_empty() {
            return Err(alloy_rlp::Error::Custom("trailing bytes in stored receipt").into());
        }
        Ok(StoredReceipt {
            status,
            cumulative_gas_used,
            logs,
        })
    }
}

impl Encodable for StoredReceipt {
    fn encode(&self, out: &mut dyn BufMut) {
        Header {
            list: true,
            payload_length: self.payload_length(),
        }
        .encode(out);
        self.status.as_bytes().encode(out);
        self.cumulative_gas_used.encode(out);
        self.logs.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

/// Consumes a list header from `buf` and returns the list payload, advancing
/// `buf` past the whole list.
fn list_payload<'a>(buf: &mut &'a [u8]) -> alloy_rlp::Result<&'a [u8]> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort);
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(payload)
}
