use std::fmt;

use ethereum_types::H256;
use serde::{Deserialize, Serialize};

use super::{BlockHash, BlockNumber};

/// A state-sync transaction as found on a trusted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTransaction {
    pub block_number: BlockNumber,
    pub block_hash: BlockHash,
    pub tx_hash: H256,
}

/// Half-open block range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    pub start: BlockNumber,
    pub end: BlockNumber,
}

impl BlockRange {
    pub fn new(start: BlockNumber, end: BlockNumber) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Last block inside the range, for APIs taking inclusive bounds.
    /// `None` when the range is empty.
    pub fn last(&self) -> Option<BlockNumber> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    pub fn contains(&self, number: BlockNumber) -> bool {
        self.start <= number && number < self.end
    }

    /// Splits the range into consecutive chunks of `interval` blocks, the last
    /// one clamped to `end`. An `interval` of zero yields nothing.
    pub fn chunks(&self, interval: u64) -> BlockRangeChunks {
        BlockRangeChunks {
            cursor: self.start,
            end: self.end,
            interval,
        }
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

pub struct BlockRangeChunks {
    cursor: BlockNumber,
    end: BlockNumber,
    interval: u64,
}

impl Iterator for BlockRangeChunks {
    type Item = BlockRange;

    fn next(&mut self) -> Option<Self::Item> {
        if self.interval == 0 || self.cursor >= self.end {
            return None;
        }
        let next = self.cursor.saturating_add(self.interval).min(self.end);
        let chunk = BlockRange::new(self.cursor, next);
        self.cursor = next;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_cover_range_and_clamp_last() {
        let chunks: Vec<_> = BlockRange::new(0, 100).chunks(30).collect();
        assert_eq!(
            chunks,
            vec![
                BlockRange::new(0, 30),
                BlockRange::new(30, 60),
                BlockRange::new(60, 90),
                BlockRange::new(90, 100),
            ]
        );
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let chunks: Vec<_> = BlockRange::new(10, 70).chunks(20).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.last(), Some(&BlockRange::new(50, 70)));
    }

    #[test]
    fn degenerate_ranges_yield_nothing() {
        assert_eq!(BlockRange::new(5, 5).chunks(10).count(), 0);
        assert_eq!(BlockRange::new(9, 5).chunks(10).count(), 0);
        assert_eq!(BlockRange::new(0, 10).chunks(0).count(), 0);
    }

    #[test]
    fn chunks_near_u64_max_do_not_overflow() {
        let chunks: Vec<_> = BlockRange::new(u64::MAX - 3, u64::MAX).chunks(2).collect();
        assert_eq!(
            chunks,
            vec![
                BlockRange::new(u64::MAX - 3, u64::MAX - 1),
                BlockRange::new(u64::MAX - 1, u64::MAX),
            ]
        );
    }

    #[test]
    fn inclusive_last_block() {
        assert_eq!(BlockRange::new(30, 60).last(), Some(59));
        assert_eq!(BlockRange::new(30, 30).last(), None);
        assert!(BlockRange::new(30, 60).contains(30));
        assert!(!BlockRange::new(30, 60).contains(60));
    }
}
