// ID generation - store-assigned document ids and client-side block ids

use rand::{distr::Alphanumeric, Rng};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::infrastructure::current_time_millis;

/// Length of store-assigned document ids.
pub const DOCUMENT_ID_LEN: usize = 20;

/// Random alphanumeric document id, the shape auto-ids have in the `pages` collection.
pub fn generate_document_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Block id generator
/// Ids are millisecond timestamps rendered as decimal strings. Two blocks
/// created within the same millisecond get consecutive values, so ids stay
/// unique and increasing within a process.
#[derive(Debug, Default)]
pub struct BlockIdGenerator {
    last: AtomicU64,
}

impl BlockIdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> String {
        let now = current_time_millis() as u64;
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = if now > last { now } else { last + 1 };
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate.to_string(),
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_block_ids_are_unique_and_increasing() {
        let generator = BlockIdGenerator::new();

        let ids: Vec<u64> = (0..1000)
            .map(|_| generator.next_id().parse().unwrap())
            .collect();

        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_block_id_tracks_clock() {
        let generator = BlockIdGenerator::new();
        let before = current_time_millis() as u64;
        let id: u64 = generator.next_id().parse().unwrap();
        assert!(id >= before);
    }

    #[test]
    fn test_document_ids() {
        let ids: HashSet<String> = (0..100).map(|_| generate_document_id()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids
            .iter()
            .all(|id| id.len() == DOCUMENT_ID_LEN && id.chars().all(|c| c.is_ascii_alphanumeric())));
    }
}
