//! Minting of enrollment identifiers.
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::model::{Enrollment, EnrollmentId};

const PREFIX: &str = "E";

/// Issues `E<unix-millis>` identifiers.
///
/// Identifiers are strictly increasing within the process, even when several are minted in
/// the same millisecond, and never collide with an identifier already present in the
/// enrollment collection the caller observed.
#[derive(Debug, Default)]
pub struct EnrollmentIdMinter {
    last: AtomicI64,
}

impl EnrollmentIdMinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, taken: &[Enrollment]) -> EnrollmentId {
        self.mint_at(Utc::now().timestamp_millis(), taken)
    }

    pub(crate) fn mint_at(&self, now_millis: i64, taken: &[Enrollment]) -> EnrollmentId {
        let is_taken = |candidate: i64| {
            let candidate = format_id(candidate);
            taken
                .iter()
                .any(|enrollment| enrollment.enrollment_id == candidate)
        };

        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let mut next = now_millis.max(last + 1);
            while is_taken(next) {
                next += 1;
            }
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return format_id(next),
                Err(current) => last = current,
            }
        }
    }
}

fn format_id(value: i64) -> EnrollmentId {
    format!("{PREFIX}{value}")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::enrollment;

    #[test]
    fn it_mints_a_timestamp_derived_id() {
        let minter = EnrollmentIdMinter::new();

        assert_eq!(minter.mint_at(1_700_000_000_000, &[]), "E1700000000000");
    }

    #[test]
    fn it_mints_increasing_ids_within_the_same_millisecond() {
        let minter = EnrollmentIdMinter::new();

        let first = minter.mint_at(1_000, &[]);
        let second = minter.mint_at(1_000, &[]);
        let third = minter.mint_at(999, &[]);

        assert_eq!(first, "E1000");
        assert_eq!(second, "E1001");
        assert_eq!(third, "E1002");
    }

    #[test]
    fn it_skips_ids_already_in_the_collection() {
        let minter = EnrollmentIdMinter::new();
        let taken = vec![
            enrollment("E5000", "S1", "O1"),
            enrollment("E5001", "S2", "O1"),
        ];

        assert_eq!(minter.mint_at(5_000, &taken), "E5002");
    }

    #[test]
    fn it_mints_unique_ids_across_threads() {
        let minter = std::sync::Arc::new(EnrollmentIdMinter::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let minter = minter.clone();
                std::thread::spawn(move || (0..50).map(|_| minter.mint(&[])).collect::<Vec<_>>())
            })
            .collect();
        let mut ids: Vec<EnrollmentId> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 200);
    }
}
