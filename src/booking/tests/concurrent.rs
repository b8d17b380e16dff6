//! Tests for concurrent ledger access

#[cfg(test)]
mod tests {
    use crate::booking::api::*;
    use crate::booking::tests::helpers::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_concurrent_identical_proposals_admit_one() {
        let f = Fixture::new();
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let ledger = f.ledger.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    ledger.propose(&format!("client-{}", i), CLASSIC, monday(), hm(14, 0))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, BookingError::Conflict { .. })));
        assert_eq!(
            f.ledger
                .list_for_date(monday(), &ACTIVE_STATUSES)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_concurrent_staggered_proposals_never_overlap() {
        let f = Fixture::new();
        let barrier = Arc::new(Barrier::new(12));

        // 120-minute services starting every 15 minutes from 14:00
        let handles: Vec<_> = (0..12u32)
            .map(|i| {
                let ledger = f.ledger.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    ledger.propose(&format!("client-{}", i), GEL, monday(), hm(14, 0) + i * 15)
                })
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert!(succeeded >= 1);

        let active = f.ledger.list_for_date(monday(), &ACTIVE_STATUSES).unwrap();
        assert_eq!(active.len(), succeeded);
        for pair in active.windows(2) {
            assert!(!pair[0].window().overlaps(&pair[1].window()));
        }
    }

    #[test]
    fn test_concurrent_confirm_and_expiry() {
        let f = Fixture::new();
        let appointment = f
            .ledger
            .propose("anna", CLASSIC, monday(), hm(10, 0))
            .unwrap();
        let deadline = appointment.expires_at.unwrap();

        let confirm = {
            let ledger = f.ledger.clone();
            thread::spawn(move || ledger.confirm(appointment.id))
        };
        let expire = {
            let ledger = f.ledger.clone();
            thread::spawn(move || ledger.expire_stale(deadline))
        };
        let confirmed = confirm.join().unwrap();
        let expired = expire.join().unwrap().unwrap();

        // exactly one of the two wins
        let stored = f.ledger.get(appointment.id).unwrap();
        match stored.status {
            AppointmentStatus::Confirmed => {
                assert!(confirmed.is_ok());
                assert!(expired.is_empty());
            }
            AppointmentStatus::Cancelled => {
                assert!(confirmed.is_err());
                assert_eq!(expired.len(), 1);
            }
            AppointmentStatus::Proposed => panic!("appointment left proposed"),
        }
    }
}
