//! Slot resolver tests

#[cfg(test)]
mod tests {
    use crate::booking::api::*;
    use crate::booking::slots::{free_intervals, grid_starts};
    use crate::booking::tests::helpers::*;
    use chrono::Duration;

    fn hours(list: &[u32]) -> Vec<Minute> {
        list.iter().map(|h| h * 60).collect()
    }

    #[test]
    fn test_free_intervals() {
        let window = TimeWindow::new(600, 1200);
        assert_eq!(free_intervals(window, &[]), vec![window]);
        assert_eq!(
            free_intervals(
                window,
                &[
                    TimeWindow::new(500, 630),
                    TimeWindow::new(700, 760),
                    TimeWindow::new(740, 800),
                    TimeWindow::new(1150, 1300)
                ]
            ),
            vec![TimeWindow::new(630, 700), TimeWindow::new(800, 1150)]
        );
        assert!(free_intervals(window, &[TimeWindow::new(0, 1440)]).is_empty());
        assert_eq!(
            free_intervals(window, &[TimeWindow::new(1200, 1260)]),
            vec![window]
        );
    }

    #[test]
    fn test_grid_starts_anchor_on_window() {
        // free part begins off-grid: first start is the next grid point
        assert_eq!(
            grid_starts(600, TimeWindow::new(630, 780), 60, 60),
            vec![660, 720]
        );
        assert!(grid_starts(600, TimeWindow::new(600, 659), 60, 60).is_empty());
        assert_eq!(
            grid_starts(600, TimeWindow::new(600, 720), 30, 30),
            vec![600, 630, 660, 690]
        );
    }

    #[test]
    fn test_standard_day() {
        let f = Fixture::new();
        assert_eq!(
            f.slots(CLASSIC, monday()),
            hours(&[10, 11, 12, 14, 15, 16, 17, 18, 19])
        );
    }

    #[test]
    fn test_long_service_must_fit_window() {
        let f = Fixture::new();
        assert_eq!(
            f.slots(GEL, monday()),
            hours(&[10, 11, 14, 15, 16, 17, 18])
        );
    }

    #[test]
    fn test_confirmed_appointment_blocks_its_slot_only() {
        let f = Fixture::new();
        let booked = f
            .ledger
            .propose("anna", CLASSIC, monday(), hm(14, 0))
            .unwrap();
        f.ledger.confirm(booked.id).unwrap();

        assert_eq!(
            f.slots(CLASSIC, monday()),
            hours(&[10, 11, 12, 15, 16, 17, 18, 19])
        );
    }

    #[test]
    fn test_proposed_appointment_blocks_until_expiry() {
        let f = Fixture::new();
        f.ledger
            .propose("anna", GEL, monday(), hm(10, 0))
            .unwrap();
        assert_eq!(
            f.slots(CLASSIC, monday()),
            hours(&[12, 14, 15, 16, 17, 18, 19])
        );

        f.clock.advance(Duration::minutes(15));
        assert_eq!(
            f.slots(CLASSIC, monday()),
            hours(&[10, 11, 12, 14, 15, 16, 17, 18, 19])
        );
    }

    #[test]
    fn test_off_grid_booking_shifts_to_next_grid_point() {
        let f = Fixture::new();
        f.ledger
            .propose("anna", REMOVAL, monday(), hm(10, 0))
            .unwrap();
        assert_eq!(
            f.slots(CLASSIC, monday()),
            hours(&[11, 12, 14, 15, 16, 17, 18, 19])
        );
    }

    #[test]
    fn test_boundary_start_included_one_minute_later_excluded() {
        let f = Fixture::with_granularity(1);
        let slots = f.slots(CLASSIC, monday());

        assert!(slots.contains(&hm(12, 0)));
        assert!(!slots.contains(&hm(12, 1)));
        assert!(slots.contains(&hm(19, 0)));
        assert!(!slots.contains(&hm(19, 1)));
        assert_eq!(slots.first(), Some(&hm(10, 0)));
        assert_eq!(slots.len(), 121 + 301);
    }

    #[test]
    fn test_closed_and_non_work_days() {
        let f = Fixture::new();
        let sunday = monday() - Duration::days(1);
        assert!(f.slots(CLASSIC, sunday + Duration::days(7)).is_empty());

        f.calendar
            .set_date_override(monday(), DayOverride::Closed)
            .unwrap();
        assert!(f.slots(CLASSIC, monday()).is_empty());
    }

    #[test]
    fn test_past_date_and_today() {
        let f = Fixture::new();
        f.clock.set(at(monday(), 14, 20));

        assert!(f.slots(CLASSIC, monday() - Duration::days(7)).is_empty());
        assert_eq!(f.slots(CLASSIC, monday()), hours(&[15, 16, 17, 18, 19]));
    }

    #[test]
    fn test_unknown_service() {
        let f = Fixture::new();
        assert!(matches!(
            f.resolver.available_slots("pedicure", monday()),
            Err(BookingError::NotFound { .. })
        ));
    }

    #[test]
    fn test_slots_never_overlap_active_appointments() {
        let f = Fixture::with_granularity(15);
        for (client, service, start) in [
            ("a", REMOVAL, hm(10, 15)),
            ("b", GEL, hm(11, 0)),
            ("c", CLASSIC, hm(14, 45)),
            ("d", REMOVAL, hm(17, 30)),
        ] {
            f.ledger.propose(client, service, monday(), start).unwrap();
        }

        let occupied: Vec<TimeWindow> = f
            .ledger
            .list_for_date(monday(), &ACTIVE_STATUSES)
            .unwrap()
            .iter()
            .map(|a| a.window())
            .collect();
        for service in [CLASSIC, GEL, REMOVAL] {
            let duration = f.catalog.get_service(service).unwrap().duration_minutes;
            let windows = f.calendar.open_windows(monday()).unwrap();
            for start in f.slots(service, monday()) {
                let slot = TimeWindow::new(start, start + duration);
                assert!(occupied.iter().all(|busy| !busy.overlaps(&slot)), "{}", slot);
                assert!(windows.iter().any(|w| w.contains(&slot)), "{}", slot);
            }
        }
    }

    #[test]
    fn test_check_bookable() {
        let f = Fixture::new();
        f.resolver
            .check_bookable(CLASSIC, monday(), hm(10, 0))
            .unwrap();

        for start in [hm(10, 30), hm(9, 0), hm(13, 0), hm(19, 30), u32::MAX] {
            assert!(
                matches!(
                    f.resolver.check_bookable(CLASSIC, monday(), start),
                    Err(BookingError::Validation { .. })
                ),
                "{}",
                format_minute(start)
            );
        }

        f.clock.set(at(monday(), 11, 5));
        assert!(matches!(
            f.resolver.check_bookable(CLASSIC, monday(), hm(11, 0)),
            Err(BookingError::Validation { .. })
        ));
        f.resolver
            .check_bookable(CLASSIC, monday(), hm(12, 0))
            .unwrap();
    }
}
