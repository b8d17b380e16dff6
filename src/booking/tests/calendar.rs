//! Availability calendar tests

#[cfg(test)]
mod tests {
    use crate::booking::api::*;
    use crate::booking::tests::helpers::*;
    use chrono::{Duration, Weekday};

    #[test]
    fn test_template_windows_split_around_break() {
        let calendar = Calendar::new(WeeklyTemplate::default()).unwrap();
        assert_eq!(
            calendar.open_windows(monday()).unwrap(),
            vec![
                TimeWindow::new(hm(10, 0), hm(13, 0)),
                TimeWindow::new(hm(14, 0), hm(20, 0))
            ]
        );
    }

    #[test]
    fn test_non_work_day_is_closed() {
        let calendar = Calendar::new(WeeklyTemplate::default()).unwrap();
        let sunday = monday() - Duration::days(1);
        assert!(calendar.open_windows(sunday).unwrap().is_empty());
    }

    #[test]
    fn test_template_without_break() {
        let template = WeeklyTemplate::new(vec![Weekday::Mon], HourRange::new(9, 17), None);
        let calendar = Calendar::new(template).unwrap();
        assert_eq!(
            calendar.open_windows(monday()).unwrap(),
            vec![TimeWindow::new(hm(9, 0), hm(17, 0))]
        );
    }

    #[test]
    fn test_invalid_templates_rejected() {
        let calendar = Calendar::new(WeeklyTemplate::default()).unwrap();
        let days = vec![Weekday::Mon];
        for template in [
            WeeklyTemplate::new(days.clone(), HourRange::new(12, 10), None),
            WeeklyTemplate::new(days.clone(), HourRange::new(10, 10), None),
            WeeklyTemplate::new(days.clone(), HourRange::new(10, 24), None),
            WeeklyTemplate::new(days.clone(), HourRange::new(10, 20), Some(HourRange::new(10, 11))),
            WeeklyTemplate::new(days.clone(), HourRange::new(10, 20), Some(HourRange::new(19, 20))),
            WeeklyTemplate::new(days.clone(), HourRange::new(10, 20), Some(HourRange::new(14, 13))),
        ] {
            assert!(
                matches!(
                    calendar.set_weekly_template(template.clone()),
                    Err(BookingError::Validation { .. })
                ),
                "{:?} should be rejected",
                template
            );
        }
        assert_eq!(calendar.weekly_template().unwrap(), WeeklyTemplate::default());
    }

    #[test]
    fn test_empty_work_days_allowed() {
        let calendar = Calendar::new(WeeklyTemplate::default()).unwrap();
        calendar
            .set_weekly_template(WeeklyTemplate::new(Vec::new(), HourRange::new(10, 20), None))
            .unwrap();
        assert!(calendar.open_windows(monday()).unwrap().is_empty());
    }

    #[test]
    fn test_work_days_normalised() {
        let calendar = Calendar::new(WeeklyTemplate::default()).unwrap();
        let template = calendar
            .set_weekly_template(WeeklyTemplate::new(
                vec![Weekday::Fri, Weekday::Mon, Weekday::Fri],
                HourRange::new(10, 20),
                None,
            ))
            .unwrap();
        assert_eq!(template.work_days, vec![Weekday::Mon, Weekday::Fri]);
    }

    #[test]
    fn test_overrides() {
        let calendar = Calendar::new(WeeklyTemplate::default()).unwrap();
        let tuesday = monday() + Duration::days(1);
        let sunday = monday() - Duration::days(1);

        calendar
            .set_date_override(monday(), DayOverride::Closed)
            .unwrap();
        calendar
            .set_date_override(
                sunday,
                DayOverride::Hours(DayHours::new(HourRange::new(11, 15), None)),
            )
            .unwrap();
        calendar
            .set_date_override(
                tuesday,
                DayOverride::Hours(DayHours::new(
                    HourRange::new(12, 18),
                    Some(HourRange::new(15, 16)),
                )),
            )
            .unwrap();

        assert!(calendar.open_windows(monday()).unwrap().is_empty());
        assert_eq!(
            calendar.open_windows(sunday).unwrap(),
            vec![TimeWindow::new(hm(11, 0), hm(15, 0))]
        );
        assert_eq!(
            calendar.open_windows(tuesday).unwrap(),
            vec![
                TimeWindow::new(hm(12, 0), hm(15, 0)),
                TimeWindow::new(hm(16, 0), hm(18, 0))
            ]
        );

        let listed: Vec<_> = calendar
            .list_overrides()
            .unwrap()
            .into_iter()
            .map(|(d, _)| d)
            .collect();
        assert_eq!(listed, vec![sunday, monday(), tuesday]);

        assert!(calendar.clear_date_override(monday()).unwrap());
        assert!(!calendar.clear_date_override(monday()).unwrap());
        assert_eq!(calendar.open_windows(monday()).unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let calendar = Calendar::new(WeeklyTemplate::default()).unwrap();
        let bad = DayOverride::Hours(DayHours::new(HourRange::new(15, 11), None));
        assert!(matches!(
            calendar.set_date_override(monday(), bad),
            Err(BookingError::Validation { .. })
        ));
        assert_eq!(calendar.date_override(monday()).unwrap(), None);
    }
}
