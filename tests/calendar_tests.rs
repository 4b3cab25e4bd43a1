use business_days::calendar::{ExclusionSet, business_days_between, is_weekend};
use business_days::NonWorkingDay;
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn same_day_is_zero_regardless_of_exclusions() {
    let day = d(2025, 1, 8);
    assert_eq!(business_days_between(day, day, &[]), 0);
    assert_eq!(business_days_between(day, day, &[day]), 0);
}

#[test]
fn monday_to_friday_same_week() {
    // 2025-01-06 is a Monday, 2025-01-10 the Friday of that week
    assert_eq!(business_days_between(d(2025, 1, 6), d(2025, 1, 10), &[]), 3);
}

#[test]
fn monday_to_next_monday() {
    assert_eq!(business_days_between(d(2025, 1, 6), d(2025, 1, 13), &[]), 4);
}

#[test]
fn two_whole_weeks_subtract_four_weekend_days() {
    assert_eq!(business_days_between(d(2025, 1, 6), d(2025, 1, 20), &[]), 9);
}

#[test]
fn next_day_is_zero() {
    assert_eq!(business_days_between(d(2025, 1, 6), d(2025, 1, 7), &[]), 0);
}

#[test]
fn partial_week_across_weekend_is_not_weekday_aware() {
    // Friday -> Monday: no whole week, so the weekend is not subtracted.
    assert_eq!(business_days_between(d(2025, 1, 10), d(2025, 1, 13), &[]), 2);
}

#[test]
fn reversed_ranges_are_negative() {
    assert_eq!(business_days_between(d(2025, 1, 10), d(2025, 1, 6), &[]), -5);
    assert_eq!(business_days_between(d(2025, 1, 13), d(2025, 1, 6), &[]), -6);
}

#[test]
fn exclusion_inside_range_subtracts_one() {
    let holiday = d(2025, 1, 8);
    assert_eq!(
        business_days_between(d(2025, 1, 6), d(2025, 1, 10), &[holiday]),
        2
    );
    assert_eq!(
        business_days_between(d(2025, 1, 10), d(2025, 1, 6), &[holiday]),
        -6
    );
}

#[test]
fn exclusion_bounds_are_inclusive() {
    let start = d(2025, 1, 6);
    let end = d(2025, 1, 10);
    assert_eq!(business_days_between(start, end, &[start]), 2);
    assert_eq!(business_days_between(start, end, &[end]), 2);
    assert_eq!(business_days_between(start, end, &[d(2025, 1, 11)]), 3);
    assert_eq!(business_days_between(start, end, &[d(2025, 1, 5)]), 3);
}

#[test]
fn duplicate_exclusions_count_once() {
    let holiday = d(2025, 1, 8);
    assert_eq!(
        business_days_between(d(2025, 1, 6), d(2025, 1, 10), &[holiday, holiday]),
        2
    );
}

#[test]
fn weekend_exclusion_is_subtracted_again() {
    // Saturday 2025-01-11 is already covered by the whole-week deduction.
    let saturday = d(2025, 1, 11);
    assert!(is_weekend(saturday));
    assert_eq!(
        business_days_between(d(2025, 1, 6), d(2025, 1, 13), &[saturday]),
        3
    );
}

#[test]
fn exclusion_set_from_days_and_queries() {
    let days = vec![
        NonWorkingDay::new(1, "Epiphany", d(2025, 1, 6)),
        NonWorkingDay::new(2, "Saturday off", d(2025, 1, 11)),
        NonWorkingDay::new(3, "Duplicate", d(2025, 1, 6)),
    ];
    let set = ExclusionSet::from_days(&days);
    assert!(set.contains(d(2025, 1, 6)));
    assert!(set.contains(d(2025, 1, 11)));
    assert!(!set.contains(d(2025, 1, 7)));
    assert_eq!(set.count_within(d(2025, 1, 1), d(2025, 1, 31)), 2);
    assert_eq!(set.count_within(d(2025, 1, 31), d(2025, 1, 7)), 1);
    assert_eq!(set.business_days_between(d(2025, 1, 6), d(2025, 1, 13)), 2);
}
