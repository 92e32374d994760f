use std::str::FromStr;

use chrono::{DateTime, Duration};

use order_admission::error::AppErrorCode;
use order_admission::model::{SlotAvailabilityModel, SlotCatalogModel, TimeSlotModel};

fn ut_slots(raw: &[&str]) -> Vec<TimeSlotModel> {
    raw.iter()
        .map(|s| TimeSlotModel::from_str(s).unwrap())
        .collect()
}

fn ut_labels(slots: &[TimeSlotModel]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
}

#[test]
fn parse_time_slot() {
    let expect = TimeSlotModel::new(9, 5).unwrap();
    for raw in ["9:05", "09:05", " 09:05 ", "09:05:00", "09:05:59"] {
        assert_eq!(TimeSlotModel::from_str(raw).unwrap(), expect);
    }
    assert_eq!(expect.to_string().as_str(), "09:05");
    for raw in ["24:00", "19:60", "", "7pm", "19-20"] {
        let error = TimeSlotModel::from_str(raw).unwrap_err();
        assert_eq!(error.code, AppErrorCode::InvalidInput);
    }
}

#[test]
fn catalog_fallback_default_ladder() {
    let catalog = SlotCatalogModel::from_enabled(Vec::new());
    let labels = ut_labels(catalog.slots());
    assert_eq!(labels.len(), 10);
    assert_eq!(labels.first().unwrap().as_str(), "19:00");
    assert_eq!(labels[1].as_str(), "19:20");
    assert_eq!(labels.last().unwrap().as_str(), "22:00");
}

#[test]
fn catalog_sorted_unique() {
    let catalog = SlotCatalogModel::from_enabled(ut_slots(&["21:00", "18:30", "21:00", "19:15"]));
    assert_eq!(ut_labels(catalog.slots()), ["18:30", "19:15", "21:00"]);
}

#[test]
fn availability_excludes_booked_and_early_slots() {
    let catalog = SlotCatalogModel::default_ladder();
    let booked = ut_slots(&["21:00", "19:40"]);
    let now = DateTime::parse_from_rfc3339("2026-10-16T19:05:00+02:00").unwrap();
    let result = SlotAvailabilityModel::evaluate(&catalog, booked, now, Duration::minutes(20));
    assert_eq!(result.day.to_string().as_str(), "2026-10-16");
    // 19:20 starts only 15 minutes later
    assert_eq!(
        ut_labels(&result.available),
        ["20:00", "20:20", "20:40", "21:20", "21:40", "22:00"]
    );
    assert_eq!(ut_labels(&result.booked), ["19:40", "21:00"]);
}

#[test]
fn availability_lead_time_boundary() {
    let catalog = SlotCatalogModel::default_ladder();
    // exactly 20 minutes ahead is still offered
    let now = DateTime::parse_from_rfc3339("2026-10-16T19:40:00+02:00").unwrap();
    let result = SlotAvailabilityModel::evaluate(&catalog, Vec::new(), now, Duration::minutes(20));
    assert_eq!(ut_labels(&result.available)[0].as_str(), "20:00");
    let now = DateTime::parse_from_rfc3339("2026-10-16T19:40:01+02:00").unwrap();
    let result = SlotAvailabilityModel::evaluate(&catalog, Vec::new(), now, Duration::minutes(20));
    assert_eq!(ut_labels(&result.available)[0].as_str(), "20:20");
}

#[test]
fn availability_empty_late_evening() {
    let catalog = SlotCatalogModel::default_ladder();
    let now = DateTime::parse_from_rfc3339("2026-10-16T21:45:00+02:00").unwrap();
    let result = SlotAvailabilityModel::evaluate(&catalog, Vec::new(), now, Duration::minutes(20));
    assert!(result.available.is_empty());
    // slots are never moved to the next day
    assert_eq!(result.day.to_string().as_str(), "2026-10-16");
}

#[test]
fn availability_in_given_offset() {
    // 17:00 UTC is 19:00 in UTC+02:00
    let catalog = SlotCatalogModel::default_ladder();
    let now = DateTime::parse_from_rfc3339("2026-10-16T17:00:00+00:00").unwrap();
    let now = now.with_timezone(&chrono::FixedOffset::east_opt(7200).unwrap());
    let result = SlotAvailabilityModel::evaluate(&catalog, Vec::new(), now, Duration::minutes(20));
    assert_eq!(ut_labels(&result.available)[0].as_str(), "19:20");
}
