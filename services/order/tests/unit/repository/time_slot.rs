use std::str::FromStr;

use order_admission::model::TimeSlotModel;
use order_admission::repository::{AbsTimeSlotRepo, TimeSlotInMemRepo};

use super::ut_in_mem_dstore;

fn ut_slot(raw: &str) -> TimeSlotModel {
    TimeSlotModel::from_str(raw).unwrap()
}

#[tokio::test]
async fn fetch_enabled_empty() {
    let repo = TimeSlotInMemRepo::new(ut_in_mem_dstore(20)).await.unwrap();
    let fetched = repo.fetch_enabled().await.unwrap();
    assert!(fetched.is_empty());
}

#[tokio::test]
async fn save_and_toggle() {
    let repo = TimeSlotInMemRepo::new(ut_in_mem_dstore(20)).await.unwrap();
    let data = vec![
        (ut_slot("18:30"), true),
        (ut_slot("19:00"), true),
        (ut_slot("19:30"), false),
    ];
    repo.save(data).await.unwrap();
    let mut fetched = repo.fetch_enabled().await.unwrap();
    fetched.sort();
    assert_eq!(fetched, vec![ut_slot("18:30"), ut_slot("19:00")]);

    let data = vec![(ut_slot("18:30"), false), (ut_slot("19:30"), true)];
    repo.save(data).await.unwrap();
    let mut fetched = repo.fetch_enabled().await.unwrap();
    fetched.sort();
    assert_eq!(fetched, vec![ut_slot("19:00"), ut_slot("19:30")]);
}
