use std::sync::Arc;

use chrono::NaiveDate;
use makan_index::vendors::{
    MemoryVendorStore, Region, RepositoryError, Vendor, VendorPatch, VendorService,
    VendorServiceError,
};

fn vendor(id: &str, name: &str, state: Region, score: f64) -> Vendor {
    Vendor {
        id: id.to_string(),
        name: name.to_string(),
        state,
        address: format!("{name}, Malaysia"),
        latitude: 3.1390,
        longitude: 101.6869,
        jason_score: score,
        keypoints: vec!["Rich broth".to_string()],
        tiktok_url: format!("https://www.tiktok.com/@jason/video/{id}"),
        maps_url: None,
        image_url: format!("https://cdn.example.com/{id}.jpg"),
        review_date: NaiveDate::from_ymd_opt(2024, 11, 2).expect("valid date"),
    }
}

fn service_with(records: Vec<Vendor>) -> VendorService<MemoryVendorStore> {
    VendorService::new(Arc::new(MemoryVendorStore::with_records(records)))
}

#[test]
fn create_then_get_round_trips() {
    let service = service_with(Vec::new());
    let record = vendor("laksa-1", "Penang Assam Laksa", Region::Penang, 9.0);

    service.create(record.clone()).expect("create succeeds");
    let fetched = service.get("laksa-1").expect("record exists");

    assert_eq!(fetched, record);
}

#[test]
fn duplicate_id_is_rejected_and_store_unchanged() {
    let original = vendor("laksa-1", "Penang Assam Laksa", Region::Penang, 9.0);
    let service = service_with(vec![original.clone()]);

    let duplicate = vendor("laksa-1", "Impostor Laksa", Region::Johor, 2.0);
    let err = service.create(duplicate).expect_err("duplicate rejected");
    assert!(matches!(
        err,
        VendorServiceError::Repository(RepositoryError::Conflict)
    ));

    let all = service.list().expect("list succeeds");
    assert_eq!(all, vec![original]);
}

#[test]
fn invalid_score_is_rejected_before_reaching_the_store() {
    let service = service_with(Vec::new());
    let record = vendor("bad-1", "Overrated Stall", Region::Selangor, 11.0);

    let err = service.create(record).expect_err("score out of range");
    assert!(matches!(err, VendorServiceError::Validation(_)));
    assert!(service.list().expect("list succeeds").is_empty());
}

#[test]
fn update_merges_only_supplied_fields() {
    let service = service_with(vec![vendor(
        "ckt-1",
        "Char Kway Teow Bros",
        Region::Penang,
        7.5,
    )]);

    let patch = VendorPatch {
        jason_score: Some(8.2),
        keypoints: Some(vec![
            "Smoky wok hei".to_string(),
            "Generous prawns".to_string(),
        ]),
        ..VendorPatch::default()
    };
    let updated = service.update("ckt-1", patch).expect("update succeeds");

    assert_eq!(updated.jason_score, 8.2);
    assert_eq!(updated.keypoints.len(), 2);
    assert_eq!(updated.name, "Char Kway Teow Bros");
    assert_eq!(updated.state, Region::Penang);
}

#[test]
fn update_missing_record_reports_not_found() {
    let service = service_with(Vec::new());

    let err = service
        .update("ghost", VendorPatch::default())
        .expect_err("missing record");
    assert!(matches!(
        err,
        VendorServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[test]
fn delete_returns_the_removed_record() {
    let keeper = vendor("keep-1", "Keeper Kopitiam", Region::Melaka, 6.0);
    let target = vendor("gone-1", "Closed Corner", Region::Melaka, 5.0);
    let service = service_with(vec![keeper.clone(), target.clone()]);

    let removed = service.delete("gone-1").expect("delete succeeds");
    assert_eq!(removed, target);
    assert_eq!(service.list().expect("list succeeds"), vec![keeper]);
}

#[test]
fn delete_missing_record_leaves_store_unchanged() {
    let only = vendor("keep-1", "Keeper Kopitiam", Region::Melaka, 6.0);
    let service = service_with(vec![only.clone()]);

    let err = service.delete("ghost").expect_err("missing record");
    assert!(matches!(
        err,
        VendorServiceError::Repository(RepositoryError::NotFound)
    ));
    assert_eq!(service.list().expect("list succeeds"), vec![only]);
}
