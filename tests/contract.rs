//! Behaviour every `SpoolStore` must share, run against the local and the
//! remote backend alike.

mod common;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use common::Harness;
use std::sync::Arc;
use filament_tracker::model::{Material, NewSpool, NewUsageLog, Photo};
use filament_tracker::store::SpoolStore;
use filament_tracker::TrackerError;

macro_rules! contract {
    (shared $name:ident) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn local() {
                let harness = Harness::local().await;
                super::$name(harness.shared()).await;
            }

            #[tokio::test]
            async fn remote() {
                let harness = Harness::remote().await;
                super::$name(harness.shared()).await;
            }
        }
    };
    ($name:ident) => {
        mod $name {
            use super::*;

            #[tokio::test]
            async fn local() {
                let harness = Harness::local().await;
                super::$name(harness.store()).await;
            }

            #[tokio::test]
            async fn remote() {
                let harness = Harness::remote().await;
                super::$name(harness.store()).await;
            }
        }
    };
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, minute, 0).unwrap()
}

fn prusament() -> NewSpool {
    NewSpool::new(
        "Prusament",
        "Black",
        Material::Pla,
        1000.0,
        20.0,
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
    )
}

async fn usage_scenario_tracks_weight(store: &dyn SpoolStore) {
    let id = store.add_spool(prusament()).await.unwrap();
    assert_eq!(id, 1);

    store
        .append_log(NewUsageLog::new(id, -250.0, at(10, 0)), 750.0)
        .await
        .unwrap();
    assert_eq!(store.get_spool(id).await.unwrap().unwrap().weight, 750.0);

    store
        .append_log(NewUsageLog::new(id, 100.0, at(11, 0)), 850.0)
        .await
        .unwrap();
    let spool = store.get_spool(id).await.unwrap().unwrap();
    assert_eq!(spool.weight, 850.0);
    assert_eq!(spool.initial_weight, 1000.0);
}
contract!(usage_scenario_tracks_weight);

async fn append_makes_log_and_weight_visible_together(store: &dyn SpoolStore) {
    let id = store.add_spool(prusament()).await.unwrap();

    let log = NewUsageLog::new(id, -42.5, at(9, 15)).with_note("calibration cube");
    store.append_log(log, 957.5).await.unwrap();

    let spool = store.get_spool(id).await.unwrap().unwrap();
    let logs = store.list_logs(id).await.unwrap();
    assert_eq!(spool.weight, 957.5);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].spool_id, id);
    assert_eq!(logs[0].change_amount, -42.5);
    assert_eq!(logs[0].date, at(9, 15));
    assert_eq!(logs[0].note.as_deref(), Some("calibration cube"));
}
contract!(append_makes_log_and_weight_visible_together);

async fn weight_equals_initial_plus_log_sum(store: &dyn SpoolStore) {
    let id = store.add_spool(prusament()).await.unwrap();
    for change in [-120.0, -33.5, 200.0, -80.25] {
        store
            .record_change(NewUsageLog::new(id, change, Utc::now()))
            .await
            .unwrap();
    }

    let spool = store.get_spool(id).await.unwrap().unwrap();
    let logged: f64 = store
        .list_logs(id)
        .await
        .unwrap()
        .iter()
        .map(|l| l.change_amount)
        .sum();
    assert_eq!(spool.initial_weight + logged, spool.weight);
    assert_eq!(spool.weight, 966.25);
}
contract!(weight_equals_initial_plus_log_sum);

async fn concurrent_changes_keep_weight_consistent(store: Arc<dyn SpoolStore>) {
    let id = store.add_spool(prusament()).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let store = store.clone();
        tasks.spawn(async move { store.record_change(NewUsageLog::usage(id, 10.0)).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    let spool = store.get_spool(id).await.unwrap().unwrap();
    let logged: f64 = store
        .list_logs(id)
        .await
        .unwrap()
        .iter()
        .map(|l| l.change_amount)
        .sum();
    assert_eq!(logged, -200.0);
    assert_eq!(spool.initial_weight + logged, spool.weight);
    assert_eq!(spool.weight, 800.0);
}
contract!(shared concurrent_changes_keep_weight_consistent);

async fn logs_are_newest_first(store: &dyn SpoolStore) {
    let id = store.add_spool(prusament()).await.unwrap();

    // Inserted out of chronological order on purpose
    store
        .record_change(NewUsageLog::new(id, -10.0, at(14, 0)))
        .await
        .unwrap();
    store
        .record_change(NewUsageLog::new(id, -20.0, at(8, 0)))
        .await
        .unwrap();
    store
        .record_change(NewUsageLog::new(id, -30.0, at(12, 0)))
        .await
        .unwrap();

    let dates: Vec<_> = store
        .list_logs(id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.date)
        .collect();
    assert_eq!(dates, vec![at(14, 0), at(12, 0), at(8, 0)]);
}
contract!(logs_are_newest_first);

async fn delete_cascades_to_logs(store: &dyn SpoolStore) {
    let id = store.add_spool(prusament()).await.unwrap();
    let other = store
        .add_spool(NewSpool::new(
            "eSun",
            "White",
            Material::Petg,
            1000.0,
            18.0,
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        ))
        .await
        .unwrap();

    for minute in 0..3 {
        store
            .record_change(NewUsageLog::new(id, -5.0, at(10, minute)))
            .await
            .unwrap();
    }
    store
        .record_change(NewUsageLog::new(other, -5.0, at(10, 0)))
        .await
        .unwrap();

    store.delete_spool(id).await.unwrap();
    assert!(store.get_spool(id).await.unwrap().is_none());
    assert!(store.list_logs(id).await.unwrap().is_empty());

    // The other spool keeps its history
    assert_eq!(store.list_logs(other).await.unwrap().len(), 1);

    // Deleting again is fine
    store.delete_spool(id).await.unwrap();
    let remaining: Vec<_> = store
        .list_spools()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(remaining, vec![other]);
}
contract!(delete_cascades_to_logs);

async fn missing_spool_is_absent_not_error(store: &dyn SpoolStore) {
    assert!(store.get_spool(999).await.unwrap().is_none());
    assert!(store.list_logs(999).await.unwrap().is_empty());
    assert!(store.list_spools().await.unwrap().is_empty());
    store.delete_spool(999).await.unwrap();
}
contract!(missing_spool_is_absent_not_error);

async fn append_to_unknown_spool_fails(store: &dyn SpoolStore) {
    let result = store
        .append_log(NewUsageLog::new(7, -1.0, at(10, 0)), 0.0)
        .await;
    assert!(matches!(result, Err(TrackerError::SpoolNotFound(7))));
    assert!(store.list_logs(7).await.unwrap().is_empty());
}
contract!(append_to_unknown_spool_fails);

async fn invalid_spool_is_rejected_before_write(store: &dyn SpoolStore) {
    let mut spool = prusament();
    spool.brand = "   ".to_string();
    assert!(matches!(
        store.add_spool(spool).await,
        Err(TrackerError::Validation(_))
    ));

    let mut spool = prusament();
    spool.cost = -3.0;
    assert!(store.add_spool(spool).await.is_err());

    assert!(store.list_spools().await.unwrap().is_empty());
}
contract!(invalid_spool_is_rejected_before_write);

async fn photo_round_trips(store: &dyn SpoolStore) {
    let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let photo = Photo::new("image/png", bytes);
    let id = store
        .add_spool(prusament().with_photo(photo.clone()))
        .await
        .unwrap();
    let plain = store.add_spool(prusament()).await.unwrap();

    let spool = store.get_spool(id).await.unwrap().unwrap();
    assert_eq!(spool.photo, Some(photo.clone()));

    let listed = store.list_spools().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].photo, Some(photo));
    assert_eq!(listed[1].id, plain);
    assert!(listed[1].photo.is_none());
}
contract!(photo_round_trips);

async fn spool_fields_survive_storage(store: &dyn SpoolStore) {
    let spool = NewSpool::new(
        "Polymaker",
        "Teal",
        Material::Other("PolyTerra PLA".to_string()),
        820.0,
        22.49,
        NaiveDate::from_ymd_opt(2023, 12, 24).unwrap(),
    )
    .with_initial_weight(1000.0);
    let id = store.add_spool(spool).await.unwrap();

    let stored = store.get_spool(id).await.unwrap().unwrap();
    assert_eq!(stored.brand, "Polymaker");
    assert_eq!(stored.color, "Teal");
    assert_eq!(stored.material, Material::Other("PolyTerra PLA".to_string()));
    assert_eq!(stored.weight, 820.0);
    assert_eq!(stored.initial_weight, 1000.0);
    assert_eq!(stored.cost, 22.49);
    assert_eq!(stored.purchase_date, NaiveDate::from_ymd_opt(2023, 12, 24).unwrap());
}
contract!(spool_fields_survive_storage);

#[tokio::test]
async fn weight_override_differs_by_backend() {
    let local = Harness::local().await;
    let id = local.store().add_spool(prusament()).await.unwrap();
    local.store().set_spool_weight(id, 400.0).await.unwrap();
    assert_eq!(local.store().get_spool(id).await.unwrap().unwrap().weight, 400.0);

    // The remote backend accepts the call but leaves the weight to the server
    let remote = Harness::remote().await;
    let id = remote.store().add_spool(prusament()).await.unwrap();
    remote.store().set_spool_weight(id, 400.0).await.unwrap();
    assert_eq!(remote.store().get_spool(id).await.unwrap().unwrap().weight, 1000.0);
}

#[tokio::test]
async fn remote_append_ignores_client_weight() {
    let remote = Harness::remote().await;
    let id = remote.store().add_spool(prusament()).await.unwrap();

    // A stale client estimate does not override the server's arithmetic
    remote
        .store()
        .append_log(NewUsageLog::new(id, -100.0, at(10, 0)), 12345.0)
        .await
        .unwrap();
    assert_eq!(remote.store().get_spool(id).await.unwrap().unwrap().weight, 900.0);
}
