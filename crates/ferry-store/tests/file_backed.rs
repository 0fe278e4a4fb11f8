//! `DeviceStorage` over real files (plain store doubling as token store).

use std::sync::Arc;

use ferry_core::{AppKind, PendingCheckIn};
use ferry_store::{DeviceStorage, FileStore, KeyValueStore};

#[test]
fn state_survives_reopen() {
    let tmp = tempfile::TempDir::new().expect("tmp dir");
    let open = || {
        let file: Arc<dyn KeyValueStore> = Arc::new(FileStore::in_dir(tmp.path()));
        DeviceStorage::new(Arc::clone(&file), file, AppKind::Checker)
    };

    let first = open();
    first.set_tokens("acc", "ref").expect("tokens");
    first
        .set_offline_queue(&[PendingCheckIn::new("3f0e4b1a")])
        .expect("queue");
    first.increment_today_count().expect("count");

    let second = open();
    assert_eq!(second.access_token().expect("read").as_deref(), Some("acc"));
    assert_eq!(second.offline_queue().expect("queue").len(), 1);
    assert_eq!(second.today_count().expect("count"), 1);

    second.clear_all().expect("clear");
    assert_eq!(open().session().expect("read"), None);
}

#[test]
fn queue_is_stored_with_legacy_keys() {
    let tmp = tempfile::TempDir::new().expect("tmp dir");
    let file = Arc::new(FileStore::in_dir(tmp.path()));
    let storage = DeviceStorage::new(file.clone(), file.clone(), AppKind::Checker);

    storage
        .set_offline_queue(&[PendingCheckIn::new("abc")])
        .expect("queue");

    let raw = file
        .get("ssmspl_offline_queue")
        .expect("read")
        .expect("present");
    assert_eq!(raw, r#"[{"verificationCode":"abc","retryCount":0}]"#);
}
