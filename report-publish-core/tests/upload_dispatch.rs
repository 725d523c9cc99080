use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use report_publish_core::content_type::ContentTypeTable;
use report_publish_core::contract::{BackendError, MockStorageBackend, StorageBackend};
use report_publish_core::materialize::FileMapping;
use report_publish_core::paths::RelativePath;
use report_publish_core::source::ByteSource;
use report_publish_core::upload::upload_all;
use tokio::sync::Barrier;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Created {
    bucket: String,
    key: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Records every create call.
#[derive(Default)]
struct RecordingBackend {
    created: Mutex<Vec<Created>>,
}

#[async_trait]
impl StorageBackend for RecordingBackend {
    async fn create(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BackendError> {
        self.created.lock().unwrap().push(Created {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(())
    }
}

/// Blocks every create call until `expected` calls are in flight at once.
struct BarrierBackend {
    barrier: Barrier,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl StorageBackend for BarrierBackend {
    async fn create(&self, _: &str, _: &str, _: &str, _: Vec<u8>) -> Result<(), BackendError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.barrier.wait().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

fn mapping(entries: &[(&str, &str)]) -> FileMapping {
    let mut files = FileMapping::new();
    for (path, content) in entries {
        files.insert(RelativePath::parse(path), ByteSource::from_string(*content));
    }
    files
}

#[tokio::test]
async fn test_upload_all_creates_one_object_per_file() {
    let backend = Arc::new(RecordingBackend::default());
    let files = mapping(&[
        ("reports\\tests\\index.html", "<html/>"),
        ("reports/tests/css/site.css", "body{}"),
        ("reports/tests\\run.log", "ok"),
        ("reports/tests/data.bin", "\u{7f}"),
    ]);

    upload_all(
        backend.clone(),
        Arc::new(ContentTypeTable::default()),
        "ci-bucket",
        "builds\\42",
        files,
    )
    .await;

    let mut created = backend.created.lock().unwrap().clone();
    created.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(created.len(), 4, "exactly one create per file");

    let summary: Vec<(&str, &str)> = created
        .iter()
        .map(|c| (c.key.as_str(), c.content_type.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("builds/42/reports/tests/css/site.css", "text/css"),
            ("builds/42/reports/tests/data.bin", "application/octet-stream"),
            ("builds/42/reports/tests/index.html", "text/html"),
            ("builds/42/reports/tests/run.log", "text/plain"),
        ]
    );
    assert!(created.iter().all(|c| c.bucket == "ci-bucket"));
    assert!(created.iter().all(|c| !c.key.contains('\\')));
    let index = created.iter().find(|c| c.key.ends_with("index.html")).unwrap();
    assert_eq!(index.bytes, b"<html/>");
}

#[tokio::test]
async fn test_upload_all_with_empty_mapping_makes_no_calls() {
    let mut backend = MockStorageBackend::new();
    backend.expect_create().times(0);

    upload_all(
        Arc::new(backend),
        Arc::new(ContentTypeTable::default()),
        "bucket",
        "",
        FileMapping::new(),
    )
    .await;
}

#[tokio::test]
async fn test_failed_upload_does_not_stop_the_batch() {
    let mut backend = MockStorageBackend::new();
    backend
        .expect_create()
        .times(3)
        .returning(|_bucket, key, _content_type, _bytes| {
            if key.ends_with("b.txt") {
                Err("simulated backend outage".into())
            } else {
                Ok(())
            }
        });

    // Returns normally even though one upload failed.
    upload_all(
        Arc::new(backend),
        Arc::new(ContentTypeTable::default()),
        "bucket",
        "prefix",
        mapping(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")]),
    )
    .await;
}

#[tokio::test]
async fn test_unreadable_source_skips_only_that_upload() {
    let backend = Arc::new(RecordingBackend::default());
    let mut files = mapping(&[("good.txt", "fine")]);
    files.insert(
        RelativePath::parse("missing.txt"),
        ByteSource::from_file("/definitely/not/here/missing.txt"),
    );

    upload_all(
        backend.clone(),
        Arc::new(ContentTypeTable::default()),
        "bucket",
        "",
        files,
    )
    .await;

    let created = backend.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].key, "good.txt");
}

#[tokio::test]
async fn test_panicking_source_is_absorbed_and_others_complete() {
    let backend = Arc::new(RecordingBackend::default());
    let mut files = mapping(&[("one.txt", "1"), ("two.txt", "2")]);
    files.insert(
        RelativePath::parse("boom.txt"),
        ByteSource::from_fn("boom", || panic!("source blew up")),
    );

    upload_all(
        backend.clone(),
        Arc::new(ContentTypeTable::default()),
        "bucket",
        "",
        files,
    )
    .await;

    let mut keys: Vec<String> = backend
        .created
        .lock()
        .unwrap()
        .iter()
        .map(|c| c.key.clone())
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["one.txt", "two.txt"]);
}

#[tokio::test]
async fn test_every_file_is_uploaded_concurrently() {
    const FILES: usize = 16;
    let backend = Arc::new(BarrierBackend {
        barrier: Barrier::new(FILES),
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let mut files = FileMapping::new();
    for i in 0..FILES {
        files.insert(
            RelativePath::parse(&format!("file-{i}.txt")),
            ByteSource::from_string(format!("{i}")),
        );
    }

    // A dispatcher that serialized uploads would never release the barrier.
    tokio::time::timeout(
        Duration::from_secs(10),
        upload_all(
            backend.clone(),
            Arc::new(ContentTypeTable::default()),
            "bucket",
            "",
            files,
        ),
    )
    .await
    .expect("all uploads should be in flight at once");

    assert_eq!(backend.peak.load(Ordering::SeqCst), FILES);
    assert_eq!(backend.in_flight.load(Ordering::SeqCst), 0);
}
