use super::*;
use std::sync::Arc;

fn blob_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn identical_content_written_once() {
    let dir = tempfile::tempdir().unwrap();
    let index = ContentIndex::open(dir.path()).unwrap();

    let first = index
        .ingest("https://x/a", b"var a = 1;", Classification::Inline)
        .unwrap();
    let second = index
        .ingest("https://x/b", b"var a = 1;", Classification::External)
        .unwrap();
    assert_eq!(first, IngestOutcome::Stored);
    assert_eq!(second, IngestOutcome::Referenced);

    let fp = Fingerprint::of(b"var a = 1;");
    assert_eq!(blob_files(dir.path()), vec![format!("{}.js", fp)]);
    let record = index.record(&fp).unwrap().unwrap();
    assert_eq!(record.content(), b"var a = 1;");
}

#[test]
fn later_ingest_does_not_rewrite_blob() {
    let dir = tempfile::tempdir().unwrap();
    let index = ContentIndex::open(dir.path()).unwrap();
    let fp = Fingerprint::of(b"x()");
    index.ingest("https://x/a", b"x()", Classification::Inline).unwrap();

    // Tamper with the staged file; a second sighting must leave it alone.
    let staged = dir.path().join(format!("{}.js", fp));
    std::fs::write(&staged, b"tampered").unwrap();
    index.ingest("https://x/b", b"x()", Classification::Inline).unwrap();
    assert_eq!(std::fs::read(&staged).unwrap(), b"tampered");
}

#[test]
fn references_accumulate_last_classification_wins() {
    let dir = tempfile::tempdir().unwrap();
    let index = ContentIndex::open(dir.path()).unwrap();
    for i in 0..5 {
        index
            .ingest(&format!("https://x/{}", i), b"shared", Classification::External)
            .unwrap();
    }
    index.ingest("https://x/2", b"shared", Classification::Inline).unwrap();

    let record = index.record(&Fingerprint::of(b"shared")).unwrap().unwrap();
    assert_eq!(record.references().len(), 5);
    assert_eq!(record.references()["https://x/2"], Classification::Inline);
    assert_eq!(record.inline_urls().collect::<Vec<_>>(), vec!["https://x/2"]);
    assert_eq!(index.len().unwrap(), 1);
}

#[test]
fn cancelled_index_ignores_ingest() {
    let dir = tempfile::tempdir().unwrap();
    let index = ContentIndex::open(dir.path()).unwrap();
    assert!(index.is_accepting());
    assert!(index.cancel().unwrap());
    assert!(!index.cancel().unwrap());
    assert_eq!(index.phase().unwrap(), RunPhase::Cancelling);
    assert!(!index.is_accepting());

    let outcome = index
        .ingest("https://x/a", b"late", Classification::Inline)
        .unwrap();
    assert_eq!(outcome, IngestOutcome::Ignored);
    assert!(index.is_empty().unwrap());
    assert!(blob_files(dir.path()).is_empty());
}

#[test]
fn failed_write_is_reported_and_not_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let index = ContentIndex::open(&out).unwrap();
    std::fs::remove_dir(&out).unwrap();

    let err = index
        .ingest("https://x/a", b"body", Classification::Inline)
        .unwrap_err();
    assert!(matches!(err, IndexError::Storage(_)));
    assert!(index.is_empty().unwrap());
}

#[test]
fn concurrent_ingest_writes_each_blob_once() {
    let dir = tempfile::tempdir().unwrap();
    let index = Arc::new(ContentIndex::open(dir.path()).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                for i in 0..20 {
                    let body = format!("script {}", i % 4);
                    let url = format!("https://x/w{}/p{}", worker, i);
                    index
                        .ingest(&url, body.as_bytes(), Classification::Inline)
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(index.len().unwrap(), 4);
    assert_eq!(blob_files(dir.path()).len(), 4);
    let record = index.record(&Fingerprint::of(b"script 0")).unwrap().unwrap();
    assert_eq!(record.references().len(), 8 * 5);
}
