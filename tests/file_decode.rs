mod common;

use common::{two_cameras, wait_for_snapshot, FakeMedia, Harness};
use qrscan_lib::engine::{DecodeEvent, EngineError};
use qrscan_lib::models::FILE_SCAN_FORMAT;
use qrscan_lib::session::commands;
use qrscan_lib::{ImageFile, Phase, ScanError};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn png(name: &str) -> ImageFile {
    ImageFile::from_bytes(name, Some("image/png"), PNG_MAGIC.to_vec())
}

#[tokio::test]
async fn test_file_decode_records_result_without_touching_phase() {
    let harness = Harness::new(FakeMedia::granting(two_cameras()));
    harness
        .engines
        .set_file_outcome(Ok(DecodeEvent::new("WIFI:S:Home;T:WPA;P:secret;;", None)));

    let result = harness.app.scan_from_file(&png("wifi.png")).await.unwrap();
    assert_eq!(result.format.as_deref(), Some(FILE_SCAN_FORMAT));

    let snapshot = harness.app.session().snapshot().await;
    assert_eq!(snapshot.phase(), Phase::Idle);
    assert_eq!(snapshot.state.last_result, Some(result.clone()));
    assert_eq!(snapshot.history, vec![result]);

    let engines = harness.engines.file_engines();
    assert_eq!(engines.len(), 1);
    assert_eq!(engines[0].clears(), 1);
    assert_eq!(harness.engines.live_count(), 0);
}

#[tokio::test]
async fn test_file_decode_failure_leaves_active_session_alone() {
    let harness = Harness::new(FakeMedia::granting(two_cameras()));
    let session = harness.app.session();
    let mut updates = session.subscribe();
    session.start().await.unwrap();
    harness.engines.live().emit("live", None);
    wait_for_snapshot(&mut updates, |snapshot| snapshot.history.len() == 1).await;

    harness.engines.set_file_outcome(Err(EngineError::NotFound));
    let err = harness.app.scan_from_file(&png("blank.png")).await.unwrap_err();
    assert!(matches!(err, ScanError::FileDecode(_)));

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.phase(), Phase::Active);
    assert_eq!(snapshot.state.last_error, None);
    assert_eq!(snapshot.state.last_result.unwrap().text, "live");
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(harness.engines.file_engines()[0].clears(), 1);

    // The live engine was never borrowed for the file
    assert_eq!(harness.engines.live().starts(), 1);
    assert_eq!(harness.engines.live().stops(), 0);
}

#[tokio::test]
async fn test_concurrent_file_decodes_use_separate_engines() {
    let harness = Harness::new(FakeMedia::granting(two_cameras()));
    harness
        .engines
        .set_file_outcome(Ok(DecodeEvent::new("shared", Some("QR_CODE"))));

    let first = png("one.png");
    let second = png("two.png");
    let (a, b) = tokio::join!(
        harness.app.scan_from_file(&first),
        harness.app.scan_from_file(&second)
    );
    assert!(a.is_ok() && b.is_ok());

    let engines = harness.engines.file_engines();
    assert_eq!(engines.len(), 2);
    assert!(engines.iter().all(|engine| engine.clears() == 1));
    // Same payload twice collapses to one history entry
    assert_eq!(harness.app.history().len(), 1);
}

#[tokio::test]
async fn test_invalid_files_never_reach_an_engine() {
    let harness = Harness::new(FakeMedia::granting(two_cameras()));

    let pdf = ImageFile::from_bytes("doc.pdf", Some("application/pdf"), b"%PDF-1.7".to_vec());
    let err = harness.app.scan_from_file(&pdf).await.unwrap_err();
    assert!(matches!(err, ScanError::InvalidFile(_)));
    assert_eq!(err.to_string(), "Please select a valid image file");

    let mut settings = harness.app.settings().current();
    settings.max_file_bytes = 1024 * 1024;
    harness.app.settings().update(settings).unwrap();
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.resize(1024 * 1024 + 1, 0);
    let err = commands::scan_from_file(&harness.app, "big.png".into(), Some("image/png".into()), bytes)
        .await
        .unwrap_err();
    assert_eq!(err, "File size must be less than 1MB");

    assert!(harness.engines.file_engines().is_empty());
}

#[tokio::test]
async fn test_scan_from_path_reads_disk() {
    let harness = Harness::new(FakeMedia::granting(two_cameras()));
    harness
        .engines
        .set_file_outcome(Ok(DecodeEvent::new("+1 555 0100", Some("QR_CODE"))));

    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("phone.png");
    std::fs::write(&path, PNG_MAGIC).unwrap();

    let result = commands::scan_from_path(&harness.app, path.display().to_string())
        .await
        .unwrap();
    assert_eq!(result.text, "+1 555 0100");

    let description = commands::describe_content(result.text);
    assert_eq!(description.label, "Phone Number");
    assert_eq!(description.action.target.as_deref(), Some("tel:+1 555 0100"));

    let missing = commands::scan_from_path(
        &harness.app,
        temp_dir.path().join("gone.png").display().to_string(),
    )
    .await;
    assert!(missing.is_err());
}
