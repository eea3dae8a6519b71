use std::time::Duration;

use dirscout_scraper::testing::FakeDriver;
use dirscout_scraper::DriverError;
use dirscout_store::read_all;

use super::*;

const TEMPLATE: &str = "https://wa.example/{phone}";
const INVALID_PAGE: &str =
    "<html><body><p>Phone number shared via url is invalid.</p></body></html>";
const CHAT_PAGE: &str = "<html><body><a>Continue to Chat</a></body></html>";

fn stage() -> VerificationStage {
    VerificationStage::new(
        PhoneNormalizer::new("234"),
        ReachabilityChecker::new(TEMPLATE, Duration::from_millis(10)),
    )
}

fn record(name: &str, phone: &str) -> BusinessRecord {
    BusinessRecord {
        name: name.to_string(),
        phone: phone.to_string(),
        area: "Ikeja".to_string(),
        ..BusinessRecord::default()
    }
}

#[test]
fn known_phone_is_skipped_without_a_check() {
    let mut history = HistorySet::default();
    history.insert("2348031234567".to_string());
    let mut driver = FakeDriver::new();
    let mut sink: Vec<ContactVerificationRecord> = Vec::new();

    let outcome = stage()
        .verify(
            &mut driver,
            &[record("Hotel A", "08031234567")],
            "Ikeja",
            &mut history,
            &mut sink,
        )
        .unwrap();

    assert!(outcome.verified.is_empty());
    assert!(outcome.not_verified.is_empty());
    assert_eq!(outcome.skipped_known, 1);
    assert!(driver.visits().is_empty());
    assert!(sink.is_empty());
}

#[test]
fn failure_phrase_classifies_as_not_verified() {
    let mut driver = FakeDriver::new().with_page("https://wa.example/2348031234567", INVALID_PAGE);
    let mut history = HistorySet::default();
    let mut sink: Vec<ContactVerificationRecord> = Vec::new();

    let outcome = stage()
        .verify(
            &mut driver,
            &[record("Hotel A", "0803 123 4567")],
            "Ikeja",
            &mut history,
            &mut sink,
        )
        .unwrap();

    assert_eq!(outcome.not_verified.len(), 1);
    assert_eq!(outcome.not_verified[0].phone, "2348031234567");
    assert!(outcome.verified.is_empty());
    assert_eq!(sink.len(), 1);
    assert!(!sink[0].verified);
    assert!(history.contains("2348031234567"));
}

#[test]
fn record_without_phone_is_skipped() {
    let mut driver = FakeDriver::new();
    let mut history = HistorySet::default();
    let mut sink: Vec<ContactVerificationRecord> = Vec::new();

    let outcome = stage()
        .verify(
            &mut driver,
            &[record("Hotel A", ""), record("Hotel B", "n/a")],
            "Ikeja",
            &mut history,
            &mut sink,
        )
        .unwrap();

    assert_eq!(outcome.skipped_no_phone, 2);
    assert!(sink.is_empty());
    assert!(history.is_empty());
}

#[test]
fn duplicate_phone_within_one_input_is_checked_once() {
    let mut driver = FakeDriver::new().with_page("https://wa.example/2348031234567", CHAT_PAGE);
    let mut history = HistorySet::default();
    let mut sink: Vec<ContactVerificationRecord> = Vec::new();

    let outcome = stage()
        .verify(
            &mut driver,
            &[
                record("Hotel A", "08031234567"),
                record("Hotel A Annex", "+234 803 123 4567"),
            ],
            "Ikeja",
            &mut history,
            &mut sink,
        )
        .unwrap();

    assert_eq!(outcome.verified.len(), 1);
    assert_eq!(outcome.skipped_known, 1);
    assert_eq!(driver.visits().len(), 1);
}

#[test]
fn page_level_check_failure_is_not_persisted() {
    let mut driver =
        FakeDriver::new().with_navigation_failure("https://wa.example/2348031234567");
    let mut history = HistorySet::default();
    let mut sink: Vec<ContactVerificationRecord> = Vec::new();

    let outcome = stage()
        .verify(
            &mut driver,
            &[record("Hotel A", "08031234567")],
            "Ikeja",
            &mut history,
            &mut sink,
        )
        .unwrap();

    assert_eq!(outcome.check_failures, 1);
    assert!(sink.is_empty());
    assert!(!history.contains("2348031234567"));
}

#[test]
fn session_failure_aborts_but_keeps_earlier_outcomes() {
    let mut driver = FakeDriver::new()
        .with_page("https://wa.example/2348030000001", CHAT_PAGE)
        .with_session_failure("https://wa.example/2348030000002");
    let mut history = HistorySet::default();
    let mut sink: Vec<ContactVerificationRecord> = Vec::new();

    let result = stage().verify(
        &mut driver,
        &[
            record("Hotel A", "08030000001"),
            record("Hotel B", "08030000002"),
            record("Hotel C", "08030000003"),
        ],
        "Ikeja",
        &mut history,
        &mut sink,
    );

    assert!(matches!(
        result,
        Err(VerifyError::Driver(DriverError::Session(_)))
    ));
    assert_eq!(sink.len(), 1);
    assert!(history.contains("2348030000001"));
}

#[test]
fn second_run_over_persisted_stores_checks_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let layout = DataLayout::new(dir.path());
    let normalizer = PhoneNormalizer::new("234");
    let records = [
        record("Hotel A", "08031234567"),
        record("Hotel B", "08090000000"),
    ];

    let mut driver = FakeDriver::new()
        .with_page("https://wa.example/2348031234567", CHAT_PAGE)
        .with_page("https://wa.example/2348090000000", INVALID_PAGE);

    let mut history = HistorySet::load(&layout.verification_paths(), &normalizer).unwrap();
    let mut sink = CsvVerificationSink::new(&layout);
    let first = stage()
        .verify(&mut driver, &records, "Ikeja", &mut history, &mut sink)
        .unwrap();
    assert_eq!(first.verified.len(), 1);
    assert_eq!(first.not_verified.len(), 1);

    let verified: Vec<VerificationRow> = read_all(&layout.verified_path()).unwrap();
    let not_verified: Vec<VerificationRow> = read_all(&layout.not_verified_path()).unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].phone, "2348031234567");
    assert_eq!(verified[0].area, "Ikeja");
    assert_eq!(not_verified.len(), 1);
    assert_eq!(not_verified[0].phone, "2348090000000");

    let mut history = HistorySet::load(&layout.verification_paths(), &normalizer).unwrap();
    let second = stage()
        .verify(&mut driver, &records, "Ikeja", &mut history, &mut sink)
        .unwrap();
    assert!(second.verified.is_empty());
    assert!(second.not_verified.is_empty());
    assert_eq!(second.skipped_known, 2);
    assert_eq!(driver.visits().len(), 2);
}
