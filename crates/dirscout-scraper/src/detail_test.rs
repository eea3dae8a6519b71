use super::*;
use crate::driver::DriverError;
use crate::testing::FakeDriver;

fn scraper() -> DetailScraper {
    DetailScraper::new(DetailScraperConfig {
        pane_timeout: Duration::from_millis(10),
        settle: Duration::ZERO,
        request_delay: Duration::ZERO,
    })
    .unwrap()
}

fn candidate(name: &str, link: &str) -> BusinessCandidate {
    BusinessCandidate {
        name: name.to_string(),
        link: link.to_string(),
    }
}

fn detail_page(body: &str) -> String {
    format!(r#"<html><body><div role="main">{body}</div></body></html>"#)
}

#[test]
fn parse_record_uses_listed_name_when_page_has_none() {
    let html = detail_page(r#"<button aria-label="Phone: 0803 123 4567"></button>"#);
    let record = scraper().parse_record(
        &html,
        &candidate("Hotel A", "u1"),
        &SearchQuery::for_area("Ikeja"),
    );

    assert_eq!(record.name, "Hotel A");
    assert_eq!(record.phone, "0803 123 4567");
    assert_eq!(record.link, "u1");
    assert_eq!(record.area, "Ikeja");
    assert_eq!(record.search_type, "hotels");
    assert_eq!(record.address, "");
}

#[test]
fn parse_record_ignores_content_outside_the_pane() {
    let html = r#"<html><body>
        <h1>Google Maps</h1>
        <div role="main"><h1 class="DUwDvf">Hotel A</h1></div>
    </body></html>"#;
    let record = scraper().parse_record(
        html,
        &candidate("Listed", "u1"),
        &SearchQuery::for_area("Ikeja"),
    );
    assert_eq!(record.name, "Hotel A");
}

#[test]
fn enrich_skips_page_without_detail_pane() {
    let mut driver = FakeDriver::new().with_page("u1", "<html><body>loading</body></html>");
    let result = scraper()
        .enrich(&mut driver, &candidate("Hotel A", "u1"), &SearchQuery::for_area("Ikeja"))
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn enrich_all_streams_records_and_counts_skips() {
    let mut driver = FakeDriver::new()
        .with_page("u1", &detail_page(r#"<h1 class="DUwDvf">Hotel A</h1>"#))
        .with_navigation_failure("u2")
        .with_page("u3", &detail_page(r#"<h1 class="DUwDvf">Hotel C</h1>"#));
    let candidates = vec![
        candidate("Hotel A", "u1"),
        candidate("Hotel B", "u2"),
        candidate("Hotel C", "u3"),
    ];

    let mut seen = Vec::new();
    let summary = scraper()
        .enrich_all(
            &mut driver,
            &candidates,
            &SearchQuery::for_area("Ikeja"),
            |record| -> Result<(), ScraperError> {
                seen.push(record.name.clone());
                Ok(())
            },
        )
        .unwrap();

    assert_eq!(seen, vec!["Hotel A", "Hotel C"]);
    assert_eq!(
        summary,
        EnrichSummary {
            enriched: 2,
            skipped: 1
        }
    );
    assert_eq!(driver.visits(), ["u1", "u2", "u3"]);
}

#[test]
fn enrich_all_stops_on_session_failure() {
    let mut driver = FakeDriver::new()
        .with_page("u1", &detail_page("<h1>Hotel A</h1>"))
        .with_session_failure("u2");
    let candidates = vec![
        candidate("Hotel A", "u1"),
        candidate("Hotel B", "u2"),
        candidate("Hotel C", "u3"),
    ];

    let mut seen = 0;
    let result = scraper().enrich_all(
        &mut driver,
        &candidates,
        &SearchQuery::for_area("Ikeja"),
        |_| -> Result<(), ScraperError> {
            seen += 1;
            Ok(())
        },
    );

    assert!(matches!(
        result,
        Err(ScraperError::Driver(DriverError::Session(_)))
    ));
    assert_eq!(seen, 1);
    assert_eq!(driver.visits(), ["u1", "u2"]);
}
