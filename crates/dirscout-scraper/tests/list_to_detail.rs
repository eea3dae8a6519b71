//! Listing feeds detail extraction through one shared driver session.

use std::time::Duration;

use dirscout_core::{BusinessRecord, SearchQuery};
use dirscout_scraper::testing::FakeDriver;
use dirscout_scraper::{
    DetailScraper, DetailScraperConfig, ListScraper, ListScraperConfig, ScraperError,
    ScrollPolicy,
};

fn list_scraper() -> ListScraper {
    ListScraper::new(ListScraperConfig {
        search_base_url: "https://maps.example/search/".to_string(),
        feed_timeout: Duration::from_millis(10),
        scroll: ScrollPolicy {
            pause: Duration::ZERO,
            max_iterations: 5,
        },
    })
    .unwrap()
}

fn detail_scraper() -> DetailScraper {
    DetailScraper::new(DetailScraperConfig {
        pane_timeout: Duration::from_millis(10),
        settle: Duration::ZERO,
        request_delay: Duration::ZERO,
    })
    .unwrap()
}

#[test]
fn listed_candidates_are_enriched_in_feed_order() {
    let query = SearchQuery::for_area("Lekki");
    let lister = list_scraper();
    let search_url = lister.search_url(&query);

    let feed = r#"<html><body><div role="feed">
        <div role="article"><h3>Hotel A</h3><a href="https://maps.example/maps/place/a"></a></div>
        <div role="article"><h3></h3><a href="https://maps.example/maps/place/x"></a></div>
        <div role="article"><h3>Hotel B</h3><a href="https://maps.example/maps/place/b"></a></div>
    </div></body></html>"#;
    let page_a = r#"<html><body><div role="main">
        <h1 class="DUwDvf">Hotel A</h1>
        <button aria-label="Phone: 0803 000 0001"></button>
        <a data-item-id="authority" href="https://hotel-a.ng"></a>
    </div></body></html>"#;
    let page_b = r#"<html><body><div role="main">
        <h1 class="DUwDvf">Hotel B</h1>
        <div class="Io6YTe">12 Admiralty Way</div>
    </div></body></html>"#;

    let mut driver = FakeDriver::new()
        .with_page(&search_url, feed)
        .with_page("https://maps.example/maps/place/a", page_a)
        .with_page("https://maps.example/maps/place/b", page_b);

    let candidates = lister.list_businesses(&mut driver, &query).unwrap();
    assert_eq!(candidates.len(), 2);

    let mut records: Vec<BusinessRecord> = Vec::new();
    detail_scraper()
        .enrich_all(&mut driver, &candidates, &query, |r| -> Result<(), ScraperError> {
            records.push(r.clone());
            Ok(())
        })
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Hotel A");
    assert_eq!(records[0].phone, "0803 000 0001");
    assert_eq!(records[0].website, "https://hotel-a.ng");
    assert_eq!(records[1].name, "Hotel B");
    assert_eq!(records[1].address, "12 Admiralty Way");
    assert_eq!(records[1].phone, "");
}

#[test]
fn dropping_the_driver_releases_it() {
    let driver = FakeDriver::new();
    let released = driver.released_flag();
    assert!(!released.load(std::sync::atomic::Ordering::SeqCst));
    drop(driver);
    assert!(released.load(std::sync::atomic::Ordering::SeqCst));
}
