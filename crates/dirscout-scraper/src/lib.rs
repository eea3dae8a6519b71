pub mod chrome;
pub mod detail;
pub mod driver;
pub mod error;
pub mod extract;
pub mod list;
pub mod pacing;
pub mod pagination;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use chrome::ChromeDriver;
pub use detail::{DetailScraper, DetailScraperConfig, EnrichSummary};
pub use driver::{DriverError, PageDriver};
pub use error::ScraperError;
pub use extract::{ExtractedFields, Extraction, Field, FieldExtractor, FieldSpec, Locator};
pub use list::{ListScraper, ListScraperConfig};
pub use pacing::RequestPacer;
pub use pagination::{scroll_to_exhaustion, ScrollOutcome, ScrollPolicy};
