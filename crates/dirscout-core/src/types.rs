use serde::{Deserialize, Serialize};

/// Business categories probed when resolving input files without an explicit type.
pub const KNOWN_SEARCH_TYPES: [&str; 5] = ["hotels", "restaurants", "banks", "pharmacies", "schools"];

pub const DEFAULT_SEARCH_TYPE: &str = "hotels";
pub const DEFAULT_CITY: &str = "Lagos";
pub const DEFAULT_COUNTRY: &str = "Nigeria";

/// One directory search: what to look for and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search_type: String,
    pub area: String,
    pub city: String,
    pub country: String,
}

impl SearchQuery {
    /// Query for `area` with the default type, city and country.
    #[must_use]
    pub fn for_area(area: &str) -> Self {
        Self {
            search_type: DEFAULT_SEARCH_TYPE.to_string(),
            area: area.to_string(),
            city: DEFAULT_CITY.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Free-text query submitted to the directory search box.
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "{} near {}, {}, {}",
            self.search_type, self.area, self.city, self.country
        )
    }

    #[must_use]
    pub fn area_slug(&self) -> String {
        area_slug(&self.area)
    }
}

/// Directory-safe form of an area name: spaces become `_`, commas are
/// dropped, everything is lower-cased.
#[must_use]
pub fn area_slug(area: &str) -> String {
    area.trim().replace(' ', "_").replace(',', "").to_lowercase()
}

/// A listing found on the search results feed. `link` is unique per query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessCandidate {
    pub name: String,
    pub link: String,
}

/// Row of the list store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRow {
    pub name: String,
    pub link: String,
    #[serde(default)]
    pub search_type: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl ListRow {
    #[must_use]
    pub fn new(candidate: &BusinessCandidate, query: &SearchQuery) -> Self {
        Self {
            name: candidate.name.clone(),
            link: candidate.link.clone(),
            search_type: query.search_type.clone(),
            area: query.area.clone(),
            city: query.city.clone(),
            country: query.country.clone(),
        }
    }

    /// Candidate for the detail stage, or `None` when the row lacks a name or link.
    #[must_use]
    pub fn to_candidate(&self) -> Option<BusinessCandidate> {
        let name = self.name.trim();
        let link = self.link.trim();
        if name.is_empty() || link.is_empty() {
            return None;
        }
        Some(BusinessCandidate {
            name: name.to_string(),
            link: link.to_string(),
        })
    }
}

/// Row of the detail store. Missing attributes are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, alias = "image")]
    pub image_url: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub search_type: String,
}

/// Row of the verified and not-verified stores. `phone` is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRow {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image: String,
}

impl VerificationRow {
    /// Builds the row for `record` with an already normalized `phone`.
    ///
    /// `area` falls back to the record's own area when empty.
    #[must_use]
    pub fn from_record(record: &BusinessRecord, area: &str, phone: String) -> Self {
        let area = if area.is_empty() { &record.area } else { area };
        Self {
            area: area.to_string(),
            name: record.name.clone(),
            address: record.address.clone(),
            phone,
            website: record.website.clone(),
            email: record.email.clone(),
            image: record.image_url.clone(),
        }
    }
}

/// Outcome of one reachability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactVerificationRecord {
    pub row: VerificationRow,
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_text_joins_all_parts() {
        let q = SearchQuery::for_area("Victoria Island");
        assert_eq!(q.text(), "hotels near Victoria Island, Lagos, Nigeria");
    }

    #[test]
    fn area_slug_strips_commas_and_lowercases() {
        assert_eq!(area_slug("Victoria Island, Lekki"), "victoria_island_lekki");
        assert_eq!(area_slug("  Ikeja "), "ikeja");
    }

    #[test]
    fn list_row_without_link_is_not_a_candidate() {
        let row = ListRow {
            name: "Hotel A".into(),
            link: "  ".into(),
            search_type: "hotels".into(),
            area: "Ikeja".into(),
            city: "Lagos".into(),
            country: "Nigeria".into(),
        };
        assert!(row.to_candidate().is_none());
    }

    #[test]
    fn business_record_reads_legacy_image_column() {
        let json = r#"{"name":"Hotel A","image":"https://img/a.jpg","link":"u1"}"#;
        let record: BusinessRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.image_url, "https://img/a.jpg");
        assert_eq!(record.address, "");
    }

    #[test]
    fn verification_row_prefers_explicit_area() {
        let record = BusinessRecord {
            name: "Hotel A".into(),
            area: "Old".into(),
            image_url: "img".into(),
            ..BusinessRecord::default()
        };
        let row = VerificationRow::from_record(&record, "Ikeja", "2348031234567".into());
        assert_eq!(row.area, "Ikeja");
        assert_eq!(row.image, "img");

        let row = VerificationRow::from_record(&record, "", "2348031234567".into());
        assert_eq!(row.area, "Old");
    }
}
