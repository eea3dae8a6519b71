//! Declarative field extraction over rendered HTML.
//!
//! A [`FieldSpec`] lists, per field, the locators to try in priority order.
//! The first locator producing a non-empty value wins; a field nothing
//! resolves for is the empty string. Fields never affect each other.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Address,
    Phone,
    Email,
    Website,
    Image,
    Link,
}

/// How a value is read from a located element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Visible text, whitespace-collapsed.
    Text,
    /// Value of the named attribute.
    Attribute(String),
    /// First whitespace-separated text token that looks like an email
    /// address. Best effort.
    EmailToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    /// `None` reads from the extraction scope itself.
    pub selector: Option<String>,
    pub extraction: Extraction,
    pub strip_prefix: Option<String>,
}

impl Locator {
    #[must_use]
    pub fn text(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            extraction: Extraction::Text,
            strip_prefix: None,
        }
    }

    #[must_use]
    pub fn attr(selector: &str, attribute: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            extraction: Extraction::Attribute(attribute.to_string()),
            strip_prefix: None,
        }
    }

    /// Email-looking token anywhere in the scope's text.
    #[must_use]
    pub fn email_in_scope() -> Self {
        Self {
            selector: None,
            extraction: Extraction::EmailToken,
            strip_prefix: None,
        }
    }

    #[must_use]
    pub fn strip(mut self, prefix: &str) -> Self {
        self.strip_prefix = Some(prefix.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub locators: Vec<Locator>,
}

impl FieldSpec {
    #[must_use]
    pub fn new(field: Field, locators: Vec<Locator>) -> Self {
        Self { field, locators }
    }
}

/// Field table for a business detail pane.
#[must_use]
pub fn detail_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            Field::Name,
            vec![
                Locator::text("h1.DUwDvf"),
                Locator::text("span.iD2gKb"),
                Locator::text("div.qBF1Pd span"),
                Locator::text("div.qBF1Pd"),
                Locator::text("h1"),
                Locator::text("h3"),
                Locator::text(r#"div[role="heading"]"#),
            ],
        ),
        FieldSpec::new(
            Field::Address,
            vec![
                Locator::text(r#"button[data-item-id="address"] div.Io6YTe"#),
                Locator::text(r#"button[data-item-id*="address"]"#),
                Locator::text("div.Io6YTe"),
            ],
        ),
        FieldSpec::new(
            Field::Phone,
            vec![
                Locator::attr(r#"button[aria-label^="Phone:"]"#, "aria-label").strip("Phone:"),
                Locator::text(r#"button[data-item-id*="phone"]"#),
            ],
        ),
        FieldSpec::new(
            Field::Website,
            vec![
                Locator::attr(r#"a[aria-label^="Website:"]"#, "href"),
                Locator::attr(r#"a[data-item-id*="authority"]"#, "href"),
            ],
        ),
        FieldSpec::new(
            Field::Email,
            vec![
                Locator::attr(r#"a[href^="mailto:"]"#, "href").strip("mailto:"),
                Locator::email_in_scope(),
            ],
        ),
        FieldSpec::new(
            Field::Image,
            vec![
                Locator::attr(r#"img[alt*="photo"]"#, "src"),
                Locator::attr(r#"img[alt*="image"]"#, "src"),
                Locator::attr("img", "src"),
            ],
        ),
    ]
}

/// Field table for one entry of the search results feed.
#[must_use]
pub fn list_item_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            Field::Name,
            vec![
                Locator::text("h3"),
                Locator::text(r#"[role="heading"]"#),
                Locator::text("div.qBF1Pd span"),
                Locator::text("div.qBF1Pd"),
                Locator::attr("a.hfpxzc", "aria-label"),
            ],
        ),
        FieldSpec::new(
            Field::Link,
            vec![
                Locator::attr(r#"a[href*="/maps/place/"]"#, "href"),
                Locator::attr("a.hfpxzc", "href"),
            ],
        ),
    ]
}

struct CompiledLocator {
    selector: Option<Selector>,
    extraction: Extraction,
    strip_prefix: Option<String>,
}

struct CompiledField {
    field: Field,
    locators: Vec<CompiledLocator>,
}

/// Compiled form of a field table, reusable across pages.
pub struct FieldExtractor {
    fields: Vec<CompiledField>,
}

impl std::fmt::Debug for FieldExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldExtractor")
            .field(
                "fields",
                &self.fields.iter().map(|c| c.field).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Parses a CSS selector, mapping failures to [`ScraperError::InvalidSelector`].
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] if `selector` is not valid CSS.
pub fn compile_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector).map_err(|e| ScraperError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

impl FieldExtractor {
    /// Compiles every selector in `specs` up front.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] for the first selector that
    /// does not parse.
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, ScraperError> {
        let fields = specs
            .into_iter()
            .map(|spec| {
                let locators = spec
                    .locators
                    .into_iter()
                    .map(|loc| {
                        Ok(CompiledLocator {
                            selector: loc.selector.as_deref().map(compile_selector).transpose()?,
                            extraction: loc.extraction,
                            strip_prefix: loc.strip_prefix,
                        })
                    })
                    .collect::<Result<Vec<_>, ScraperError>>()?;
                Ok(CompiledField {
                    field: spec.field,
                    locators,
                })
            })
            .collect::<Result<Vec<_>, ScraperError>>()?;
        Ok(Self { fields })
    }

    /// Resolves every field against the subtree rooted at `scope`.
    #[must_use]
    pub fn extract(&self, scope: ElementRef<'_>) -> ExtractedFields {
        let values = self
            .fields
            .iter()
            .map(|compiled| {
                let value = compiled
                    .locators
                    .iter()
                    .find_map(|loc| resolve(scope, loc))
                    .unwrap_or_default();
                (compiled.field, value)
            })
            .collect();
        ExtractedFields { values }
    }

    /// Resolves every field against a whole document.
    #[must_use]
    pub fn extract_document(&self, document: &Html) -> ExtractedFields {
        self.extract(document.root_element())
    }
}

fn resolve(scope: ElementRef<'_>, locator: &CompiledLocator) -> Option<String> {
    let read = |el: ElementRef<'_>| -> Option<String> {
        let raw = match &locator.extraction {
            Extraction::Text => collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")),
            Extraction::Attribute(name) => el.value().attr(name)?.trim().to_string(),
            Extraction::EmailToken => email_token(el)?,
        };
        let value = match &locator.strip_prefix {
            Some(prefix) => raw
                .strip_prefix(prefix.as_str())
                .unwrap_or(&raw)
                .trim()
                .to_string(),
            None => raw,
        };
        (!value.is_empty()).then_some(value)
    };

    match &locator.selector {
        Some(selector) => scope.select(selector).find_map(read),
        None => read(scope),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn email_token(el: ElementRef<'_>) -> Option<String> {
    el.text()
        .flat_map(str::split_whitespace)
        .map(|token| token.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')' | '<' | '>')))
        .find(|token| token.contains('@') && token.contains('.'))
        .map(str::to_string)
}

/// Per-field results of one extraction. Unresolved fields read as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    values: HashMap<Field, String>,
}

impl ExtractedFields {
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Takes ownership of a field's value, leaving `""` behind.
    pub fn take(&mut self, field: Field) -> String {
        self.values.remove(&field).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
