//! Canonical phone-number form used for dedup, storage and verification URLs.
//!
//! Canonical numbers are digits only and always start with the configured
//! country calling code. They never carry a leading `+`.

use std::sync::LazyLock;

use regex::Regex;

static NON_DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D").expect("valid regex"));

/// Rewrites raw, free-text phone numbers into canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNormalizer {
    country_code: String,
}

impl PhoneNormalizer {
    /// Creates a normalizer for `country_code`. A leading `+` and any other
    /// non-digit characters are dropped from the code.
    #[must_use]
    pub fn new(country_code: &str) -> Self {
        Self {
            country_code: NON_DIGIT_RE.replace_all(country_code, "").into_owned(),
        }
    }

    #[must_use]
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Normalizes `raw` into canonical form.
    ///
    /// Total: input with no digits yields an empty string, which callers treat
    /// as "no phone". Canonical input is returned unchanged.
    ///
    /// - a leading trunk `0` is replaced by the country code
    /// - a number already starting with the country code is kept as is
    ///   (this covers `+CC...` input since the `+` is stripped first)
    /// - anything else gets the country code prepended
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let digits = NON_DIGIT_RE.replace_all(raw, "");
        if digits.is_empty() {
            return String::new();
        }

        if let Some(national) = digits.strip_prefix('0') {
            format!("{}{national}", self.country_code)
        } else if digits.starts_with(self.country_code.as_str()) {
            digits.into_owned()
        } else {
            format!("{}{digits}", self.country_code)
        }
    }
}

#[cfg(test)]
#[path = "phone_test.rs"]
mod tests;
