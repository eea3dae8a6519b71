//! Verification stage: normalize, dedup against history, check, persist.
//!
//! Every checked number is persisted and added to the history before the
//! next record is looked at, so an interrupted run keeps its progress and a
//! number repeated within one input is only checked once.

use std::path::PathBuf;

use dirscout_core::{BusinessRecord, ContactVerificationRecord, PhoneNormalizer, VerificationRow};
use dirscout_scraper::PageDriver;
use dirscout_store::{append_row, DataLayout, HistorySet};

use crate::error::VerifyError;
use crate::reachability::ReachabilityChecker;

/// Destination for verification outcomes, written one at a time.
pub trait VerificationSink {
    /// # Errors
    ///
    /// Returns [`VerifyError`] if the outcome cannot be persisted.
    fn record(&mut self, outcome: &ContactVerificationRecord) -> Result<(), VerifyError>;
}

impl VerificationSink for Vec<ContactVerificationRecord> {
    fn record(&mut self, outcome: &ContactVerificationRecord) -> Result<(), VerifyError> {
        self.push(outcome.clone());
        Ok(())
    }
}

/// Appends outcomes to the verified or not-verified CSV store.
#[derive(Debug, Clone)]
pub struct CsvVerificationSink {
    verified: PathBuf,
    not_verified: PathBuf,
}

impl CsvVerificationSink {
    #[must_use]
    pub fn new(layout: &DataLayout) -> Self {
        Self {
            verified: layout.verified_path(),
            not_verified: layout.not_verified_path(),
        }
    }
}

impl VerificationSink for CsvVerificationSink {
    fn record(&mut self, outcome: &ContactVerificationRecord) -> Result<(), VerifyError> {
        let path = if outcome.verified {
            &self.verified
        } else {
            &self.not_verified
        };
        append_row(path, &outcome.row)?;
        Ok(())
    }
}

/// Result of one verification pass. Only newly checked numbers appear in
/// the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub verified: Vec<VerificationRow>,
    pub not_verified: Vec<VerificationRow>,
    pub skipped_no_phone: usize,
    pub skipped_known: usize,
    /// Numbers whose check failed at page level; not persisted, retried next run.
    pub check_failures: usize,
}

#[derive(Debug, Clone)]
pub struct VerificationStage {
    normalizer: PhoneNormalizer,
    checker: ReachabilityChecker,
}

impl VerificationStage {
    #[must_use]
    pub fn new(normalizer: PhoneNormalizer, checker: ReachabilityChecker) -> Self {
        Self {
            normalizer,
            checker,
        }
    }

    /// Checks every record whose phone is new to `history`.
    ///
    /// `area` labels the persisted rows; when empty each record's own area
    /// is used.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Driver`] on a session-level driver failure and
    /// [`VerifyError::Store`] if an outcome cannot be appended. Outcomes
    /// recorded before the failure stay persisted.
    pub fn verify<D, S>(
        &self,
        driver: &mut D,
        records: &[BusinessRecord],
        area: &str,
        history: &mut HistorySet,
        sink: &mut S,
    ) -> Result<VerificationOutcome, VerifyError>
    where
        D: PageDriver + ?Sized,
        S: VerificationSink + ?Sized,
    {
        let mut outcome = VerificationOutcome::default();

        for record in records {
            let phone = self.normalizer.normalize(&record.phone);
            if phone.is_empty() {
                tracing::warn!(name = %record.name, "record has no usable phone, skipping");
                outcome.skipped_no_phone += 1;
                continue;
            }
            if history.contains(&phone) {
                tracing::debug!(%phone, "already verified, skipping");
                outcome.skipped_known += 1;
                continue;
            }

            let reachable = match self.checker.check(driver, &phone) {
                Ok(reachable) => reachable,
                Err(e) if e.is_page_level() => {
                    tracing::warn!(%phone, error = %e, "reachability check failed, will retry next run");
                    outcome.check_failures += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let result = ContactVerificationRecord {
                row: VerificationRow::from_record(record, area, phone.clone()),
                verified: reachable,
            };
            sink.record(&result)?;
            history.insert(phone);

            tracing::info!(
                name = %record.name,
                phone = %result.row.phone,
                verified = reachable,
                "number checked"
            );
            if reachable {
                outcome.verified.push(result.row);
            } else {
                outcome.not_verified.push(result.row);
            }
        }

        tracing::info!(
            verified = outcome.verified.len(),
            not_verified = outcome.not_verified.len(),
            skipped_no_phone = outcome.skipped_no_phone,
            skipped_known = outcome.skipped_known,
            check_failures = outcome.check_failures,
            "verification finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "stage_test.rs"]
mod tests;
