//! The post record store file.

use std::path::{Path, PathBuf};

use trendvision_core::PostRecord;

use crate::atomic::write_csv_atomically;
use crate::error::StoreError;
use crate::merge::{merge, MergeReport};
use crate::row::{record_fields, DerivedColumns, RawPostRow, BASE_HEADER, ENRICHMENT_HEADER};

/// Handle to the CSV file holding every ingested post.
#[derive(Debug, Clone)]
pub struct PostStore {
    path: PathBuf,
}

impl PostStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load every record.
    ///
    /// Missing `keyword`/`sentiment` columns load as un-enriched records.
    /// Rows without an id or a parseable `created_at` are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingInput`] if the file does not exist, or
    /// [`StoreError::Csv`] if it cannot be parsed as CSV.
    pub fn load(&self) -> Result<Vec<PostRecord>, StoreError> {
        if !self.exists() {
            return Err(StoreError::MissingInput {
                path: self.path.clone(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StoreError::csv(&self.path, e))?;
        let columns = DerivedColumns::from_headers(
            reader
                .headers()
                .map_err(|e| StoreError::csv(&self.path, e))?,
        );

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<RawPostRow>() {
            let row = row.map_err(|e| StoreError::csv(&self.path, e))?;
            match row.into_record(columns) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    skipped += 1;
                    tracing::warn!(path = %self.path.display(), %reason, "skipping unusable store row");
                }
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            skipped,
            "loaded post store"
        );
        Ok(records)
    }

    /// Load every record, treating an absent file as an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] if the file exists but cannot be parsed.
    pub fn load_or_empty(&self) -> Result<Vec<PostRecord>, StoreError> {
        match self.load() {
            Err(StoreError::MissingInput { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Replace the store content with `records`.
    ///
    /// Enrichment columns are written only when at least one record carries
    /// enrichment, so a freshly ingested store reloads as un-enriched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub fn save(&self, records: &[PostRecord]) -> Result<(), StoreError> {
        let with_enrichment = records
            .iter()
            .any(|r| r.keyword.is_some() || r.sentiment.is_some());

        write_csv_atomically(&self.path, |writer| {
            let mut header: Vec<&str> = BASE_HEADER.to_vec();
            if with_enrichment {
                header.extend(ENRICHMENT_HEADER);
            }
            writer.write_record(&header)?;
            for record in records {
                writer.write_record(record_fields(record, with_enrichment))?;
            }
            Ok(())
        })?;

        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            with_enrichment,
            "saved post store"
        );
        Ok(())
    }

    /// Merge an ingested batch into the stored records and persist the result.
    ///
    /// An absent store is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the existing file cannot be read or the
    /// merged file cannot be written.
    pub fn merge_and_save(&self, incoming: Vec<PostRecord>) -> Result<MergeReport, StoreError> {
        let existing = self.load_or_empty()?;
        let (merged, report) = merge(existing, incoming);
        self.save(&merged)?;
        Ok(report)
    }
}
