#![deny(warnings)]

//! Persistence layer: a single JSON document holding the deal book.
//!
//! The store has list-replace semantics: callers always round-trip whole
//! collections (load everything, swap a collection, save everything). There
//! is no per-record update contract, which keeps sync between clients
//! trivial at the deal-book sizes this tool sees. A missing or unreadable
//! document reads as empty rather than failing the caller.

use chrono::NaiveDate;
use deal_core::DealParameters;
use deal_forecast::Country;
use deal_fx::Currency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Where a deal stands in the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealType {
    Signed,
    Potential,
}

/// A stored deal: the evaluation parameters plus book-keeping fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealRecord {
    pub id: String,
    pub company_name: String,
    pub deal_type: DealType,
    pub added_on: NaiveDate,
    /// Currency the deal was negotiated in.
    pub deal_currency: Currency,
    /// Currency results are compared/displayed in.
    pub comparison_currency: Currency,
    pub parameters: DealParameters,
    /// Display string for the covered territories, e.g. "DE, FR, UK".
    pub countries_display: String,
}

/// A saved territory selection that can seed a deal's forecast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: String,
    pub name: String,
    pub entries: Vec<Country>,
}

/// The whole on-disk document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub deals: Vec<DealRecord>,
    #[serde(default)]
    pub forecasts: Vec<ForecastRecord>,
}

/// Errors from store I/O.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed JSON store.
#[derive(Clone, Debug)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Default store location relative to the working directory.
    pub fn default_path() -> &'static str {
        "./saves/deal-book.json"
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file or one that fails to parse reads
    /// as an empty document; only unexpected I/O failures surface as errors.
    pub fn load(&self) -> Result<StoreDocument, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no deal book yet, starting empty");
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable deal book, treating as empty");
                Ok(StoreDocument::default())
            }
        }
    }

    /// Replace the deal collection wholesale. Returns the stored count.
    pub fn replace_deals(&self, deals: Vec<DealRecord>) -> Result<usize, StoreError> {
        let mut doc = self.load()?;
        doc.deals = deals;
        self.save(&doc)?;
        info!(count = doc.deals.len(), path = %self.path.display(), "deal collection replaced");
        Ok(doc.deals.len())
    }

    /// Replace the forecast collection wholesale. Returns the stored count.
    pub fn replace_forecasts(&self, forecasts: Vec<ForecastRecord>) -> Result<usize, StoreError> {
        let mut doc = self.load()?;
        doc.forecasts = forecasts;
        self.save(&doc)?;
        info!(count = doc.forecasts.len(), path = %self.path.display(), "forecast collection replaced");
        Ok(doc.forecasts.len())
    }

    fn save(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}
