//! Engine and report configuration

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::reports::BalanceFormat;
use crate::tax::{VatError, VatRate};

/// Account codes used by the posting templates, per operation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultAccounts {
    pub receivable: String,
    pub payable: String,
    pub revenue_goods: String,
    pub revenue_services: String,
    pub expense_goods: String,
    pub expense_services: String,
    pub vat_collected: String,
    pub vat_deductible: String,
    pub personnel_expense: String,
    pub social_contributions: String,
    pub personnel_payable: String,
    pub bank: String,
    /// Suspense account for proposals that need manual correction
    pub suspense: String,
}

impl Default for DefaultAccounts {
    /// SYSCOHADA defaults
    fn default() -> Self {
        Self {
            receivable: "411".to_string(),
            payable: "401".to_string(),
            revenue_goods: "701".to_string(),
            revenue_services: "706".to_string(),
            expense_goods: "601".to_string(),
            expense_services: "605".to_string(),
            vat_collected: "4431".to_string(),
            vat_deductible: "4452".to_string(),
            personnel_expense: "661".to_string(),
            social_contributions: "431".to_string(),
            personnel_payable: "422".to_string(),
            bank: "521".to_string(),
            suspense: "471".to_string(),
        }
    }
}

/// Document inference configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Own company name, used to tell purchases from sales
    pub company_name: Option<String>,
    pub tax_rate: VatRate,
    pub accounts: DefaultAccounts,
    /// Tag receivable/payable lines with the counterparty name
    pub track_third_parties: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            company_name: None,
            tax_rate: VatRate::default(),
            accounts: DefaultAccounts::default(),
            track_third_parties: false,
        }
    }
}

impl EngineConfig {
    pub fn with_company(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn with_tax_rate(mut self, percent: BigDecimal) -> Result<Self, VatError> {
        self.tax_rate = VatRate::new(percent)?;
        Ok(self)
    }
}

/// Report presentation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub format: BalanceFormat,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Path to a JSON statement mapping document
    pub statement_mapping: Option<PathBuf>,
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub report: ReportSettings,
}

impl Settings {
    /// Load from an optional file, then `COMPTA__*` environment overrides
    /// (e.g. `COMPTA__ENGINE__COMPANY_NAME`)
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or does not deserialize.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder
            .add_source(config::Environment::with_prefix("COMPTA").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Parse settings from a TOML string
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Read the statement mapping document named in the report settings
    pub fn statement_mapping_document(&self) -> Option<String> {
        let path = self.report.statement_mapping.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "statement mapping unreadable");
                None
            }
        }
    }
}
