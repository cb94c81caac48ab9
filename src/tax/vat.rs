//! VAT (TVA) calculation: forward from a pre-tax base, reverse from a
//! tax-inclusive total. Amounts are rounded half-up to the cent.

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

/// Round an amount half-up to two decimals
pub fn round_to_cent(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

/// VAT rate as a percentage (e.g. 18 for 18%)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BigDecimal", into = "BigDecimal")]
pub struct VatRate(BigDecimal);

impl VatRate {
    pub fn new(percent: BigDecimal) -> Result<Self, VatError> {
        let rate = Self(percent);
        rate.validate()?;
        Ok(rate)
    }

    pub fn percent(&self) -> &BigDecimal {
        &self.0
    }

    /// Rates must lie within 0..=100
    pub fn validate(&self) -> Result<(), VatError> {
        if self.0 < BigDecimal::from(0) || self.0 > BigDecimal::from(100) {
            return Err(VatError::InvalidRate(format!(
                "VAT rate must be between 0 and 100, got {}",
                self.0
            )));
        }
        Ok(())
    }
}

impl TryFrom<BigDecimal> for VatRate {
    type Error = VatError;

    fn try_from(percent: BigDecimal) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<VatRate> for BigDecimal {
    fn from(rate: VatRate) -> Self {
        rate.0
    }
}

impl Default for VatRate {
    /// Standard UEMOA / CEMAC rate
    fn default() -> Self {
        Self(BigDecimal::from(18))
    }
}

/// Detailed VAT breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatCalculation {
    /// Pre-tax amount (HT)
    pub base_amount: BigDecimal,
    pub rate: VatRate,
    /// Tax amount (TVA)
    pub vat_amount: BigDecimal,
    /// Tax-inclusive amount (TTC)
    pub total_amount: BigDecimal,
}

impl VatCalculation {
    /// Tax = base × rate / 100, rounded half-up to the cent
    pub fn calculate(base_amount: BigDecimal, rate: VatRate) -> Result<Self, VatError> {
        rate.validate()?;

        let vat_amount = round_to_cent(&(&base_amount * rate.percent() / BigDecimal::from(100)));
        let total_amount = &base_amount + &vat_amount;

        Ok(Self {
            base_amount,
            rate,
            vat_amount,
            total_amount,
        })
    }

    /// Base = total × 100 / (100 + rate); the tax is the remainder so
    /// that base + tax equals the given total exactly
    pub fn reverse_calculate(total_amount: BigDecimal, rate: VatRate) -> Result<Self, VatError> {
        rate.validate()?;

        let divisor = BigDecimal::from(100) + rate.percent();
        let base_amount = round_to_cent(&(&total_amount * BigDecimal::from(100) / divisor));
        let vat_amount = &total_amount - &base_amount;

        Ok(Self {
            base_amount,
            rate,
            vat_amount,
            total_amount,
        })
    }
}

/// VAT-related errors
#[derive(Debug, thiserror::Error)]
pub enum VatError {
    #[error("Invalid VAT rate: {0}")]
    InvalidRate(String),
}
