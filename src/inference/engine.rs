//! Document inference engine: text in, proposed journal entry out

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::classify::{classify, OperationType};
use super::metadata::{extract_metadata, largest_amount, DocumentMetadata};
use super::proposal::{is_postable, suspense_lines, template_lines, ProposedLine, TemplateInput};
use super::text::{self, contains_any};
use crate::config::EngineConfig;
use crate::tax::VatCalculation;
use crate::types::{JournalCode, JournalEntry, LedgerError, LedgerResult};

static TAX_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:t\.?v\.?a|vat|taxes?)\b").expect("tax keyword pattern"));

/// Result of inferring one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceOutcome {
    pub metadata: DocumentMetadata,
    pub operation: OperationType,
    /// Suggested journal
    pub journal: JournalCode,
    /// Pre-tax amount the proposal is built on
    pub base: BigDecimal,
    pub tax: BigDecimal,
    /// Proposed lines; empty when no positive amount was found
    pub lines: Vec<ProposedLine>,
}

impl InferenceOutcome {
    pub fn has_proposal(&self) -> bool {
        !self.lines.is_empty()
    }

    /// True when any line was posted to suspense
    pub fn needs_review(&self) -> bool {
        self.lines.iter().any(|p| p.needs_review)
    }

    /// Build an unsaved entry from the proposal. The document date is used
    /// when one was found, `fallback_date` otherwise; the invoice number
    /// becomes the piece.
    ///
    /// # Errors
    ///
    /// `InvalidEntry` when there is no proposal, or any error of
    /// [`JournalEntry::validate`].
    pub fn into_journal_entry(self, fallback_date: NaiveDate) -> LedgerResult<JournalEntry> {
        if self.lines.is_empty() {
            return Err(LedgerError::InvalidEntry(
                "Document produced no proposal".to_string(),
            ));
        }

        let mut entry = JournalEntry::new(self.metadata.date.unwrap_or(fallback_date), self.journal);
        entry.piece = self.metadata.invoice_number;
        entry.lines = self.lines.into_iter().map(|p| p.line).collect();
        entry.validate()?;
        Ok(entry)
    }
}

/// Turns document text into a classified, balanced entry proposal
#[derive(Debug, Clone, Default)]
pub struct DocumentInferenceEngine {
    config: EngineConfig,
}

struct Amounts {
    base: BigDecimal,
    tax: BigDecimal,
}

impl DocumentInferenceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Infer a proposal from extracted text, an optional free-text hint and
    /// an optional explicit operation type
    pub fn infer(
        &self,
        raw_text: &str,
        hint: Option<&str>,
        selection: Option<OperationType>,
    ) -> InferenceOutcome {
        let metadata = extract_metadata(raw_text);
        let combined = match hint {
            Some(hint) => format!("{}\n{}", text::normalize(raw_text), text::normalize(hint)),
            None => text::normalize(raw_text),
        };
        let lowercase = combined.to_lowercase();

        let operation = classify(
            &metadata,
            &lowercase,
            self.config.company_name.as_deref(),
            selection,
        );
        let taxed = operation != OperationType::Payroll && TAX_KEYWORD.is_match(&combined);

        let zero = BigDecimal::from(0);
        let Some(amounts) = self.resolve_amounts(&metadata, raw_text, hint, taxed) else {
            tracing::info!(?operation, "no positive amount found, nothing proposed");
            return InferenceOutcome {
                journal: operation.journal(),
                metadata,
                operation,
                base: zero.clone(),
                tax: zero,
                lines: Vec::new(),
            };
        };
        let tax = if operation == OperationType::Payroll {
            zero
        } else {
            amounts.tax
        };

        let label = entry_label(&metadata, operation);
        let third_party = if self.config.track_third_parties {
            match operation {
                OperationType::SaleGoods | OperationType::SaleServices | OperationType::BankReceipt => {
                    metadata.recipient.as_deref()
                }
                OperationType::PurchaseGoods
                | OperationType::PurchaseServices
                | OperationType::BankPayment => metadata.issuer.as_deref(),
                _ => None,
            }
        } else {
            None
        };

        let input = TemplateInput {
            operation,
            base: amounts.base.clone(),
            tax: tax.clone(),
            label: &label,
            third_party,
            social_charges: contains_any(&lowercase, text::SOCIAL_KEYWORDS),
        };
        let accounts = &self.config.accounts;
        let mut journal = operation.journal();
        let mut lines = template_lines(&input, accounts);
        if !is_postable(&lines) {
            tracing::warn!(?operation, "template did not balance, falling back to suspense");
            journal = JournalCode::Miscellaneous;
            lines = suspense_lines(&(&amounts.base + &tax), &label, accounts);
            if !is_postable(&lines) {
                tracing::warn!("suspense account not configured, nothing proposed");
                lines.clear();
            }
        }

        tracing::info!(
            ?operation,
            journal = %journal,
            base = %amounts.base,
            tax = %tax,
            lines = lines.len(),
            "document inferred"
        );

        InferenceOutcome {
            metadata,
            operation,
            journal,
            base: amounts.base,
            tax,
            lines,
        }
    }

    // Base: HT, then the line items, then TTC (net of TVA, or reverse
    // computed when the document mentions tax), then the largest number.
    // Tax: explicit TVA, then base × rate when taxed, else zero.
    fn resolve_amounts(
        &self,
        metadata: &DocumentMetadata,
        raw_text: &str,
        hint: Option<&str>,
        taxed: bool,
    ) -> Option<Amounts> {
        let zero = BigDecimal::from(0);
        let totals = &metadata.totals;
        // A tax total at or above the tax-inclusive total was misread
        let stated_tax = totals
            .tva
            .clone()
            .filter(|tva| totals.ttc.as_ref().map_or(true, |ttc| tva < ttc));

        let (base, derived_tax) = if let Some(ht) = &totals.ht {
            (ht.clone(), None)
        } else if let Some(sum) = metadata.line_items_total() {
            (sum, None)
        } else if let Some(ttc) = &totals.ttc {
            match (&stated_tax, taxed) {
                (Some(tva), _) => (ttc - tva, None),
                (None, true) => {
                    match VatCalculation::reverse_calculate(ttc.clone(), self.config.tax_rate.clone()) {
                        Ok(calculation) => (calculation.base_amount, Some(calculation.vat_amount)),
                        Err(err) => {
                            tracing::warn!(error = %err, "reverse VAT failed, using TTC as base");
                            (ttc.clone(), Some(zero.clone()))
                        }
                    }
                }
                (None, false) => (ttc.clone(), None),
            }
        } else {
            (largest_amount(raw_text, hint)?, None)
        };

        if base <= zero {
            return None;
        }

        let tax = match (stated_tax.or(derived_tax), taxed) {
            (Some(tax), _) => tax,
            (None, true) => {
                match VatCalculation::calculate(base.clone(), self.config.tax_rate.clone()) {
                    Ok(calculation) => calculation.vat_amount,
                    Err(err) => {
                        tracing::warn!(error = %err, "VAT calculation failed, no tax line");
                        zero
                    }
                }
            }
            (None, false) => zero,
        };

        tracing::debug!(base = %base, tax = %tax, "amounts resolved");
        Some(Amounts { base, tax })
    }
}

fn entry_label(metadata: &DocumentMetadata, operation: OperationType) -> String {
    if let Some(subject) = &metadata.subject {
        return subject.clone();
    }
    let prefix = match operation {
        OperationType::SaleGoods | OperationType::SaleServices => "Vente",
        OperationType::PurchaseGoods | OperationType::PurchaseServices => "Achat",
        OperationType::Payroll => "Salaires",
        OperationType::BankPayment => "Règlement fournisseur",
        OperationType::BankReceipt => "Encaissement client",
        OperationType::Miscellaneous => "Opération à régulariser",
    };
    match &metadata.invoice_number {
        Some(number) => format!("{prefix} {number}"),
        None => prefix.to_string(),
    }
}
