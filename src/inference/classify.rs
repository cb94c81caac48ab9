//! Operation type classification

use serde::{Deserialize, Serialize};

use super::metadata::DocumentMetadata;
use super::text::{self, contains_any};
use crate::types::JournalCode;

/// Business operation a document records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    SaleGoods,
    SaleServices,
    PurchaseGoods,
    PurchaseServices,
    Payroll,
    /// Outgoing bank movement settling a supplier
    BankPayment,
    /// Incoming bank movement from a customer
    BankReceipt,
    /// Posted to suspense for manual correction
    Miscellaneous,
}

impl OperationType {
    /// Journal the entry should be posted to
    pub fn journal(self) -> JournalCode {
        match self {
            Self::SaleGoods | Self::SaleServices => JournalCode::Sales,
            Self::PurchaseGoods | Self::PurchaseServices => JournalCode::Purchases,
            Self::Payroll => JournalCode::Payroll,
            Self::BankPayment | Self::BankReceipt => JournalCode::Bank,
            Self::Miscellaneous => JournalCode::Miscellaneous,
        }
    }

    pub fn is_sale(self) -> bool {
        matches!(self, Self::SaleGoods | Self::SaleServices)
    }

    pub fn is_purchase(self) -> bool {
        matches!(self, Self::PurchaseGoods | Self::PurchaseServices)
    }
}

fn sale(services: bool) -> OperationType {
    if services {
        OperationType::SaleServices
    } else {
        OperationType::SaleGoods
    }
}

fn purchase(services: bool) -> OperationType {
    if services {
        OperationType::PurchaseServices
    } else {
        OperationType::PurchaseGoods
    }
}

fn mentions(party: Option<&String>, company: &str) -> bool {
    party.is_some_and(|p| p.to_lowercase().contains(company))
}

/// Decide the operation type.
///
/// First rule that applies wins: explicit selection, own company name
/// against issuer/recipient, sale then purchase keywords, payroll
/// keywords, bank keywords, and finally a service sale.
pub fn classify(
    metadata: &DocumentMetadata,
    lowercase_text: &str,
    company_name: Option<&str>,
    selection: Option<OperationType>,
) -> OperationType {
    if let Some(selected) = selection {
        return selected;
    }

    let services = contains_any(lowercase_text, text::SERVICE_KEYWORDS)
        || metadata
            .subject
            .as_ref()
            .is_some_and(|s| contains_any(&s.to_lowercase(), text::SERVICE_KEYWORDS));

    if let Some(company) = company_name.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty()) {
        let issued = mentions(metadata.issuer.as_ref(), &company);
        let received = mentions(metadata.recipient.as_ref(), &company);
        if received && !issued {
            return purchase(services);
        }
        if issued && !received {
            return sale(services);
        }
    }

    if contains_any(lowercase_text, text::SALE_KEYWORDS) {
        return sale(services);
    }
    if contains_any(lowercase_text, text::PURCHASE_KEYWORDS) {
        return purchase(services);
    }
    if contains_any(lowercase_text, text::PAYROLL_KEYWORDS) {
        return OperationType::Payroll;
    }
    if contains_any(lowercase_text, text::BANK_KEYWORDS) {
        return if contains_any(lowercase_text, text::SETTLEMENT_KEYWORDS) {
            OperationType::BankPayment
        } else {
            OperationType::BankReceipt
        };
    }

    OperationType::SaleServices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::metadata::extract_metadata;
    use rstest::rstest;

    fn classify_text(text: &str, company: Option<&str>) -> OperationType {
        let metadata = extract_metadata(text);
        classify(&metadata, &text.to_lowercase(), company, None)
    }

    #[rstest]
    #[case("Facture\nClient : Alpha\nTotal 10 000", OperationType::SaleGoods)]
    #[case("Facture\nClient : Alpha\nPrestation de conseil", OperationType::SaleServices)]
    #[case("Facture fournisseur\nCiment 50 sacs", OperationType::PurchaseGoods)]
    #[case("Bulletin de paie\nSalaire brut 80 000", OperationType::Payroll)]
    #[case("Avis de virement\nRèglement facture 12", OperationType::BankPayment)]
    #[case("Avis de virement reçu 50 000", OperationType::BankReceipt)]
    #[case("Note interne", OperationType::SaleServices)]
    fn test_keyword_classification(#[case] text: &str, #[case] expected: OperationType) {
        assert_eq!(classify_text(text, None), expected);
    }

    #[test]
    fn test_company_name_decides_direction() {
        let text = "SARL Kora\nFacture N° 88\nClient : Boulangerie Awa\nLivraison farine";
        assert_eq!(classify_text(text, Some("Kora")), OperationType::SaleGoods);

        let text = "Imprimerie Sahel\nFacture N° 12\nClient : SARL Kora\nMaintenance copieur";
        assert_eq!(classify_text(text, Some("kora")), OperationType::PurchaseServices);
    }

    #[test]
    fn test_explicit_selection_wins() {
        let metadata = extract_metadata("Facture\nClient : Alpha");
        let selected = classify(&metadata, "facture client", None, Some(OperationType::PurchaseGoods));
        assert_eq!(selected, OperationType::PurchaseGoods);
    }

    #[test]
    fn test_journal_suggestion() {
        assert_eq!(OperationType::SaleServices.journal(), JournalCode::Sales);
        assert_eq!(OperationType::PurchaseGoods.journal(), JournalCode::Purchases);
        assert_eq!(OperationType::BankReceipt.journal(), JournalCode::Bank);
        assert_eq!(OperationType::Miscellaneous.journal(), JournalCode::Miscellaneous);
    }
}
