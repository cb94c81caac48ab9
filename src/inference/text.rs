//! Text normalization, amount parsing and keyword tables

use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

/// Amount token: space or `.` as thousands separators, `,` as decimal separator
pub(crate) const AMOUNT: &str = r"\d{1,3}(?:[ .]\d{3})+(?:,\d+)?|\d+(?:,\d+)?";

static AMOUNT_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(AMOUNT).expect("amount pattern"));

/// Replace non-breaking and narrow spaces, unify line endings, trim
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .map(|c| match c {
            '\u{00A0}' | '\u{202F}' | '\u{2007}' | '\t' => ' ',
            other => other,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse an amount token (`"118 000"`, `"1.250,50"`); `None` when it is
/// not a finite number
pub fn parse_amount(token: &str) -> Option<BigDecimal> {
    let cleaned: String = token
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    BigDecimal::from_str(&cleaned).ok()
}

/// Every positive numeric token of the text
pub fn numeric_tokens(text: &str) -> Vec<BigDecimal> {
    let zero = BigDecimal::from(0);
    AMOUNT_TOKEN
        .find_iter(text)
        .filter_map(|m| parse_amount(m.as_str()))
        .filter(|amount| *amount > zero)
        .collect()
}

/// Case-insensitive substring search over an already lowercased haystack
pub fn contains_any(lowercase_haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowercase_haystack.contains(k))
}

pub(crate) const INVOICE_KEYWORDS: &[&str] = &["facture", "invoice"];
pub(crate) const RECEIPT_KEYWORDS: &[&str] = &["reçu", "recu ", "receipt", "ticket de caisse"];
pub(crate) const QUOTE_KEYWORDS: &[&str] = &["devis", "quotation", "quote", "proforma", "pro forma"];
pub(crate) const PAYSLIP_KEYWORDS: &[&str] = &[
    "bulletin de paie",
    "bulletin de salaire",
    "fiche de paie",
    "payslip",
];
pub(crate) const STATEMENT_KEYWORDS: &[&str] = &["relevé", "releve", "statement"];

pub(crate) const SALE_KEYWORDS: &[&str] = &[
    "client",
    "vente",
    "customer",
    "facturé à",
    "bill to",
    "sold to",
];
pub(crate) const PURCHASE_KEYWORDS: &[&str] = &[
    "fournisseur",
    "achat",
    "supplier",
    "purchase",
    "vendor",
];
pub(crate) const SERVICE_KEYWORDS: &[&str] = &[
    "prestation",
    "service",
    "honoraires",
    "consulting",
    "conseil",
    "maintenance",
    "formation",
    "abonnement",
    "mission",
    "intervention",
];
pub(crate) const PAYROLL_KEYWORDS: &[&str] = &[
    "bulletin de paie",
    "bulletin de salaire",
    "fiche de paie",
    "salaire",
    "payroll",
    "payslip",
    "salary",
];
pub(crate) const SOCIAL_KEYWORDS: &[&str] = &[
    "cnss",
    "ipres",
    "cotisation",
    "charges sociales",
    "sécurité sociale",
    "securite sociale",
    "social security",
];
pub(crate) const BANK_KEYWORDS: &[&str] = &[
    "virement",
    "prélèvement",
    "prelevement",
    "banque",
    "bancaire",
    "bank",
    "transfer",
    "chèque",
    "cheque",
];
pub(crate) const SETTLEMENT_KEYWORDS: &[&str] = &[
    "règlement",
    "reglement",
    "paiement",
    "payment",
    "fournisseur",
    "supplier",
    "avis de débit",
];
