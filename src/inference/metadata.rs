//! Structured metadata extraction from the raw text of a document

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::text::{self, contains_any, parse_amount, AMOUNT};

/// Kind of source document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    Invoice,
    Receipt,
    Quote,
    Payslip,
    Statement,
    /// Nothing recognizable
    #[default]
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: BigDecimal,
}

/// Document totals: pre-tax (HT), tax (TVA), tax-inclusive (TTC)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub ht: Option<BigDecimal>,
    pub tva: Option<BigDecimal>,
    pub ttc: Option<BigDecimal>,
}

impl Totals {
    pub fn is_empty(&self) -> bool {
        self.ht.is_none() && self.tva.is_none() && self.ttc.is_none()
    }
}

/// Everything the extractor could read off a document. Each field stays
/// absent when no rule matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub issuer: Option<String>,
    pub recipient: Option<String>,
    pub subject: Option<String>,
    pub doc_type: DocType,
    pub invoice_number: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// ISO code: XOF, XAF, EUR or USD
    pub currency: Option<String>,
    pub line_items: Vec<LineItem>,
    pub totals: Totals,
}

impl DocumentMetadata {
    /// Sum of the line items, `None` when there are none
    pub fn line_items_total(&self) -> Option<BigDecimal> {
        if self.line_items.is_empty() {
            return None;
        }
        Some(
            self.line_items
                .iter()
                .fold(BigDecimal::from(0), |acc, item| acc + &item.amount),
        )
    }
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("metadata pattern")
}

static INVOICE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    regex(
        r"(?i)(?:\bfacture|\binvoice|\bn°|\bno\.|\bnum[ée]ro|\br[ée]f(?:[ée]rence)?)\s*(?:n°|no\.?|#)?\s*[:#\-]?\s*((?-i:[A-Z0-9][A-Z0-9\-/_]*))",
    )
});

static YEAR_FIRST_DATE: Lazy<Regex> =
    Lazy::new(|| regex(r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b"));

static DAY_FIRST_DATE: Lazy<Regex> =
    Lazy::new(|| regex(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})\b"));

static DUE_DATE_LABEL: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)(?:[ée]ch[ée]ance|due\s+date|date\s+limite|payable\s+(?:avant|le))[^\d\n]*")
});

static REGIONAL_CURRENCY: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\b(?:f\s?cfa|cfa|xof|xaf)\b"));
static EURO: Lazy<Regex> = Lazy::new(|| regex(r"(?i)€|\beur(?:os?)?\b"));
static DOLLAR: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\$|\busd\b"));

static ISSUER_LABEL: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(?:fournisseur|[ée]metteur|vendeur|supplier|vendor)\b[ \t]*[:\-]?[ \t]*(.*)$")
});
static RECIPIENT_LABEL: Lazy<Regex> = Lazy::new(|| {
    regex(
        r"(?i)(?:\bclient|\bdestinataire|\bfactur[ée]\s+[àa]|\bbill(?:ed)?\s+to|\bcustomer)\b[ \t]*[:\-]?[ \t]*(.*)$",
    )
});
static SUBJECT_LABEL: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)^(?:objet|subject|description|d[ée]signation|prestation)[ \t]*[:\-][ \t]*(.+)$")
});

// Label, then anything up to the first digit on the same line, an optional
// rate like "18 %" and the amount.
fn total_pattern(label: &str) -> Regex {
    regex(&format!(
        r"(?im)(?:{label})[^\d\n]*(?:\d+(?:[.,]\d+)?[ \t]*%[^\d\n]*)?(?P<amount>{AMOUNT})"
    ))
}

static HT_TOTAL: Lazy<Regex> = Lazy::new(|| {
    total_pattern(r"\bh\.?t\b\.?|\bhors\s+taxes?\b|\bsous[- ]?total\b|\bsubtotal\b|\btotal\s+excl")
});
static TVA_TOTAL: Lazy<Regex> =
    Lazy::new(|| total_pattern(r"\bt\.?v\.?a\b\.?|\bvat\b|\btax\b"));
static TTC_TOTAL: Lazy<Regex> = Lazy::new(|| {
    total_pattern(r"\bt\.?t\.?c\b\.?|\bnet\s+[àa]\s+payer\b|\btotal\s+due\b|\bamount\s+due\b")
});

static LINE_ITEM: Lazy<Regex> = Lazy::new(|| {
    regex(&format!(
        r"(?i)^(?P<label>.{{6,}}?)[ \t:]+(?P<amount>{AMOUNT})(?:[ \t]*(?:f\s?cfa|xof|xaf|eur|€|\$|usd))?[ \t]*$"
    ))
});

/// Run every extraction rule over the text
pub fn extract_metadata(raw: &str) -> DocumentMetadata {
    let text = text::normalize(raw);
    let lowercase = text.to_lowercase();
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut metadata = DocumentMetadata {
        doc_type: detect_doc_type(&lowercase),
        invoice_number: detect_invoice_number(&text),
        date: first_date(&text),
        due_date: detect_due_date(&text),
        currency: detect_currency(&text),
        issuer: labelled_value(&lines, &ISSUER_LABEL),
        recipient: labelled_value(&lines, &RECIPIENT_LABEL),
        subject: lines
            .iter()
            .find_map(|line| SUBJECT_LABEL.captures(line))
            .map(|caps| caps[1].trim().to_string()),
        totals: Totals {
            ht: first_amount(&HT_TOTAL, &text, None),
            // "TTC (TVA 18% incluse) : 118 000" is a TTC total, not a tax one
            tva: first_amount(&TVA_TOTAL, &text, Some(&TTC_TOTAL)),
            ttc: first_amount(&TTC_TOTAL, &text, None),
        },
        line_items: line_items(&lines),
    };

    if metadata.issuer.is_none() {
        metadata.issuer = lines
            .iter()
            .map(|l| clean_value(l))
            .find(|l| !l.is_empty())
            .map(str::to_string);
    }

    if metadata.line_items.is_empty() {
        if let (Some(subject), Some(ht)) = (&metadata.subject, &metadata.totals.ht) {
            metadata.line_items.push(LineItem {
                label: subject.clone(),
                amount: ht.clone(),
            });
        }
    }

    tracing::debug!(
        doc_type = ?metadata.doc_type,
        invoice_number = ?metadata.invoice_number,
        line_items = metadata.line_items.len(),
        "metadata extracted"
    );
    metadata
}

/// Largest number found anywhere in the text and the hint
pub fn largest_amount(raw: &str, hint: Option<&str>) -> Option<BigDecimal> {
    let mut tokens = text::numeric_tokens(&text::normalize(raw));
    if let Some(hint) = hint {
        tokens.extend(text::numeric_tokens(&text::normalize(hint)));
    }
    tokens.into_iter().max()
}

fn detect_doc_type(lowercase: &str) -> DocType {
    if contains_any(lowercase, text::INVOICE_KEYWORDS) {
        DocType::Invoice
    } else if contains_any(lowercase, text::RECEIPT_KEYWORDS) {
        DocType::Receipt
    } else if contains_any(lowercase, text::QUOTE_KEYWORDS) {
        DocType::Quote
    } else if contains_any(lowercase, text::PAYSLIP_KEYWORDS) {
        DocType::Payslip
    } else if contains_any(lowercase, text::STATEMENT_KEYWORDS) {
        DocType::Statement
    } else {
        DocType::Auto
    }
}

fn detect_invoice_number(text: &str) -> Option<String> {
    INVOICE_NUMBER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|token| token.chars().any(|c| c.is_ascii_digit()))
}

fn date_from(caps: &Captures<'_>, year_first: bool) -> Option<NaiveDate> {
    let (year, month, day) = if year_first {
        (&caps[1], &caps[2], &caps[3])
    } else {
        (&caps[3], &caps[2], &caps[1])
    };
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn first_date(text: &str) -> Option<NaiveDate> {
    YEAR_FIRST_DATE
        .captures_iter(text)
        .find_map(|caps| date_from(&caps, true))
        .or_else(|| {
            DAY_FIRST_DATE
                .captures_iter(text)
                .find_map(|caps| date_from(&caps, false))
        })
}

fn detect_due_date(text: &str) -> Option<NaiveDate> {
    DUE_DATE_LABEL.find_iter(text).find_map(|label| {
        let rest = text[label.end()..].lines().next().unwrap_or_default();
        first_date(rest)
    })
}

fn detect_currency(text: &str) -> Option<String> {
    if let Some(found) = REGIONAL_CURRENCY.find(text) {
        let code = if found.as_str().eq_ignore_ascii_case("xaf") {
            "XAF"
        } else {
            "XOF"
        };
        return Some(code.to_string());
    }
    if EURO.is_match(text) {
        return Some("EUR".to_string());
    }
    if DOLLAR.is_match(text) {
        return Some("USD".to_string());
    }
    None
}

// Cut at the first visual separator
fn clean_value(value: &str) -> &str {
    let end = ["...", "|", "  "]
        .iter()
        .filter_map(|separator| value.find(separator))
        .min()
        .unwrap_or(value.len());
    value[..end].trim()
}

// Value after the label on the same line, or the next non-empty line
fn labelled_value(lines: &[&str], label: &Regex) -> Option<String> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let caps = label.captures(line)?;
        let value = clean_value(&caps[1]);
        if !value.is_empty() {
            return Some(value.to_string());
        }
        lines[index + 1..]
            .iter()
            .map(|l| clean_value(l))
            .find(|l| !l.is_empty())
            .map(str::to_string)
    })
}

// First labelled amount that is not a rate ("TVA 18%") and does not start
// inside a match of `enclosing`
fn first_amount(pattern: &Regex, text: &str, enclosing: Option<&Regex>) -> Option<BigDecimal> {
    let enclosed = |start: usize| {
        enclosing.is_some_and(|outer| {
            outer
                .find_iter(text)
                .any(|m| m.start() <= start && start < m.end())
        })
    };

    pattern.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let amount = caps.name("amount")?;
        let is_rate = text[amount.end()..].trim_start_matches([' ', '\t']).starts_with('%');
        if is_rate || enclosed(whole.start()) {
            return None;
        }
        parse_amount(amount.as_str())
    })
}

fn is_total_line(line: &str) -> bool {
    HT_TOTAL.is_match(line) || TVA_TOTAL.is_match(line) || TTC_TOTAL.is_match(line)
        || line.to_lowercase().starts_with("total")
}

fn line_items(lines: &[&str]) -> Vec<LineItem> {
    let zero = BigDecimal::from(0);
    lines
        .iter()
        .filter(|line| !is_total_line(line))
        .filter_map(|line| {
            let caps = LINE_ITEM.captures(line)?;
            let label = caps["label"].trim().trim_end_matches(':').trim();
            if !label.chars().any(char::is_alphabetic) {
                return None;
            }
            let amount = parse_amount(&caps["amount"])?;
            (amount > zero).then(|| LineItem {
                label: label.to_string(),
                amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(n: i64) -> BigDecimal {
        BigDecimal::from(n)
    }

    #[test]
    fn test_invoice_totals_on_one_line() {
        let metadata = extract_metadata(
            "Facture Client ABC ... Total HT 100 000 ... TVA 18 000 ... Total TTC 118 000",
        );

        assert_eq!(metadata.doc_type, DocType::Invoice);
        assert_eq!(metadata.totals.ht, Some(d(100000)));
        assert_eq!(metadata.totals.tva, Some(d(18000)));
        assert_eq!(metadata.totals.ttc, Some(d(118000)));
        assert_eq!(metadata.recipient.as_deref(), Some("ABC"));
        assert_eq!(metadata.issuer.as_deref(), Some("Facture Client ABC"));
        assert!(metadata.line_items.is_empty());
    }

    #[test]
    fn test_full_invoice() {
        let metadata = extract_metadata(
            "SARL Kora Services\n\
             Facture N° F-2024-017\n\
             Date : 15/03/2024\n\
             Échéance : 14/04/2024\n\
             Client : Boulangerie du Plateau\n\
             Objet : Maintenance informatique\n\
             Maintenance serveurs 60 000\n\
             Assistance utilisateurs 40 000\n\
             Total HT 100 000 FCFA\n\
             TVA 18 % : 18 000 FCFA\n\
             Total TTC 118 000 FCFA\n",
        );

        assert_eq!(metadata.doc_type, DocType::Invoice);
        assert_eq!(metadata.invoice_number.as_deref(), Some("F-2024-017"));
        assert_eq!(metadata.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(metadata.due_date, NaiveDate::from_ymd_opt(2024, 4, 14));
        assert_eq!(metadata.currency.as_deref(), Some("XOF"));
        assert_eq!(metadata.issuer.as_deref(), Some("SARL Kora Services"));
        assert_eq!(metadata.recipient.as_deref(), Some("Boulangerie du Plateau"));
        assert_eq!(metadata.subject.as_deref(), Some("Maintenance informatique"));
        assert_eq!(metadata.totals.tva, Some(d(18000)));
        assert_eq!(
            metadata.line_items,
            vec![
                LineItem { label: "Maintenance serveurs".into(), amount: d(60000) },
                LineItem { label: "Assistance utilisateurs".into(), amount: d(40000) },
            ]
        );
        assert_eq!(metadata.line_items_total(), Some(d(100000)));
    }

    #[test]
    fn test_rate_is_not_a_tax_amount() {
        let metadata = extract_metadata("Facture\nClient : Alpha\nTotal HT 100 000\nTVA 18%");
        assert_eq!(metadata.totals.ht, Some(d(100000)));
        assert_eq!(metadata.totals.tva, None);
        assert!(metadata.line_items.is_empty());

        let spaced = extract_metadata("TVA 18 %\nTVA : 18 000");
        assert_eq!(spaced.totals.tva, Some(d(18000)));
    }

    #[test]
    fn test_tax_inside_ttc_label() {
        let metadata = extract_metadata("Facture fournisseur\nMontant TTC (TVA 18% incluse) : 118 000");
        assert_eq!(metadata.totals.tva, None);
        assert_eq!(metadata.totals.ttc, Some(d(118000)));
    }

    #[test]
    fn test_invoice_number_after_lowercase_label() {
        assert_eq!(
            extract_metadata("Facture numéro 123").invoice_number.as_deref(),
            Some("123")
        );
        assert_eq!(
            extract_metadata("Réf : BC-77\nTotal 5 000").invoice_number.as_deref(),
            Some("BC-77")
        );
    }

    #[rstest]
    #[case("100 € / 65 000 FCFA", Some("XOF"))]
    #[case("Total 20 XAF", Some("XAF"))]
    #[case("$ 20 et 18 EUR", Some("EUR"))]
    #[case("Total 12 euros", Some("EUR"))]
    #[case("USD 20", Some("USD"))]
    #[case("Fournisseur 300", None)]
    #[case("aucune devise", None)]
    fn test_currency_priority(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(detect_currency(text).as_deref(), expected);
    }

    #[test]
    fn test_year_first_date_wins() {
        let metadata = extract_metadata("Reçu du 05/01/24\nEmis le 2024-02-10");
        assert_eq!(metadata.doc_type, DocType::Receipt);
        assert_eq!(metadata.date, NaiveDate::from_ymd_opt(2024, 2, 10));

        let short_year = extract_metadata("Reçu du 05/01/24");
        assert_eq!(short_year.date, NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn test_labelled_value_on_next_line() {
        let metadata = extract_metadata("Devis\nFournisseur :\n\nETS Diallo & Fils\nTotal 50 000 EUR");
        assert_eq!(metadata.doc_type, DocType::Quote);
        assert_eq!(metadata.issuer.as_deref(), Some("ETS Diallo & Fils"));
        assert_eq!(metadata.currency.as_deref(), Some("EUR"));
        assert!(metadata.line_items.is_empty());
    }

    #[test]
    fn test_doc_type_priority() {
        assert_eq!(extract_metadata("Relevé de facture").doc_type, DocType::Invoice);
        assert_eq!(extract_metadata("Bulletin de paie mars").doc_type, DocType::Payslip);
        assert_eq!(extract_metadata("Relevé bancaire").doc_type, DocType::Statement);
        assert_eq!(extract_metadata("Note interne").doc_type, DocType::Auto);
    }

    #[test]
    fn test_synthesized_line_item() {
        let metadata = extract_metadata("Objet : Audit annuel\nMontant HT 250 000");
        assert_eq!(
            metadata.line_items,
            vec![LineItem { label: "Audit annuel".into(), amount: d(250000) }]
        );
    }

    #[test]
    fn test_largest_amount_includes_hint() {
        assert_eq!(largest_amount("Ticket 12 et 3 500", Some("carburant 25 000")), Some(d(25000)));
        assert_eq!(largest_amount("sans montant", None), None);
    }
}
