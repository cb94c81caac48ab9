//! Income statement and balance sheet totals, driven by a mapping of
//! statement lines to account-code ranges

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::reports::Period;
use crate::types::*;

/// Statement section a mapped line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementSection {
    Revenue,
    Expense,
    Asset,
    Liability,
    Equity,
}

/// Side on which a line's accounts contribute positively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Debit,
    Credit,
}

impl Polarity {
    /// `max(0, net)` for debit lines, `max(0, -net)` for credit lines
    pub fn contribution(&self, net: &BigDecimal) -> BigDecimal {
        let signed = match self {
            Polarity::Debit => net.clone(),
            Polarity::Credit => -net.clone(),
        };
        if signed > BigDecimal::from(0) {
            signed
        } else {
            BigDecimal::from(0)
        }
    }
}

/// Errors raised while reading a mapping document
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Malformed mapping document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid account selector: {0}")]
    InvalidSelector(String),
    #[error("Mapping document has no lines")]
    Empty,
}

/// `"A-B"` range or single account code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSelector {
    Single(AccountCode),
    Range { low: String, high: String },
}

impl AccountSelector {
    pub fn parse(raw: &str) -> Result<Self, MappingError> {
        let raw = raw.trim();
        let is_code = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

        match raw.split_once('-') {
            Some((low, high)) => {
                let (low, high) = (low.trim(), high.trim());
                if !is_code(low) || !is_code(high) {
                    return Err(MappingError::InvalidSelector(raw.to_string()));
                }
                Ok(AccountSelector::Range {
                    low: low.to_string(),
                    high: high.to_string(),
                })
            }
            None if is_code(raw) => Ok(AccountSelector::Single(AccountCode::new(raw))),
            None => Err(MappingError::InvalidSelector(raw.to_string())),
        }
    }

    /// Ranges compare at a common width: the low bound is right-padded
    /// with `0`, the high bound with `9`, so `70-71` covers `7099`.
    pub fn matches(&self, code: &AccountCode) -> bool {
        match self {
            AccountSelector::Single(expected) => expected == code,
            AccountSelector::Range { low, high } => {
                let code = code.as_str();
                if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
                    return false;
                }
                let width = low.len().max(high.len()).max(code.len());
                let low = format!("{:0<width$}", low, width = width);
                let high = format!("{:9<width$}", high, width = width);
                let code = format!("{:0<width$}", code, width = width);
                low <= code && code <= high
            }
        }
    }
}

/// One line of the mapping document, as written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub key: String,
    pub label: String,
    pub section: StatementSection,
    pub polarity: Polarity,
    pub accounts: Vec<String>,
}

/// Statement mapping: which accounts feed which statement line
#[derive(Debug, Clone, PartialEq)]
pub struct StatementMapping {
    lines: Vec<(StatementLine, Vec<AccountSelector>)>,
}

#[derive(Deserialize)]
struct MappingDocument {
    lines: Vec<StatementLine>,
}

impl StatementMapping {
    pub fn new(lines: Vec<StatementLine>) -> Result<Self, MappingError> {
        if lines.is_empty() {
            return Err(MappingError::Empty);
        }
        let lines = lines
            .into_iter()
            .map(|line| -> Result<_, MappingError> {
                let selectors = line
                    .accounts
                    .iter()
                    .map(|raw| AccountSelector::parse(raw))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((line, selectors))
            })
            .collect::<Result<Vec<_>, MappingError>>()?;
        Ok(Self { lines })
    }

    /// Parse a JSON mapping document (`{"lines": [...]}`)
    pub fn from_json(document: &str) -> Result<Self, MappingError> {
        let document: MappingDocument = serde_json::from_str(document)?;
        Self::new(document.lines)
    }

    pub fn lines(&self) -> impl Iterator<Item = &StatementLine> {
        self.lines.iter().map(|(line, _)| line)
    }
}

/// Total of one statement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLineTotal {
    pub key: String,
    pub label: String,
    pub section: StatementSection,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatementTotals {
    pub revenue: BigDecimal,
    pub expenses: BigDecimal,
    /// Revenue minus expenses
    pub result: BigDecimal,
}

/// Balance sheet totals; reconciliation is reported, never enforced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetTotals {
    pub assets: BigDecimal,
    pub liabilities: BigDecimal,
    pub equity: BigDecimal,
    pub result: BigDecimal,
}

impl BalanceSheetTotals {
    /// assets - (liabilities + equity + result)
    pub fn reconciliation_gap(&self) -> BigDecimal {
        &self.assets - (&self.liabilities + &self.equity + &self.result)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub period: Period,
    pub income_statement: IncomeStatementTotals,
    pub balance_sheet: BalanceSheetTotals,
    pub lines: Vec<StatementLineTotal>,
    /// Computed with the class-number heuristic instead of a mapping
    pub legacy: bool,
}

/// Aggregates entries into statement totals
#[derive(Debug, Clone, Default)]
pub struct FinancialStatementMapper {
    mapping: Option<StatementMapping>,
}

impl FinancialStatementMapper {
    pub fn new(mapping: Option<StatementMapping>) -> Self {
        Self { mapping }
    }

    /// Mapper from an optional JSON document; a missing or malformed
    /// document selects the class-number heuristic
    pub fn from_document(document: Option<&str>) -> Self {
        let mapping = document.and_then(|doc| match StatementMapping::from_json(doc) {
            Ok(mapping) => Some(mapping),
            Err(err) => {
                warn!(error = %err, "statement mapping rejected, using class heuristic");
                None
            }
        });
        Self::new(mapping)
    }

    pub fn uses_legacy_mapping(&self) -> bool {
        self.mapping.is_none()
    }

    pub fn compute<'e, I>(&self, entries: I, period: Period) -> FinancialStatements
    where
        I: IntoIterator<Item = &'e JournalEntry>,
    {
        let nets = net_balances(entries, period);
        let lines = match &self.mapping {
            Some(mapping) => mapped_lines(mapping, &nets),
            None => legacy_lines(&nets),
        };

        let sum = |section: StatementSection| -> BigDecimal {
            lines
                .iter()
                .filter(|l| l.section == section)
                .map(|l| &l.amount)
                .sum()
        };

        let revenue = sum(StatementSection::Revenue);
        let expenses = sum(StatementSection::Expense);
        let result = &revenue - &expenses;
        let balance_sheet = BalanceSheetTotals {
            assets: sum(StatementSection::Asset),
            liabilities: sum(StatementSection::Liability),
            equity: sum(StatementSection::Equity),
            result: result.clone(),
        };

        debug!(
            legacy = self.mapping.is_none(),
            accounts = nets.len(),
            result = %result,
            "financial statements computed"
        );

        FinancialStatements {
            period,
            income_statement: IncomeStatementTotals {
                revenue,
                expenses,
                result,
            },
            balance_sheet,
            lines,
            legacy: self.mapping.is_none(),
        }
    }
}

/// Σdebit - Σcredit per account over the period
fn net_balances<'e, I>(entries: I, period: Period) -> BTreeMap<AccountCode, BigDecimal>
where
    I: IntoIterator<Item = &'e JournalEntry>,
{
    let mut nets: BTreeMap<AccountCode, BigDecimal> = BTreeMap::new();
    for entry in entries.into_iter().filter(|e| period.contains(e.date)) {
        for line in &entry.lines {
            *nets
                .entry(line.account_code.clone())
                .or_insert_with(|| BigDecimal::from(0)) += line.net();
        }
    }
    nets
}

fn mapped_lines(
    mapping: &StatementMapping,
    nets: &BTreeMap<AccountCode, BigDecimal>,
) -> Vec<StatementLineTotal> {
    mapping
        .lines
        .iter()
        .map(|(line, selectors)| {
            let amount = nets
                .iter()
                .filter(|(code, _)| selectors.iter().any(|s| s.matches(code)))
                .map(|(_, net)| line.polarity.contribution(net))
                .sum();
            StatementLineTotal {
                key: line.key.clone(),
                label: line.label.clone(),
                section: line.section,
                amount,
            }
        })
        .collect()
}

/// Legacy path: one line per account class
fn legacy_lines(nets: &BTreeMap<AccountCode, BigDecimal>) -> Vec<StatementLineTotal> {
    let class_net = |class: u8| -> BigDecimal {
        nets.iter()
            .filter(|(code, _)| code.class() == Some(class))
            .map(|(_, net)| net)
            .sum()
    };
    let line = |key: &str, label: &str, section: StatementSection, amount: BigDecimal| {
        StatementLineTotal {
            key: key.to_string(),
            label: label.to_string(),
            section,
            amount,
        }
    };
    // Net of class 4 and 5 lands on whichever side it falls
    let split = |net: BigDecimal| -> (StatementSection, BigDecimal) {
        if net < BigDecimal::from(0) {
            (StatementSection::Liability, -net)
        } else {
            (StatementSection::Asset, net)
        }
    };

    let (third_party_side, third_parties) = split(class_net(4));
    let (cash_side, cash) = split(class_net(5));

    vec![
        line(
            "revenue",
            "Produits (classe 7)",
            StatementSection::Revenue,
            Polarity::Credit.contribution(&class_net(7)),
        ),
        line(
            "expenses",
            "Charges (classe 6)",
            StatementSection::Expense,
            Polarity::Debit.contribution(&class_net(6)),
        ),
        line(
            "equity",
            "Capitaux propres et ressources durables (classe 1)",
            StatementSection::Equity,
            -class_net(1),
        ),
        line(
            "fixed_assets",
            "Immobilisations (classe 2)",
            StatementSection::Asset,
            class_net(2),
        ),
        line(
            "inventory",
            "Stocks (classe 3)",
            StatementSection::Asset,
            class_net(3),
        ),
        line("third_parties", "Tiers (classe 4)", third_party_side, third_parties),
        line("cash", "Trésorerie (classe 5)", cash_side, cash),
    ]
}
