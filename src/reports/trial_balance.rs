//! Trial balance: opening, movement and closing columns per account

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::TryFrom;
use tracing::debug;

use crate::ledger::{AccountDirectory, OpeningBalance};
use crate::reports::{Period, PeriodPosition};
use crate::types::*;

/// Presentation format: how many amount columns are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BalanceFormat {
    /// Closing debit / credit
    TwoColumns,
    /// Movement and closing
    FourColumns,
    /// Opening, movement and closing
    SixColumns,
}

impl BalanceFormat {
    pub fn column_count(&self) -> usize {
        match self {
            BalanceFormat::TwoColumns => 2,
            BalanceFormat::FourColumns => 4,
            BalanceFormat::SixColumns => 6,
        }
    }

    /// Column titles, in rendering order
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = Vec::with_capacity(self.column_count());
        if *self == BalanceFormat::SixColumns {
            headers.extend(["Débit ouverture", "Crédit ouverture"]);
        }
        if *self != BalanceFormat::TwoColumns {
            headers.extend(["Débit mouvements", "Crédit mouvements"]);
        }
        headers.extend(["Débit solde", "Crédit solde"]);
        headers
    }
}

impl Default for BalanceFormat {
    fn default() -> Self {
        BalanceFormat::SixColumns
    }
}

impl TryFrom<u8> for BalanceFormat {
    type Error = String;

    fn try_from(columns: u8) -> Result<Self, Self::Error> {
        match columns {
            2 => Ok(BalanceFormat::TwoColumns),
            4 => Ok(BalanceFormat::FourColumns),
            6 => Ok(BalanceFormat::SixColumns),
            other => Err(format!("unsupported balance format: {} columns", other)),
        }
    }
}

impl From<BalanceFormat> for u8 {
    fn from(format: BalanceFormat) -> Self {
        format.column_count() as u8
    }
}

/// One account line of the trial balance; always carries all six values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub account_code: AccountCode,
    pub label: String,
    pub opening_debit: BigDecimal,
    pub opening_credit: BigDecimal,
    pub movement_debit: BigDecimal,
    pub movement_credit: BigDecimal,
    pub closing_debit: BigDecimal,
    pub closing_credit: BigDecimal,
}

impl BalanceRow {
    fn empty(account_code: AccountCode, label: String) -> Self {
        Self {
            account_code,
            label,
            opening_debit: BigDecimal::from(0),
            opening_credit: BigDecimal::from(0),
            movement_debit: BigDecimal::from(0),
            movement_credit: BigDecimal::from(0),
            closing_debit: BigDecimal::from(0),
            closing_credit: BigDecimal::from(0),
        }
    }

    pub fn opening_net(&self) -> BigDecimal {
        &self.opening_debit - &self.opening_credit
    }

    pub fn movement_net(&self) -> BigDecimal {
        &self.movement_debit - &self.movement_credit
    }

    /// Closing position as a signed net (debit positive)
    pub fn closing_net(&self) -> BigDecimal {
        &self.closing_debit - &self.closing_credit
    }

    fn close(&mut self) {
        let net = self.opening_net() + self.movement_net();
        let zero = BigDecimal::from(0);
        if net > zero {
            self.closing_debit = net;
            self.closing_credit = zero;
        } else if net < zero {
            self.closing_credit = -net;
            self.closing_debit = zero;
        } else {
            self.closing_debit = zero.clone();
            self.closing_credit = zero;
        }
    }

    /// Amounts rendered for a given format
    pub fn columns(&self, format: BalanceFormat) -> Vec<&BigDecimal> {
        let mut columns = Vec::with_capacity(format.column_count());
        if format == BalanceFormat::SixColumns {
            columns.extend([&self.opening_debit, &self.opening_credit]);
        }
        if format != BalanceFormat::TwoColumns {
            columns.extend([&self.movement_debit, &self.movement_credit]);
        }
        columns.extend([&self.closing_debit, &self.closing_credit]);
        columns
    }
}

/// Column sums of the trial balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceTotals {
    pub opening_debit: BigDecimal,
    pub opening_credit: BigDecimal,
    pub movement_debit: BigDecimal,
    pub movement_credit: BigDecimal,
    pub closing_debit: BigDecimal,
    pub closing_credit: BigDecimal,
}

impl BalanceTotals {
    fn from_rows(rows: &[BalanceRow]) -> Self {
        Self {
            opening_debit: rows.iter().map(|r| &r.opening_debit).sum(),
            opening_credit: rows.iter().map(|r| &r.opening_credit).sum(),
            movement_debit: rows.iter().map(|r| &r.movement_debit).sum(),
            movement_credit: rows.iter().map(|r| &r.movement_credit).sum(),
            closing_debit: rows.iter().map(|r| &r.closing_debit).sum(),
            closing_credit: rows.iter().map(|r| &r.closing_credit).sum(),
        }
    }

    /// Whether each debit column matches its credit column within tolerance
    pub fn is_balanced(&self) -> bool {
        let tolerance = balance_tolerance();
        (&self.opening_debit - &self.opening_credit).abs() <= tolerance
            && (&self.movement_debit - &self.movement_credit).abs() <= tolerance
            && (&self.closing_debit - &self.closing_credit).abs() <= tolerance
    }

    pub fn columns(&self, format: BalanceFormat) -> Vec<&BigDecimal> {
        let mut columns = Vec::with_capacity(format.column_count());
        if format == BalanceFormat::SixColumns {
            columns.extend([&self.opening_debit, &self.opening_credit]);
        }
        if format != BalanceFormat::TwoColumns {
            columns.extend([&self.movement_debit, &self.movement_credit]);
        }
        columns.extend([&self.closing_debit, &self.closing_credit]);
        columns
    }
}

/// Trial balance over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub period: Period,
    pub format: BalanceFormat,
    /// Rows in natural account order
    pub rows: Vec<BalanceRow>,
    pub totals: BalanceTotals,
}

impl TrialBalance {
    pub fn headers(&self) -> Vec<&'static str> {
        self.format.headers()
    }

    pub fn row(&self, code: &str) -> Option<&BalanceRow> {
        self.rows.iter().find(|r| r.account_code.as_str() == code)
    }

    /// Opening columns as `(account, debit, credit)` triples, ready to be
    /// re-imported as an opening entry
    pub fn opening_balances(&self) -> Vec<OpeningBalance> {
        let zero = BigDecimal::from(0);
        self.rows
            .iter()
            .filter(|r| r.opening_debit != zero || r.opening_credit != zero)
            .map(|r| {
                OpeningBalance::new(
                    r.account_code.clone(),
                    r.opening_debit.clone(),
                    r.opening_credit.clone(),
                )
            })
            .collect()
    }

    /// Closing positions, to carry forward into the next period
    pub fn closing_balances(&self) -> Vec<OpeningBalance> {
        let zero = BigDecimal::from(0);
        self.rows
            .iter()
            .filter(|r| r.closing_debit != zero || r.closing_credit != zero)
            .map(|r| {
                OpeningBalance::new(
                    r.account_code.clone(),
                    r.closing_debit.clone(),
                    r.closing_credit.clone(),
                )
            })
            .collect()
    }
}

/// Computes trial balances from entry snapshots
pub struct BalanceAggregator<'a> {
    directory: &'a AccountDirectory,
    period: Period,
    format: BalanceFormat,
}

impl<'a> BalanceAggregator<'a> {
    pub fn new(directory: &'a AccountDirectory, period: Period, format: BalanceFormat) -> Self {
        Self {
            directory,
            period,
            format,
        }
    }

    /// Lines before `from` feed the opening columns, lines within the
    /// period feed the movement columns, and lines after `to` are ignored.
    pub fn compute<'e, I>(&self, entries: I) -> TrialBalance
    where
        I: IntoIterator<Item = &'e JournalEntry>,
    {
        let mut rows: BTreeMap<AccountCode, BalanceRow> = BTreeMap::new();

        for entry in entries {
            let position = self.period.position(entry.date);
            if position == PeriodPosition::After {
                continue;
            }

            for line in &entry.lines {
                let row = rows.entry(line.account_code.clone()).or_insert_with(|| {
                    BalanceRow::empty(
                        line.account_code.clone(),
                        self.directory.label_for(&line.account_code),
                    )
                });

                match position {
                    PeriodPosition::Before => {
                        row.opening_debit += &line.debit;
                        row.opening_credit += &line.credit;
                    }
                    PeriodPosition::Within => {
                        row.movement_debit += &line.debit;
                        row.movement_credit += &line.credit;
                    }
                    PeriodPosition::After => {}
                }
            }
        }

        let rows: Vec<BalanceRow> = rows
            .into_values()
            .map(|mut row| {
                row.close();
                row
            })
            .collect();
        let totals = BalanceTotals::from_rows(&rows);

        debug!(
            accounts = rows.len(),
            from = %self.period.from,
            to = %self.period.to,
            "trial balance computed"
        );

        TrialBalance {
            period: self.period,
            format: self.format,
            rows,
            totals,
        }
    }
}
