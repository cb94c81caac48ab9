//! Account ledger: chronological movements with a running balance

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reports::{AccountFilter, Period, PeriodPosition};
use crate::types::*;

/// One movement of the statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub journal: JournalCode,
    pub piece: Option<String>,
    pub reference: Option<String>,
    pub account_code: AccountCode,
    pub label: String,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    /// Balance after this row, debit positive
    pub running_balance: BigDecimal,
}

/// Statement of one account (or every account) over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLedger {
    pub filter: AccountFilter,
    pub period: Period,
    /// Net position carried in from lines dated before the period
    pub opening: BigDecimal,
    pub rows: Vec<LedgerRow>,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    /// Opening plus the net of the period's rows
    pub current: BigDecimal,
}

/// Projects entry snapshots into account statements
pub struct LedgerProjector {
    filter: AccountFilter,
    period: Period,
}

impl LedgerProjector {
    pub fn new(filter: AccountFilter, period: Period) -> Self {
        Self { filter, period }
    }

    pub fn project<'e, I>(&self, entries: I) -> AccountLedger
    where
        I: IntoIterator<Item = &'e JournalEntry>,
    {
        let mut opening = BigDecimal::from(0);
        let mut rows = Vec::new();

        for entry in entries {
            let position = self.period.position(entry.date);
            for line in entry.lines.iter().filter(|l| self.filter.matches(&l.account_code)) {
                match position {
                    PeriodPosition::Before => opening += line.net(),
                    PeriodPosition::Within => rows.push(LedgerRow {
                        date: entry.date,
                        journal: entry.journal,
                        piece: entry.piece.clone(),
                        reference: entry.reference.clone(),
                        account_code: line.account_code.clone(),
                        label: line.label.clone(),
                        debit: line.debit.clone(),
                        credit: line.credit.clone(),
                        running_balance: BigDecimal::from(0),
                    }),
                    PeriodPosition::After => {}
                }
            }
        }

        // stable: same-day rows keep snapshot order
        rows.sort_by_key(|r| r.date);

        let mut running = opening.clone();
        let mut total_debit = BigDecimal::from(0);
        let mut total_credit = BigDecimal::from(0);
        for row in &mut rows {
            running += &row.debit - &row.credit;
            total_debit += &row.debit;
            total_credit += &row.credit;
            row.running_balance = running.clone();
        }

        AccountLedger {
            filter: self.filter.clone(),
            period: self.period,
            opening,
            rows,
            total_debit,
            total_credit,
            current: running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::JournalEntryBuilder;

    fn d(n: i64) -> BigDecimal {
        BigDecimal::from(n)
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn bank(on: NaiveDate, debit: i64, credit: i64, piece: &str) -> JournalEntry {
        let builder = JournalEntryBuilder::new(on, JournalCode::Bank).piece(piece);
        let builder = if debit > 0 {
            builder
                .debit("521", "Banque", d(debit))
                .credit("411", "Client", d(debit))
        } else {
            builder
                .debit("401", "Fournisseur", d(credit))
                .credit("521", "Banque", d(credit))
        };
        builder.build().unwrap()
    }

    #[test]
    fn test_running_balance_from_opening() {
        let entries = vec![
            bank(date(1, 20), 50, 0, "P0"),
            bank(date(2, 10), 0, 30, "P2"),
            bank(date(2, 5), 100, 0, "P1"),
            bank(date(2, 20), 20, 0, "P3"),
            bank(date(3, 1), 999, 0, "P4"),
        ];
        let period = Period::new(date(2, 1), date(2, 29)).unwrap();
        let ledger = LedgerProjector::new(AccountFilter::Exact("521".into()), period)
            .project(&entries);

        assert_eq!(ledger.opening, d(50));
        let pieces: Vec<&str> = ledger.rows.iter().map(|r| r.piece.as_deref().unwrap()).collect();
        assert_eq!(pieces, vec!["P1", "P2", "P3"]);
        let running: Vec<BigDecimal> = ledger.rows.iter().map(|r| r.running_balance.clone()).collect();
        assert_eq!(running, vec![d(150), d(120), d(140)]);
        assert_eq!(ledger.current, d(140));
        assert_eq!(ledger.total_debit, d(120));
        assert_eq!(ledger.total_credit, d(30));
    }

    #[test]
    fn test_same_day_rows_keep_original_order() {
        let entries = vec![
            bank(date(2, 5), 10, 0, "A"),
            bank(date(2, 4), 10, 0, "B"),
            bank(date(2, 5), 10, 0, "C"),
            bank(date(2, 5), 10, 0, "D"),
        ];
        let period = Period::new(date(2, 1), date(2, 29)).unwrap();
        let ledger = LedgerProjector::new(AccountFilter::Exact("521".into()), period)
            .project(&entries);

        let pieces: Vec<&str> = ledger.rows.iter().map(|r| r.piece.as_deref().unwrap()).collect();
        assert_eq!(pieces, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_all_accounts_filter_nets_to_zero() {
        let entries = vec![bank(date(2, 5), 10, 0, "A"), bank(date(2, 6), 0, 4, "B")];
        let period = Period::new(date(2, 1), date(2, 29)).unwrap();
        let ledger = LedgerProjector::new(AccountFilter::All, period).project(&entries);

        assert_eq!(ledger.rows.len(), 4);
        assert_eq!(ledger.current, d(0));
        assert_eq!(ledger.rows[1].account_code.as_str(), "411");
    }

    #[test]
    fn test_projection_is_pure() {
        let entries = vec![bank(date(2, 5), 10, 0, "A"), bank(date(1, 6), 0, 4, "B")];
        let period = Period::new(date(2, 1), date(2, 29)).unwrap();
        let projector = LedgerProjector::new(AccountFilter::Exact("521".into()), period);
        assert_eq!(projector.project(&entries), projector.project(&entries));
    }
}
