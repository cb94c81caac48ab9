//! Posting templates turning an operation and its amounts into entry lines

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::classify::OperationType;
use crate::config::DefaultAccounts;
use crate::tax::round_to_cent;
use crate::types::{balance_tolerance, EntryLine};

/// A proposed line. `needs_review` marks lines posted to suspense that a
/// user has to correct before the entry is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedLine {
    pub line: EntryLine,
    pub needs_review: bool,
}

impl ProposedLine {
    fn settled(line: EntryLine) -> Self {
        Self {
            line,
            needs_review: false,
        }
    }
}

/// Inputs of a template
#[derive(Debug, Clone)]
pub struct TemplateInput<'a> {
    pub operation: OperationType,
    pub base: BigDecimal,
    pub tax: BigDecimal,
    pub label: &'a str,
    /// Counterparty tagged on receivable/payable lines
    pub third_party: Option<&'a str>,
    /// Split social contributions out of payroll
    pub social_charges: bool,
}

/// Share of gross payroll withheld as social contributions
pub fn social_contribution_rate() -> BigDecimal {
    BigDecimal::from(25) / BigDecimal::from(100)
}

fn tagged(line: EntryLine, third_party: Option<&str>) -> EntryLine {
    match third_party {
        Some(name) => line.with_third_party(name),
        None => line,
    }
}

/// Lines of the template for `input.operation`. Zero-amount lines are left
/// out.
pub fn template_lines(input: &TemplateInput<'_>, accounts: &DefaultAccounts) -> Vec<ProposedLine> {
    let zero = BigDecimal::from(0);
    let base = &input.base;
    let tax = &input.tax;
    let gross = base + tax;
    let label = input.label;

    let mut lines = Vec::new();
    match input.operation {
        OperationType::SaleGoods | OperationType::SaleServices => {
            let revenue = if input.operation == OperationType::SaleServices {
                &accounts.revenue_services
            } else {
                &accounts.revenue_goods
            };
            lines.push(tagged(
                EntryLine::debit(accounts.receivable.as_str(), label, gross),
                input.third_party,
            ));
            if *tax > zero {
                lines.push(EntryLine::credit(accounts.vat_collected.as_str(), label, tax.clone()));
            }
            lines.push(EntryLine::credit(revenue.as_str(), label, base.clone()));
        }
        OperationType::PurchaseGoods | OperationType::PurchaseServices => {
            let expense = if input.operation == OperationType::PurchaseServices {
                &accounts.expense_services
            } else {
                &accounts.expense_goods
            };
            lines.push(EntryLine::debit(expense.as_str(), label, base.clone()));
            if *tax > zero {
                lines.push(EntryLine::debit(accounts.vat_deductible.as_str(), label, tax.clone()));
            }
            lines.push(tagged(
                EntryLine::credit(accounts.payable.as_str(), label, gross),
                input.third_party,
            ));
        }
        OperationType::Payroll => {
            let social = if input.social_charges {
                round_to_cent(&(base * social_contribution_rate()))
            } else {
                zero.clone()
            };
            let net = base - &social;
            lines.push(EntryLine::debit(accounts.personnel_expense.as_str(), label, base.clone()));
            if social > zero {
                lines.push(EntryLine::credit(accounts.social_contributions.as_str(), label, social));
            }
            lines.push(EntryLine::credit(accounts.personnel_payable.as_str(), label, net));
        }
        OperationType::BankPayment => {
            lines.push(tagged(
                EntryLine::debit(accounts.payable.as_str(), label, gross.clone()),
                input.third_party,
            ));
            lines.push(EntryLine::credit(accounts.bank.as_str(), label, gross));
        }
        OperationType::BankReceipt => {
            lines.push(EntryLine::debit(accounts.bank.as_str(), label, gross.clone()));
            lines.push(tagged(
                EntryLine::credit(accounts.receivable.as_str(), label, gross),
                input.third_party,
            ));
        }
        OperationType::Miscellaneous => return suspense_lines(&gross, label, accounts),
    }

    lines.into_iter().map(ProposedLine::settled).collect()
}

/// Debit and credit suspense for the same amount, both flagged for review
pub fn suspense_lines(amount: &BigDecimal, label: &str, accounts: &DefaultAccounts) -> Vec<ProposedLine> {
    [
        EntryLine::debit(accounts.suspense.as_str(), label, amount.clone()),
        EntryLine::credit(accounts.suspense.as_str(), label, amount.clone()),
    ]
    .into_iter()
    .map(|line| ProposedLine {
        line,
        needs_review: true,
    })
    .collect()
}

/// Lines are non-empty, use non-empty accounts, carry no negative amount
/// and balance within tolerance
pub fn is_postable(lines: &[ProposedLine]) -> bool {
    let zero = BigDecimal::from(0);
    if lines.is_empty() {
        return false;
    }
    let well_formed = lines.iter().all(|p| {
        !p.line.account_code.is_empty() && p.line.debit >= zero && p.line.credit >= zero
    });
    let (debit, credit) = lines.iter().fold((zero.clone(), zero.clone()), |(d, c), p| {
        (d + &p.line.debit, c + &p.line.credit)
    });
    well_formed && (debit - credit).abs() <= balance_tolerance()
}
