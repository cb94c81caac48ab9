//! Integration tests for compta-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use compta_core::{
    patterns, AccountDirectory, AccountFilter, BalanceFormat, DocumentInferenceEngine,
    EngineConfig, FinancialStatementMapper, JournalCode, JournalEntry, JournalEntryBuilder,
    LedgerError, LedgerStore, OpeningBalance, Period, Settings,
};
use proptest::prelude::*;
use rstest::rstest;

fn d(n: i64) -> BigDecimal {
    BigDecimal::from(n)
}

fn cents(n: i64) -> BigDecimal {
    BigDecimal::from(n) / BigDecimal::from(100)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn year(year: i32) -> Period {
    Period::new(date(year, 1, 1), date(year, 12, 31)).unwrap()
}

#[test]
fn test_complete_accounting_workflow() {
    let mut store = LedgerStore::in_memory();
    let directory = AccountDirectory::syscohada();

    store
        .import_opening_balances(
            date(2023, 12, 31),
            &[
                OpeningBalance::new("521", d(500000), d(0)),
                OpeningBalance::new("101", d(0), d(500000)),
            ],
        )
        .unwrap();

    let sale = patterns::sale_with_vat(date(2024, 2, 1), "411", "4431", "706", d(100000), d(18000))
        .unwrap();
    store.insert(sale).unwrap();
    let purchase =
        patterns::purchase_with_vat(date(2024, 2, 3), "601", "4452", "401", d(40000), d(7200))
            .unwrap();
    store.insert(purchase).unwrap();
    store
        .insert(patterns::customer_receipt(date(2024, 2, 10), "521", "411", d(118000)).unwrap())
        .unwrap();
    store
        .insert(patterns::supplier_payment(date(2024, 2, 12), "401", "521", d(47200)).unwrap())
        .unwrap();

    let balance = store.trial_balance(&directory, year(2024), BalanceFormat::SixColumns);
    assert!(balance.totals.is_balanced());
    assert_eq!(balance.headers().len(), 6);

    let bank = balance.row("521").unwrap();
    assert_eq!(bank.opening_debit, d(500000));
    assert_eq!(bank.movement_debit, d(118000));
    assert_eq!(bank.movement_credit, d(47200));
    assert_eq!(bank.closing_debit, d(570800));
    assert_eq!(bank.label, "Banques locales");

    let receivable = balance.row("411").unwrap();
    assert_eq!(receivable.closing_net(), d(0));

    let codes: Vec<&str> = balance.rows.iter().map(|r| r.account_code.as_str()).collect();
    assert_eq!(codes, vec!["101", "401", "411", "4431", "4452", "521", "601", "706"]);

    let statements = store.financial_statements(&FinancialStatementMapper::default(), year(2024));
    assert!(statements.legacy);
    assert_eq!(statements.income_statement.revenue, d(100000));
    assert_eq!(statements.income_statement.expenses, d(40000));
    assert_eq!(statements.income_statement.result, d(60000));

    let ledger = store.account_ledger(AccountFilter::Exact("521".into()), year(2024));
    assert_eq!(ledger.opening, d(500000));
    assert_eq!(ledger.rows.len(), 2);
    assert_eq!(ledger.current, d(570800));
}

#[test]
fn test_opening_balance_carries_into_period() {
    let mut store = LedgerStore::in_memory();
    let before = JournalEntryBuilder::new(date(2023, 12, 20), JournalCode::Sales)
        .debit("411", "Client", d(118000))
        .credit("701", "Vente", d(100000))
        .credit("4457", "TVA facturée", d(18000))
        .build()
        .unwrap();
    let within = JournalEntryBuilder::new(date(2024, 1, 15), JournalCode::Bank)
        .debit("512", "Banque", d(118000))
        .credit("411", "Client", d(118000))
        .build()
        .unwrap();
    store.insert(before).unwrap();
    store.insert(within).unwrap();

    let balance = store.trial_balance(
        &AccountDirectory::syscohada(),
        year(2024),
        BalanceFormat::SixColumns,
    );
    let row = balance.row("411").unwrap();
    assert_eq!((row.opening_debit.clone(), row.opening_credit.clone()), (d(118000), d(0)));
    assert_eq!((row.movement_debit.clone(), row.movement_credit.clone()), (d(0), d(118000)));
    assert_eq!((row.closing_debit.clone(), row.closing_credit.clone()), (d(0), d(0)));

    // unknown to the chart, labelled with its own code
    assert_eq!(balance.row("4457").unwrap().label, "4457");
}

#[rstest]
#[case(date(2024, 1, 1), true, false)]
#[case(date(2024, 12, 31), true, false)]
#[case(date(2023, 12, 31), false, true)]
#[case(date(2025, 1, 1), false, false)]
fn test_period_boundaries(
    #[case] on: NaiveDate,
    #[case] in_movement: bool,
    #[case] in_opening: bool,
) {
    let mut store = LedgerStore::in_memory();
    store
        .insert(
            JournalEntryBuilder::new(on, JournalCode::Cash)
                .debit("571", "Caisse", d(10))
                .credit("701", "Vente", d(10))
                .build()
                .unwrap(),
        )
        .unwrap();

    let balance = store.trial_balance(
        &AccountDirectory::syscohada(),
        year(2024),
        BalanceFormat::SixColumns,
    );
    match balance.row("571") {
        Some(row) => {
            assert_eq!(row.movement_debit == d(10), in_movement);
            assert_eq!(row.opening_debit == d(10), in_opening);
        }
        None => assert!(!in_movement && !in_opening),
    }
}

#[test]
fn test_legacy_statements_over_classes_six_and_seven() {
    let mut store = LedgerStore::in_memory();
    store
        .insert(
            JournalEntryBuilder::new(date(2024, 3, 1), JournalCode::Miscellaneous)
                .debit("601", "Achats", d(30000))
                .debit("706", "Avoir", d(5000))
                .credit("701", "Ventes", d(80000))
                .credit("605", "Remise", d(2000))
                .debit("571", "Caisse", d(47000))
                .build()
                .unwrap(),
        )
        .unwrap();

    let statements = store.financial_statements(&FinancialStatementMapper::default(), year(2024));
    // class 7 net credit 75000, class 6 net debit 28000
    assert_eq!(statements.income_statement.revenue, d(75000));
    assert_eq!(statements.income_statement.expenses, d(28000));
    assert_eq!(statements.income_statement.result, d(47000));
}

#[test]
fn test_mapped_statements() {
    let mapping = r#"{
        "lines": [
            {"key": "ventes", "label": "Ventes", "section": "revenue", "polarity": "credit", "accounts": ["70-71"]},
            {"key": "achats", "label": "Achats", "section": "expense", "polarity": "debit", "accounts": ["60-61", "661"]},
            {"key": "tresorerie", "label": "Trésorerie", "section": "asset", "polarity": "debit", "accounts": ["52-57"]},
            {"key": "capital", "label": "Capital", "section": "equity", "polarity": "credit", "accounts": ["101"]}
        ]
    }"#;
    let mapper = FinancialStatementMapper::from_document(Some(mapping));
    assert!(!mapper.uses_legacy_mapping());

    let mut store = LedgerStore::in_memory();
    store
        .insert(
            JournalEntryBuilder::new(date(2024, 1, 2), JournalCode::Opening)
                .debit("521", "Banque", d(1000))
                .credit("101", "Capital", d(1000))
                .build()
                .unwrap(),
        )
        .unwrap();
    store
        .insert(
            JournalEntryBuilder::new(date(2024, 2, 2), JournalCode::Cash)
                .debit("571", "Caisse", d(300))
                .credit("7011", "Ventes détail", d(300))
                .build()
                .unwrap(),
        )
        .unwrap();
    store
        .insert(
            JournalEntryBuilder::new(date(2024, 2, 5), JournalCode::Cash)
                .debit("661", "Salaires", d(100))
                .credit("571", "Caisse", d(100))
                .build()
                .unwrap(),
        )
        .unwrap();

    let statements = store.financial_statements(&mapper, year(2024));
    assert!(!statements.legacy);
    assert_eq!(statements.income_statement.revenue, d(300));
    assert_eq!(statements.income_statement.expenses, d(100));
    assert_eq!(statements.balance_sheet.assets, d(1200));
    assert_eq!(statements.balance_sheet.equity, d(1000));
    assert_eq!(statements.balance_sheet.reconciliation_gap(), d(0));

    let broken = FinancialStatementMapper::from_document(Some("{\"lines\": 3}"));
    assert!(broken.uses_legacy_mapping());
}

#[test]
fn test_account_ledger_running_balance() {
    let mut store = LedgerStore::in_memory();
    let entry = |on: NaiveDate, debit: i64, credit: i64| {
        let builder = JournalEntryBuilder::new(on, JournalCode::Cash);
        let builder = if debit > 0 {
            builder.debit("571", "Caisse", d(debit)).credit("701", "Vente", d(debit))
        } else {
            builder.debit("601", "Achat", d(credit)).credit("571", "Caisse", d(credit))
        };
        builder.build().unwrap()
    };
    store.insert(entry(date(2023, 11, 2), 50, 0)).unwrap();
    store.insert(entry(date(2024, 1, 9), 0, 20)).unwrap();
    store.insert(entry(date(2024, 1, 3), 100, 0)).unwrap();
    store.insert(entry(date(2024, 2, 1), 5, 0)).unwrap();

    let ledger = store.account_ledger(AccountFilter::Exact("571".into()), year(2024));
    assert_eq!(ledger.opening, d(50));
    let running: Vec<BigDecimal> = ledger.rows.iter().map(|r| r.running_balance.clone()).collect();
    assert_eq!(running, vec![d(150), d(130), d(135)]);
    assert_eq!(ledger.current, d(135));
}

#[test]
fn test_inferred_invoice_is_posted() {
    let engine = DocumentInferenceEngine::new(EngineConfig::default());
    let outcome = engine.infer(
        "Facture Client ABC ... Total HT 100 000 ... TVA 18 000 ... Total TTC 118 000",
        None,
        None,
    );
    let entry = outcome.into_journal_entry(date(2024, 6, 30)).unwrap();
    assert_eq!(entry.date, date(2024, 6, 30));

    let mut store = LedgerStore::in_memory();
    store.insert(entry).unwrap();

    let balance = store.trial_balance(
        &AccountDirectory::syscohada(),
        year(2024),
        BalanceFormat::TwoColumns,
    );
    assert_eq!(balance.row("411").unwrap().closing_debit, d(118000));
    assert_eq!(balance.row("4431").unwrap().closing_credit, d(18000));
    assert_eq!(balance.row("701").unwrap().closing_credit, d(100000));
    assert!(balance.totals.is_balanced());
}

#[test]
fn test_settings_drive_inference() {
    let settings = Settings::from_toml_str(
        r#"
        [engine]
        company_name = "Kora"
        track_third_parties = true

        [engine.accounts]
        payable = "4011"
        "#,
    )
    .unwrap();
    let engine = DocumentInferenceEngine::new(settings.engine);
    let outcome = engine.infer(
        "Imprimerie Sahel\nFacture N° 12\nClient : SARL Kora\nTotal HT 20 000\nTVA 3 600",
        None,
        None,
    );

    assert!(outcome.operation.is_purchase());
    let payable = outcome.lines.last().unwrap();
    assert_eq!(payable.line.account_code.as_str(), "4011");
    assert_eq!(payable.line.credit, d(23600));
    assert_eq!(payable.line.third_party.as_deref(), Some("Imprimerie Sahel"));
}

#[test]
fn test_rejected_entry_leaves_store_untouched() {
    let mut store = LedgerStore::in_memory();
    let empty = JournalEntry::new(date(2024, 1, 1), JournalCode::Miscellaneous);
    assert!(matches!(store.insert(empty), Err(LedgerError::InvalidEntry(_))));
    assert!(store.is_empty());
}

const ACCOUNTS: &[&str] = &["101", "401", "411", "4431", "521", "571", "601", "661", "701"];

fn arb_entry() -> impl Strategy<Value = JournalEntry> {
    (
        0..ACCOUNTS.len(),
        0..ACCOUNTS.len(),
        1i64..100_000_000,
        1u32..=12,
        1u32..=28,
    )
        .prop_filter("distinct accounts", |(debit, credit, ..)| debit != credit)
        .prop_map(|(debit, credit, amount, month, day)| {
            JournalEntryBuilder::new(date(2024, month, day), JournalCode::Miscellaneous)
                .debit(ACCOUNTS[debit], "Débit", cents(amount))
                .credit(ACCOUNTS[credit], "Crédit", cents(amount))
                .build()
                .unwrap()
        })
}

proptest! {
    #[test]
    fn prop_only_balanced_entries_are_stored(
        lines in prop::collection::vec((0..ACCOUNTS.len(), 0i64..10_000, 0i64..10_000), 1..6)
    ) {
        let mut entry = JournalEntry::new(date(2024, 5, 1), JournalCode::Miscellaneous);
        for (account, debit, credit) in &lines {
            entry.add_line(compta_core::EntryLine::new(
                ACCOUNTS[*account],
                "Ligne",
                cents(*debit),
                cents(*credit),
            ));
        }
        let balanced = entry.imbalance().abs() <= cents(1);

        let mut store = LedgerStore::in_memory();
        let inserted = store.insert(entry).is_ok();
        prop_assert_eq!(inserted, balanced);
        prop_assert!(store.snapshot().iter().all(|e| e.is_balanced()));
    }

    #[test]
    fn prop_trial_balance_totals_balance(entries in prop::collection::vec(arb_entry(), 1..20)) {
        let mut store = LedgerStore::in_memory();
        for entry in entries {
            store.insert(entry).unwrap();
        }
        let period = Period::new(date(2024, 4, 1), date(2024, 9, 30)).unwrap();
        let balance = store.trial_balance(
            &AccountDirectory::syscohada(),
            period,
            BalanceFormat::SixColumns,
        );

        prop_assert!(balance.totals.is_balanced());
        prop_assert_eq!(&balance.totals.closing_debit, &balance.totals.closing_credit);
        prop_assert_eq!(
            balance,
            store.trial_balance(&AccountDirectory::syscohada(), period, BalanceFormat::SixColumns)
        );
    }

    #[test]
    fn prop_closing_balances_reopen_next_year(entries in prop::collection::vec(arb_entry(), 1..20)) {
        let mut store = LedgerStore::in_memory();
        for entry in entries {
            store.insert(entry).unwrap();
        }
        let directory = AccountDirectory::syscohada();
        let closing = store
            .trial_balance(&directory, year(2024), BalanceFormat::SixColumns)
            .closing_balances();
        prop_assume!(!closing.is_empty());

        let mut next = LedgerStore::in_memory();
        next.import_opening_balances(date(2024, 12, 31), &closing).unwrap();
        let reopened = next.trial_balance(&directory, year(2025), BalanceFormat::SixColumns);

        prop_assert_eq!(reopened.opening_balances(), closing);
    }
}
