//! Basic ledger usage example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use compta_core::{
    patterns, AccountDirectory, AccountFilter, BalanceFormat, DocumentInferenceEngine,
    FinancialStatementMapper, LedgerStore, OpeningBalance, Period, Settings, VatCalculation,
    VatRate,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🧾 Compta Core - Basic Ledger Example\n");

    let settings = Settings::load(std::env::args().nth(1).as_deref())?;
    let directory = AccountDirectory::syscohada()
        .with_sub_account("5211", "Banque Atlantique")?
        .with_sub_account("4111", "Clients locaux")?;
    let mut store = LedgerStore::in_memory();

    // 1. Opening balances
    println!("📂 Importing opening balances...");
    let opening_date = NaiveDate::from_ymd_opt(2023, 12, 31).ok_or("invalid date")?;
    store.import_opening_balances(
        opening_date,
        &[
            OpeningBalance::new("5211", BigDecimal::from(2_000_000), BigDecimal::from(0)),
            OpeningBalance::new("101", BigDecimal::from(0), BigDecimal::from(2_000_000)),
        ],
    )?;
    println!("  ✓ {} entry recorded\n", store.len());

    // 2. Everyday operations
    println!("💰 Recording operations...");
    let day = |d: u32| NaiveDate::from_ymd_opt(2024, 3, d).ok_or("invalid date");
    let vat = VatCalculation::calculate(BigDecimal::from(250_000), VatRate::default())?;
    println!(
        "  HT {} + TVA {} = TTC {}",
        vat.base_amount, vat.vat_amount, vat.total_amount
    );
    store.insert(patterns::sale_with_vat(
        day(4)?,
        "4111",
        "4431",
        "706",
        vat.base_amount.clone(),
        vat.vat_amount.clone(),
    )?)?;
    store.insert(patterns::customer_receipt(day(20)?, "5211", "4111", vat.total_amount)?)?;

    // 3. A supplier invoice, read from its text
    println!("\n🔎 Inferring a supplier invoice...");
    let engine = DocumentInferenceEngine::new(settings.engine.clone());
    let outcome = engine.infer(
        "Imprimerie Sahel\n\
         Facture N° IS-2024-031\n\
         Date : 12/03/2024\n\
         Fournisseur : Imprimerie Sahel\n\
         Objet : Impression de catalogues\n\
         Total HT 80 000 FCFA\n\
         TVA 18 % : 14 400 FCFA\n\
         Total TTC 94 400 FCFA",
        Some("achat fournitures"),
        None,
    );
    println!(
        "  {:?} → journal {} ({} lines, review: {})",
        outcome.operation,
        outcome.journal,
        outcome.lines.len(),
        outcome.needs_review()
    );
    for proposed in &outcome.lines {
        println!(
            "    {:<6} D {:>10} C {:>10}",
            proposed.line.account_code, proposed.line.debit, proposed.line.credit
        );
    }
    let id = store.insert(outcome.into_journal_entry(day(31)?)?)?;
    println!("  ✓ Posted as {}", id);

    // 4. Reports
    let period = Period::new(
        settings.report.from.unwrap_or(day(1)?),
        settings.report.to.unwrap_or(day(31)?),
    )?;

    println!("\n📊 Trial balance ({}):", settings.report.format.column_count());
    let balance = store.trial_balance(&directory, period, settings.report.format);
    println!("  {:<6} {:<28} {}", "Compte", "Intitulé", balance.headers().join(" | "));
    for row in &balance.rows {
        let amounts: Vec<String> = row
            .columns(balance.format)
            .iter()
            .map(|a| format!("{:>10}", a))
            .collect();
        println!("  {:<6} {:<28} {}", row.account_code, row.label, amounts.join(" "));
    }
    println!("  Balanced: {}", balance.totals.is_balanced());

    println!("\n🏦 Bank ledger:");
    let ledger = store.account_ledger(AccountFilter::Exact("5211".into()), period);
    println!("  Opening {}", ledger.opening);
    for row in &ledger.rows {
        println!(
            "  {} {:<4} {:<24} {:>10} {:>10} {:>10}",
            row.date, row.journal, row.label, row.debit, row.credit, row.running_balance
        );
    }

    println!("\n📈 Financial statements:");
    let mapper = FinancialStatementMapper::from_document(settings.statement_mapping_document().as_deref());
    let statements = store.financial_statements(&mapper, period);
    println!("  Revenue:  {}", statements.income_statement.revenue);
    println!("  Expenses: {}", statements.income_statement.expenses);
    println!("  Result:   {}", statements.income_statement.result);
    println!(
        "  Assets {} / Liabilities {} / Equity {} (gap {})",
        statements.balance_sheet.assets,
        statements.balance_sheet.liabilities,
        statements.balance_sheet.equity,
        statements.balance_sheet.reconciliation_gap()
    );

    println!("\n✅ Example completed successfully!");
    Ok(())
}
