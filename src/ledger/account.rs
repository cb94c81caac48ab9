//! Chart of accounts: code → label → class lookup

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;
use crate::utils::validation::{validate_account_code, validate_account_label};

/// One account of the chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub code: AccountCode,
    pub label: String,
    /// Added by the company on top of the reference chart
    #[serde(default)]
    pub user_defined: bool,
}

impl Account {
    pub fn new(code: impl Into<AccountCode>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            user_defined: false,
        }
    }

    pub fn class(&self) -> Option<u8> {
        self.code.class()
    }

    pub fn nature(&self) -> Option<AccountNature> {
        self.code.nature()
    }
}

/// Immutable-by-default account directory, kept in natural code order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountDirectory {
    accounts: BTreeMap<AccountCode, Account>,
}

impl AccountDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from `(code, label)` pairs
    pub fn from_pairs<I, C, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<AccountCode>,
        L: Into<String>,
    {
        let accounts = pairs
            .into_iter()
            .map(|(code, label)| {
                let account = Account::new(code, label);
                (account.code.clone(), account)
            })
            .collect();
        Self { accounts }
    }

    /// Reference SYSCOHADA chart covering the accounts used by the
    /// default posting templates
    pub fn syscohada() -> Self {
        Self::from_pairs(SYSCOHADA_CHART.iter().copied())
    }

    /// Return a copy extended with a company sub-account
    pub fn with_sub_account(
        &self,
        code: impl Into<AccountCode>,
        label: impl Into<String>,
    ) -> LedgerResult<Self> {
        let code = code.into();
        let label = label.into();
        validate_account_code(&code).map_err(|e| LedgerError::Validation(e.to_string()))?;
        validate_account_label(&label)?;

        if code.nature().is_none() {
            return Err(LedgerError::Validation(format!(
                "Account '{}' has no known class",
                code
            )));
        }
        if self.accounts.contains_key(&code) {
            return Err(LedgerError::Validation(format!(
                "Account '{}' already exists",
                code
            )));
        }

        let mut extended = self.clone();
        extended.accounts.insert(
            code.clone(),
            Account {
                code,
                label,
                user_defined: true,
            },
        );
        Ok(extended)
    }

    pub fn get(&self, code: &AccountCode) -> Option<&Account> {
        self.accounts.get(code)
    }

    /// Label for a code, falling back to the code itself
    pub fn label_for(&self, code: &AccountCode) -> String {
        self.accounts
            .get(code)
            .map(|a| a.label.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// True when the code or one of its parent accounts is in the directory
    pub fn is_known(&self, code: &AccountCode) -> bool {
        self.accounts.contains_key(code)
            || self
                .accounts
                .keys()
                .any(|known| code.starts_with(known))
    }

    /// Direct and indirect sub-accounts of `parent`
    pub fn children_of(&self, parent: &AccountCode) -> Vec<&Account> {
        self.accounts
            .values()
            .filter(|a| a.code != *parent && a.code.starts_with(parent))
            .collect()
    }

    /// Accounts in a class, in natural order
    pub fn accounts_in_class(&self, class: u8) -> Vec<&Account> {
        self.accounts
            .values()
            .filter(|a| a.class() == Some(class))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

const SYSCOHADA_CHART: &[(&str, &str)] = &[
    ("10", "Capital"),
    ("101", "Capital social"),
    ("11", "Réserves"),
    ("12", "Report à nouveau"),
    ("13", "Résultat net de l'exercice"),
    ("16", "Emprunts et dettes assimilées"),
    ("21", "Immobilisations incorporelles"),
    ("22", "Terrains"),
    ("23", "Bâtiments, installations techniques et agencements"),
    ("24", "Matériel, mobilier et actifs biologiques"),
    ("244", "Matériel et mobilier de bureau"),
    ("28", "Amortissements"),
    ("31", "Marchandises"),
    ("32", "Matières premières et fournitures liées"),
    ("40", "Fournisseurs et comptes rattachés"),
    ("401", "Fournisseurs, dettes en compte"),
    ("41", "Clients et comptes rattachés"),
    ("411", "Clients"),
    ("42", "Personnel"),
    ("422", "Personnel, rémunérations dues"),
    ("43", "Organismes sociaux"),
    ("431", "Sécurité sociale"),
    ("44", "État et collectivités publiques"),
    ("4431", "État, TVA facturée sur ventes"),
    ("4452", "État, TVA récupérable sur achats"),
    ("47", "Débiteurs et créditeurs divers"),
    ("471", "Comptes d'attente"),
    ("52", "Banques"),
    ("521", "Banques locales"),
    ("55", "Instruments de monnaie électronique"),
    ("57", "Caisse"),
    ("571", "Caisse siège social"),
    ("60", "Achats et variations de stocks"),
    ("601", "Achats de marchandises"),
    ("605", "Autres achats"),
    ("61", "Transports"),
    ("62", "Services extérieurs A"),
    ("63", "Services extérieurs B"),
    ("64", "Impôts et taxes"),
    ("66", "Charges de personnel"),
    ("661", "Rémunérations directes versées au personnel national"),
    ("664", "Charges sociales"),
    ("67", "Frais financiers et charges assimilées"),
    ("70", "Ventes"),
    ("701", "Ventes de marchandises"),
    ("706", "Services vendus"),
    ("75", "Autres produits"),
    ("77", "Revenus financiers et produits assimilés"),
    ("81", "Valeurs comptables des cessions d'immobilisations"),
    ("82", "Produits des cessions d'immobilisations"),
];
