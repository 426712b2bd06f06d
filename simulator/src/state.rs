use oowee_types::MIN_BET;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::PlayError;

/// Configuration for a local simulator instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Seed for the die. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Artificial delay applied to every game response.
    pub latency_ms: u64,
    pub min_bet: u64,
    /// Accounts (bearer token -> starting balance) present at startup.
    pub accounts: BTreeMap<String, u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            latency_ms: 0,
            min_bet: MIN_BET,
            accounts: BTreeMap::new(),
        }
    }
}

impl SimulatorConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Point balances keyed by bearer token.
#[derive(Debug, Default)]
pub struct Ledger {
    balances: HashMap<String, u64>,
}

impl Ledger {
    pub fn new(accounts: &BTreeMap<String, u64>) -> Self {
        Self {
            balances: accounts
                .iter()
                .map(|(token, balance)| (token.clone(), *balance))
                .collect(),
        }
    }

    pub fn balance(&self, token: &str) -> Option<u64> {
        self.balances.get(token).copied()
    }

    /// Credit `amount`, opening the account if it does not exist yet.
    pub fn credit(&mut self, token: &str, amount: u64) -> u64 {
        let balance = self.balances.entry(token.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
        *balance
    }

    pub fn debit(&mut self, token: &str, amount: u64) -> Result<u64, PlayError> {
        let balance = self
            .balances
            .get_mut(token)
            .ok_or(PlayError::UnknownAccount)?;
        if *balance < amount {
            return Err(PlayError::InsufficientBalance {
                balance: *balance,
                bet: amount,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_rejects_overdraw_without_touching_balance() {
        let mut ledger = Ledger::default();
        ledger.credit("alice", 500);
        assert_eq!(
            ledger.debit("alice", 600),
            Err(PlayError::InsufficientBalance {
                balance: 500,
                bet: 600
            })
        );
        assert_eq!(ledger.balance("alice"), Some(500));
        assert_eq!(ledger.debit("alice", 500), Ok(0));
    }

    #[test]
    fn debit_unknown_account() {
        let mut ledger = Ledger::default();
        assert_eq!(ledger.debit("bob", 100), Err(PlayError::UnknownAccount));
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: SimulatorConfig = serde_json::from_str(r#"{"latency_ms": 250}"#).unwrap();
        assert_eq!(config.latency(), Duration::from_millis(250));
        assert_eq!(config.min_bet, MIN_BET);
        assert!(config.seed.is_none());
    }
}
