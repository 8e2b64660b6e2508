//! Wiring of the token core from an [`AppConfig`].

use std::sync::Arc;

use alloy::primitives::Address;

use crate::blockchain::{ContractConnector, TokenReader};
use crate::config::validation::ValidationError;
use crate::config::{AppConfig, ConfigError};
use crate::notice::Notifier;
use crate::session::{SessionWatcher, WalletProvider};
use crate::token::balance::BalanceReader;
use crate::token::binding::ContractBinding;
use crate::token::gate::ChainGate;
use crate::token::orchestrator::TransactionOrchestrator;

/// The assembled core: one gate, one balance owner, one orchestrator.
pub struct TokenConsole {
    wallet: Arc<dyn WalletProvider>,
    gate: ChainGate,
    balances: Arc<BalanceReader>,
    orchestrator: TransactionOrchestrator,
    notifier: Arc<dyn Notifier>,
    symbol: String,
}

impl TokenConsole {
    pub fn new(
        config: &AppConfig,
        wallet: Arc<dyn WalletProvider>,
        reader: Arc<dyn TokenReader>,
        connector: Arc<dyn ContractConnector>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        let contract = parse_contract(&config.token.contract_address)?;
        let symbol = config.token.symbol.clone();
        let gate = ChainGate::new(&config.network);
        let balances = Arc::new(BalanceReader::new(reader, contract));
        let binding = ContractBinding::new(wallet.clone(), connector, contract);
        let orchestrator = TransactionOrchestrator::new(
            wallet.clone(),
            gate.clone(),
            binding,
            balances.clone(),
            notifier.clone(),
            symbol.clone(),
        );

        Ok(Self {
            wallet,
            gate,
            balances,
            orchestrator,
            notifier,
            symbol,
        })
    }

    pub fn orchestrator(&self) -> &TransactionOrchestrator {
        &self.orchestrator
    }

    pub fn balances(&self) -> &Arc<BalanceReader> {
        &self.balances
    }

    pub fn gate(&self) -> &ChainGate {
        &self.gate
    }

    pub fn wallet(&self) -> &Arc<dyn WalletProvider> {
        &self.wallet
    }

    /// A watcher sharing this console's balance and notifier.
    pub fn watcher(&self) -> SessionWatcher {
        SessionWatcher::new(
            self.wallet.clone(),
            self.gate.clone(),
            self.balances.clone(),
            self.notifier.clone(),
            self.symbol.clone(),
        )
    }
}

fn parse_contract(raw: &str) -> Result<Address, ConfigError> {
    raw.trim().parse().map_err(|e| {
        ConfigError::Validation(vec![ValidationError::new(
            "token.contract_address",
            format!("'{}' is not a valid address: {}", raw, e),
        )])
    })
}
