use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] rebase_ledger::LedgerError),

    #[error("vault error: {0}")]
    Vault(#[from] rebase_vault::VaultError),

    #[error("pool error: {0}")]
    Pool(#[from] rebase_pool::PoolError),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
