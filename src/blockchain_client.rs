use super::*;

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub txid: Txid,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub received: Amount,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub sent: Amount,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub fee: Amount,
  pub block_time: Option<u64>,
}

/// Everything the engine needs from the outside world. All network I/O goes
/// through an implementation of this trait; failures are passed through
/// unchanged as `Error::Network`.
#[allow(async_fn_in_trait)]
pub trait BlockchainClient {
  async fn utxos(&self, address: &Address) -> anyhow::Result<Vec<Utxo>>;

  async fn fee_estimates(&self) -> anyhow::Result<FeeEstimates>;

  /// Consensus-encoded transaction as hex.
  async fn raw_transaction(&self, txid: Txid) -> anyhow::Result<String>;

  async fn broadcast(&self, transaction: &Transaction) -> anyhow::Result<Txid>;

  async fn transaction_history(&self, address: &Address) -> anyhow::Result<Vec<HistoryEntry>>;
}
