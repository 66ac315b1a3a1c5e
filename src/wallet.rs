use {
  super::*,
  coin_selection::{CoinSelector, Policy, Selection},
  futures::future::try_join_all,
};

pub use {
  draft::{Asset, DraftTransaction},
  finalize::{finalize, finalize_psbt},
  psbt_builder::PsbtBuilder,
  sign::{sign, sign_psbt},
};

use sign::previous_output;

pub mod coin_selection;
mod draft;
mod fee_bump;
mod finalize;
mod psbt_builder;
mod sign;

/// Drives the build, sign, finalize and broadcast pipeline against a
/// `BlockchainClient`. Holds no state beyond the client and settings.
#[derive(Debug)]
pub struct Wallet<C> {
  client: C,
  settings: Settings,
}

impl Wallet<EsploraClient> {
  pub fn from_settings(settings: Settings) -> Result<Self> {
    Ok(Self::new(EsploraClient::from_settings(&settings)?, settings))
  }
}

impl<C: BlockchainClient> Wallet<C> {
  pub fn new(client: C, settings: Settings) -> Self {
    Self { client, settings }
  }

  pub fn client(&self) -> &C {
    &self.client
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  /// Fee target used when the caller does not name one.
  pub fn default_fee_target(&self) -> FeeTarget {
    FeeTarget::Priority(self.settings.fee_priority())
  }

  pub async fn utxos(&self, account: &Account) -> Result<Vec<Utxo>> {
    self
      .client
      .utxos(account.address())
      .await
      .map_err(Error::network)
  }

  pub async fn balance(&self, account: &Account) -> Result<Amount> {
    Ok(
      self
        .utxos(account)
        .await?
        .iter()
        .map(|utxo| utxo.value)
        .sum(),
    )
  }

  pub async fn history(&self, account: &Account) -> Result<Vec<HistoryEntry>> {
    self
      .client
      .transaction_history(account.address())
      .await
      .map_err(Error::network)
  }

  pub async fn fee_estimates(&self) -> Result<FeeEstimates> {
    self.client.fee_estimates().await.map_err(Error::network)
  }

  pub async fn fee_rate(&self, target: FeeTarget) -> Result<FeeRate> {
    match target {
      FeeTarget::Rate(fee_rate) => Ok(fee_rate),
      FeeTarget::Priority(priority) => Ok(self.fee_estimates().await?.get(priority)),
    }
  }

  pub async fn transaction(&self, txid: Txid) -> Result<Transaction> {
    let hex = self
      .client
      .raw_transaction(txid)
      .await
      .map_err(Error::network)?;

    consensus::encode::deserialize_hex(hex.trim()).snafu_context(error::TransactionDecode)
  }

  /// Fetches each distinct transaction once, concurrently, keyed by the txid
  /// it was requested under.
  pub(crate) async fn previous_transactions(
    &self,
    txids: impl IntoIterator<Item = Txid>,
  ) -> Result<BTreeMap<Txid, Transaction>> {
    let txids = txids.into_iter().collect::<BTreeSet<Txid>>();

    let transactions = try_join_all(txids.iter().map(|txid| self.transaction(*txid))).await?;

    Ok(txids.into_iter().zip(transactions).collect())
  }

  pub async fn create_transaction(
    &self,
    account: &Account,
    destination: &str,
    amount: Amount,
    fee_target: FeeTarget,
  ) -> Result<DraftTransaction> {
    let destination = PsbtBuilder::parse_destination(destination, account.network())?;

    let (utxos, fee_rate) = futures::try_join!(self.utxos(account), self.fee_rate(fee_target))?;

    log::info!(
      "Creating payment of {} sat to {destination} from {} UTXOs at {fee_rate} sat/vB",
      amount.to_sat(),
      utxos.len(),
    );

    let builder =
      PsbtBuilder::new(account, destination, amount, fee_rate).dust_limit(self.settings.dust_limit());

    let selection = builder.select(&utxos)?;

    let previous_transactions = self
      .spent_transactions(account, &selection, BTreeMap::new())
      .await?;

    builder.build_selection(selection, &previous_transactions)
  }

  /// Completes `known` with the funding transactions of the selected inputs
  /// when the account is legacy. Other accounts need none.
  pub(crate) async fn spent_transactions(
    &self,
    account: &Account,
    selection: &Selection,
    mut known: BTreeMap<Txid, Transaction>,
  ) -> Result<BTreeMap<Txid, Transaction>> {
    if account.address_type() != AddressType::Legacy {
      return Ok(known);
    }

    let missing = selection
      .inputs
      .iter()
      .map(|utxo| utxo.txid)
      .filter(|txid| !known.contains_key(txid))
      .collect::<Vec<Txid>>();

    known.extend(self.previous_transactions(missing).await?);

    Ok(known)
  }

  pub fn sign(&self, draft: DraftTransaction, account: &Account) -> Result<DraftTransaction> {
    sign(draft, account)
  }

  pub async fn broadcast_transaction(&self, draft: DraftTransaction) -> Result<Txid> {
    let transaction = finalize(draft)?;

    let txid = self
      .client
      .broadcast(&transaction)
      .await
      .inspect_err(|err| {
        log::warn!(
          "Broadcast of {} rejected: {err}",
          transaction.compute_txid()
        )
      })
      .map_err(Error::network)?;

    log::info!("Broadcast transaction {txid}");

    Ok(txid)
  }

  /// Creates, signs, finalizes and broadcasts a payment.
  pub async fn send(
    &self,
    account: &Account,
    destination: &str,
    amount: Amount,
    fee_target: FeeTarget,
  ) -> Result<Txid> {
    let draft = self
      .create_transaction(account, destination, amount, fee_target)
      .await?;

    self
      .broadcast_transaction(self.sign(draft, account)?)
      .await
  }
}
