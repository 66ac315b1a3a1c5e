use {
  bitcoin::{
    absolute::LockTime, script, transaction::Version, Address, Amount, Network,
    OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
  },
  state::State,
  std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
  },
};

mod state;

pub const GENESIS_TIME: u64 = 1_700_000_000;

pub fn builder() -> Builder {
  Builder {
    fail_broadcast: false,
    fee_estimates: (1.0, 5.0, 10.0),
    network: Network::Regtest,
  }
}

pub fn spawn() -> Handle {
  builder().build()
}

pub struct Builder {
  fail_broadcast: bool,
  fee_estimates: (f64, f64, f64),
  network: Network,
}

impl Builder {
  pub fn fail_broadcast(self, fail_broadcast: bool) -> Self {
    Self {
      fail_broadcast,
      ..self
    }
  }

  /// Sat/vB estimates reported for slow, medium and fast confirmation.
  pub fn fee_estimates(self, slow: f64, medium: f64, fast: f64) -> Self {
    Self {
      fee_estimates: (slow, medium, fast),
      ..self
    }
  }

  pub fn network(self, network: Network) -> Self {
    Self { network, ..self }
  }

  pub fn build(self) -> Handle {
    Handle {
      state: Arc::new(Mutex::new(State::new(
        self.network,
        self.fee_estimates,
        self.fail_broadcast,
      ))),
    }
  }
}

#[derive(Clone)]
pub struct Handle {
  state: Arc<Mutex<State>>,
}

impl Handle {
  pub fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap()
  }

  pub fn network(&self) -> Network {
    self.state().network
  }

  /// Confirms a new transaction paying `value` to `address` and returns the
  /// funded outpoint.
  #[track_caller]
  pub fn fund(&self, address: &Address, value: Amount) -> OutPoint {
    self.state().fund(address.script_pubkey(), value)
  }

  /// Confirms an arbitrary transaction without checking its inputs.
  pub fn insert_transaction(&self, transaction: Transaction) -> Txid {
    self.state().insert_confirmed(transaction)
  }

  /// Confirms every transaction in the mempool.
  pub fn mine_block(&self) -> u64 {
    self.state().mine_block()
  }

  pub fn set_fee_estimates(&self, slow: f64, medium: f64, fast: f64) {
    self.state().fee_estimates = (slow, medium, fast);
  }

  pub fn set_fail_broadcast(&self, fail_broadcast: bool) {
    self.state().fail_broadcast = fail_broadcast;
  }

  pub fn utxos(&self, address: &Address) -> Vec<(OutPoint, Amount)> {
    let mut state = self.state();
    state.requests.push(format!("utxos {address}"));
    state.utxos(&address.script_pubkey())
  }

  pub fn fee_estimates(&self) -> (f64, f64, f64) {
    let mut state = self.state();
    state.requests.push("fee_estimates".into());
    state.fee_estimates
  }

  pub fn raw_transaction(&self, txid: Txid) -> Option<Transaction> {
    let mut state = self.state();
    state.requests.push(format!("raw_transaction {txid}"));
    state.transactions.get(&txid).cloned()
  }

  pub fn broadcast(&self, transaction: &Transaction) -> Result<Txid, String> {
    let mut state = self.state();
    state
      .requests
      .push(format!("broadcast {}", transaction.compute_txid()));
    state.broadcast(transaction.clone())
  }

  /// Transactions paying to or spending from `address`, mempool first, with
  /// their block time once confirmed.
  pub fn history(&self, address: &Address) -> Vec<(Transaction, Option<u64>)> {
    let mut state = self.state();
    state.requests.push(format!("history {address}"));
    state.history(&address.script_pubkey())
  }

  /// Output spent by `outpoint`, if the transaction that created it is known.
  pub fn previous_output(&self, outpoint: OutPoint) -> Option<TxOut> {
    self.state().previous_output(outpoint).cloned()
  }

  pub fn mempool(&self) -> Vec<Transaction> {
    let state = self.state();
    state
      .mempool
      .iter()
      .map(|txid| state.transactions[txid].clone())
      .collect()
  }

  pub fn requests(&self) -> Vec<String> {
    self.state().requests.clone()
  }

  pub fn is_unspent(&self, outpoint: OutPoint) -> bool {
    self.state().utxos.contains_key(&outpoint)
  }
}
