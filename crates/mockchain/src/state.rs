use super::*;

#[derive(Debug)]
pub struct State {
  pub block_times: BTreeMap<Txid, u64>,
  pub fail_broadcast: bool,
  pub fee_estimates: (f64, f64, f64),
  pub height: u64,
  pub mempool: Vec<Txid>,
  pub network: Network,
  pub nonce: u32,
  pub requests: Vec<String>,
  pub spent: BTreeMap<OutPoint, Txid>,
  pub transactions: BTreeMap<Txid, Transaction>,
  pub utxos: BTreeMap<OutPoint, TxOut>,
}

impl State {
  pub(crate) fn new(network: Network, fee_estimates: (f64, f64, f64), fail_broadcast: bool) -> Self {
    Self {
      block_times: BTreeMap::new(),
      fail_broadcast,
      fee_estimates,
      height: 0,
      mempool: Vec::new(),
      network,
      nonce: 0,
      requests: Vec::new(),
      spent: BTreeMap::new(),
      transactions: BTreeMap::new(),
      utxos: BTreeMap::new(),
    }
  }

  fn block_time(&self) -> u64 {
    GENESIS_TIME + self.height * 600
  }

  pub(crate) fn fund(&mut self, script_pubkey: ScriptBuf, value: Amount) -> OutPoint {
    let transaction = Transaction {
      version: Version::TWO,
      lock_time: LockTime::ZERO,
      input: vec![TxIn {
        previous_output: OutPoint::null(),
        script_sig: script::Builder::new()
          .push_int(self.nonce.into())
          .into_script(),
        sequence: Sequence::MAX,
        witness: Witness::new(),
      }],
      output: vec![TxOut {
        value,
        script_pubkey,
      }],
    };

    self.nonce += 1;

    OutPoint {
      txid: self.insert_confirmed(transaction),
      vout: 0,
    }
  }

  pub(crate) fn insert_confirmed(&mut self, transaction: Transaction) -> Txid {
    self.height += 1;

    let txid = transaction.compute_txid();

    for input in &transaction.input {
      if !input.previous_output.is_null() {
        self.utxos.remove(&input.previous_output);
        self.spent.insert(input.previous_output, txid);
      }
    }

    self.add_outputs(&transaction);
    self.block_times.insert(txid, self.block_time());
    self.transactions.insert(txid, transaction);

    txid
  }

  pub(crate) fn mine_block(&mut self) -> u64 {
    self.height += 1;

    let time = self.block_time();

    for txid in self.mempool.drain(..) {
      self.block_times.insert(txid, time);
    }

    self.height
  }

  fn add_outputs(&mut self, transaction: &Transaction) {
    let txid = transaction.compute_txid();

    for (vout, output) in transaction.output.iter().enumerate() {
      if !output.script_pubkey.is_op_return() {
        self.utxos.insert(
          OutPoint {
            txid,
            vout: vout.try_into().unwrap(),
          },
          output.clone(),
        );
      }
    }
  }

  pub(crate) fn previous_output(&self, outpoint: OutPoint) -> Option<&TxOut> {
    self
      .transactions
      .get(&outpoint.txid)?
      .output
      .get(usize::try_from(outpoint.vout).ok()?)
  }

  fn fee(&self, transaction: &Transaction) -> Option<Amount> {
    let mut input_value = Amount::ZERO;

    for input in &transaction.input {
      input_value += self.previous_output(input.previous_output)?.value;
    }

    input_value.checked_sub(
      transaction
        .output
        .iter()
        .map(|output| output.value)
        .sum::<Amount>(),
    )
  }

  fn signals_replaceability(transaction: &Transaction) -> bool {
    transaction
      .input
      .iter()
      .any(|input| input.sequence < Sequence(0xffff_fffe))
  }

  pub(crate) fn utxos(&self, script_pubkey: &ScriptBuf) -> Vec<(OutPoint, Amount)> {
    self
      .utxos
      .iter()
      .filter(|(_, output)| output.script_pubkey == *script_pubkey)
      .map(|(outpoint, output)| (*outpoint, output.value))
      .collect()
  }

  pub(crate) fn broadcast(&mut self, transaction: Transaction) -> Result<Txid, String> {
    if self.fail_broadcast {
      return Err("broadcast disabled".into());
    }

    let txid = transaction.compute_txid();

    if self.transactions.contains_key(&txid) {
      return Err("txn-already-known".into());
    }

    let mut conflicts = BTreeSet::new();

    for input in &transaction.input {
      if input.script_sig.is_empty() && input.witness.is_empty() {
        return Err("mandatory-script-verify-flag-failed".into());
      }

      if self.utxos.contains_key(&input.previous_output) {
        continue;
      }

      match self.spent.get(&input.previous_output) {
        Some(spender) if self.mempool.contains(spender) => {
          if !Self::signals_replaceability(&self.transactions[spender]) {
            return Err("txn-mempool-conflict".into());
          }
          conflicts.insert(*spender);
        }
        _ => return Err("bad-txns-inputs-missingorspent".into()),
      }
    }

    let fee = self
      .fee(&transaction)
      .ok_or_else(|| "bad-txns-in-belowout".to_string())?;

    let replaced_fees = conflicts
      .iter()
      .filter_map(|conflict| self.fee(&self.transactions[conflict]))
      .sum::<Amount>();

    if !conflicts.is_empty() && fee <= replaced_fees {
      return Err("insufficient fee".into());
    }

    for conflict in conflicts {
      self.evict(conflict);
    }

    for input in &transaction.input {
      self.utxos.remove(&input.previous_output);
      self.spent.insert(input.previous_output, txid);
    }

    self.add_outputs(&transaction);
    self.transactions.insert(txid, transaction);
    self.mempool.push(txid);

    Ok(txid)
  }

  fn evict(&mut self, txid: Txid) {
    self.mempool.retain(|mempool_txid| *mempool_txid != txid);

    let Some(transaction) = self.transactions.remove(&txid) else {
      return;
    };

    for vout in 0..transaction.output.len() {
      self.utxos.remove(&OutPoint {
        txid,
        vout: vout.try_into().unwrap(),
      });
    }

    for input in &transaction.input {
      self.spent.remove(&input.previous_output);

      if let Some(output) = self.previous_output(input.previous_output).cloned() {
        self.utxos.insert(input.previous_output, output);
      }
    }
  }

  pub(crate) fn history(&self, script_pubkey: &ScriptBuf) -> Vec<(Transaction, Option<u64>)> {
    let involves = |transaction: &Transaction| {
      transaction
        .output
        .iter()
        .any(|output| output.script_pubkey == *script_pubkey)
        || transaction.input.iter().any(|input| {
          self
            .previous_output(input.previous_output)
            .is_some_and(|output| output.script_pubkey == *script_pubkey)
        })
    };

    let mut history = self
      .mempool
      .iter()
      .rev()
      .map(|txid| &self.transactions[txid])
      .filter(|transaction| involves(transaction))
      .map(|transaction| (transaction.clone(), None))
      .collect::<Vec<(Transaction, Option<u64>)>>();

    let mut confirmed = self
      .block_times
      .iter()
      .filter_map(|(txid, time)| Some((self.transactions.get(txid)?, *time)))
      .filter(|(transaction, _)| involves(transaction))
      .collect::<Vec<(&Transaction, u64)>>();

    confirmed.sort_by_key(|(_, time)| std::cmp::Reverse(*time));

    history.extend(
      confirmed
        .into_iter()
        .map(|(transaction, time)| (transaction.clone(), Some(time))),
    );

    history
  }
}
