//! Assembles an unsigned PSBT paying `amount` to a destination from an
//! account's UTXOs.
//!
//! Inputs carry exactly the previous-output data their signer will need:
//! the full previous transaction for legacy inputs, the spent output for
//! segwit v0 and taproot inputs, and additionally the internal key for
//! taproot. The payment is always output 0; change, if any, is output 1 and
//! goes back to the account's own address.

use super::*;

pub struct PsbtBuilder<'a> {
  account: &'a Account,
  amount: Amount,
  destination: Address,
  dust_limit: Amount,
  fee_rate: FeeRate,
  policy: Policy,
}

impl<'a> PsbtBuilder<'a> {
  pub fn new(account: &'a Account, destination: Address, amount: Amount, fee_rate: FeeRate) -> Self {
    Self {
      account,
      amount,
      destination,
      dust_limit: Settings::DEFAULT_DUST_LIMIT,
      fee_rate,
      policy: Policy::LargestFirst,
    }
  }

  /// Parses `input` and checks that it is valid on `network`.
  pub fn parse_destination(input: &str, network: Network) -> Result<Address> {
    let address = input
      .parse::<Address<NetworkUnchecked>>()
      .snafu_context(error::AddressParse { input })?;

    if !address.is_valid_for_network(network) {
      return Err(Error::AddressNetwork {
        address: input.into(),
        network,
      });
    }

    Ok(address.assume_checked())
  }

  pub fn dust_limit(self, dust_limit: Amount) -> Self {
    Self { dust_limit, ..self }
  }

  pub fn policy(self, policy: Policy) -> Self {
    Self { policy, ..self }
  }

  /// Selects inputs and builds the draft in one step. `previous_transactions`
  /// must contain the funding transaction of every selected input when the
  /// account is legacy. It is ignored otherwise.
  pub fn build(
    self,
    utxos: &[Utxo],
    previous_transactions: &BTreeMap<Txid, Transaction>,
  ) -> Result<DraftTransaction> {
    let selection = self.select(utxos)?;
    self.build_selection(selection, previous_transactions)
  }

  /// Rejects a dust payment, then chooses inputs from `utxos`. Callers that
  /// must fetch data for the spent inputs do so between this and
  /// `build_selection`.
  pub fn select(&self, utxos: &[Utxo]) -> Result<Selection> {
    let dust_value = self.destination.script_pubkey().minimal_non_dust();

    if self.amount < dust_value {
      return Err(Error::Dust {
        output_value: self.amount,
        dust_value,
      });
    }

    Ok(self.selector().select(utxos, self.amount)?)
  }

  /// Estimated virtual size of a transaction with `inputs` inputs from this
  /// account, on the same basis the fee is computed.
  pub fn vsize(&self, inputs: usize) -> usize {
    self.selector().vsize(inputs)
  }

  fn selector(&self) -> CoinSelector {
    CoinSelector {
      dust_limit: self.dust_limit,
      fee_rate: self.fee_rate,
      input_vbytes: self.account.address_type().input_vbytes(),
      policy: self.policy,
    }
  }

  pub fn build_selection(
    self,
    selection: Selection,
    previous_transactions: &BTreeMap<Txid, Transaction>,
  ) -> Result<DraftTransaction> {
    let address_type = self.account.address_type();

    let Selection {
      inputs,
      fee,
      change,
    } = selection;

    let mut output = vec![TxOut {
      value: self.amount,
      script_pubkey: self.destination.script_pubkey(),
    }];

    if let Some(change) = change {
      output.push(TxOut {
        value: change,
        script_pubkey: self.account.script_pubkey(),
      });
    }

    let unsigned_tx = Transaction {
      version: Version::TWO,
      lock_time: LockTime::ZERO,
      input: inputs
        .iter()
        .map(|utxo| TxIn {
          previous_output: utxo.outpoint(),
          script_sig: ScriptBuf::new(),
          sequence: utxo.sequence(),
          witness: Witness::new(),
        })
        .collect(),
      output,
    };

    let mut psbt = Psbt::from_unsigned_tx(unsigned_tx).snafu_context(error::Psbt)?;

    for (index, (input, utxo)) in psbt.inputs.iter_mut().zip(&inputs).enumerate() {
      match address_type {
        AddressType::Legacy => {
          input.non_witness_utxo =
            Some(Self::previous_transaction(previous_transactions, index, utxo)?.clone());
        }
        AddressType::NativeSegWit => {
          input.witness_utxo = Some(self.spent_output(utxo));
        }
        AddressType::Taproot => {
          input.witness_utxo = Some(self.spent_output(utxo));
          input.tap_internal_key = Some(self.account.x_only_public_key()?);
        }
      }
    }

    if address_type == AddressType::Taproot && change.is_some() {
      psbt.outputs[1].tap_internal_key = Some(self.account.x_only_public_key()?);
    }

    log::info!(
      "Built transaction {} paying {} sat to {} with {} inputs and {} sat fee",
      psbt.unsigned_tx.compute_txid(),
      self.amount.to_sat(),
      self.destination,
      inputs.len(),
      fee.to_sat(),
    );

    Ok(DraftTransaction {
      psbt: base64_encode(&psbt.serialize()),
      from: self.account.address().clone().into_unchecked(),
      to: self.destination.into_unchecked(),
      asset: Asset::bitcoin(),
      amount: self.amount,
      fee,
    })
  }

  fn spent_output(&self, utxo: &Utxo) -> TxOut {
    TxOut {
      value: utxo.value,
      script_pubkey: self.account.script_pubkey(),
    }
  }

  fn previous_transaction<'t>(
    previous_transactions: &'t BTreeMap<Txid, Transaction>,
    index: usize,
    utxo: &Utxo,
  ) -> Result<&'t Transaction> {
    let transaction = previous_transactions
      .get(&utxo.txid)
      .ok_or(Error::MissingPreviousOutput { input: index })?;

    let value = usize::try_from(utxo.vout)
      .ok()
      .and_then(|vout| transaction.output.get(vout))
      .map(|output| output.value);

    if transaction.compute_txid() != utxo.txid || value != Some(utxo.value) {
      return Err(Error::PreviousTransactionMismatch {
        outpoint: utxo.outpoint(),
      });
    }

    Ok(transaction)
  }
}
