//! Replace-by-fee. The replacement pays the same amount to the same
//! destination, spends the original inputs first, and adds more of the
//! account's UTXOs only if the higher fee needs them.

use super::*;

impl<C: BlockchainClient> Wallet<C> {
  pub async fn bump_fee(
    &self,
    account: &Account,
    txid: Txid,
    fee_target: FeeTarget,
  ) -> Result<DraftTransaction> {
    let original = self.transaction(txid).await?;

    if !original.input.iter().any(|input| input.sequence.is_rbf()) {
      return Err(Error::NotRbfEligible { txid });
    }

    let payment = Self::payment(account, &original, txid)?;

    let destination = Address::from_script(&payment.script_pubkey, account.network()).map_err(
      |_| Error::UnsupportedAddressType {
        script: payment.script_pubkey.clone(),
      },
    )?;

    let (previous_transactions, utxos, fee_rate) = futures::try_join!(
      self.previous_transactions(
        original
          .input
          .iter()
          .map(|input| input.previous_output.txid)
      ),
      self.utxos(account),
      self.fee_rate(fee_target),
    )?;

    let mut candidates = Vec::new();
    let mut input_value = Amount::ZERO;

    for input in &original.input {
      let outpoint = input.previous_output;

      let value = usize::try_from(outpoint.vout)
        .ok()
        .and_then(|vout| previous_transactions.get(&outpoint.txid)?.output.get(vout))
        .filter(|output| account.owns(&output.script_pubkey))
        .map(|output| output.value)
        .ok_or(Error::ForeignInput { outpoint })?;

      input_value = input_value
        .checked_add(value)
        .ok_or(Error::ValueOverflow)?;

      candidates.push(Utxo::new(outpoint, value));
    }

    let output_value = original
      .output
      .iter()
      .map(|output| output.value)
      .try_fold(Amount::ZERO, Amount::checked_add)
      .ok_or(Error::ValueOverflow)?;

    let original_fee = input_value
      .checked_sub(output_value)
      .ok_or(Error::ValueOverflow)?;

    let builder = PsbtBuilder::new(account, destination, payment.value, fee_rate)
      .dust_limit(self.settings.dust_limit())
      .policy(Policy::InputOrder);

    // Both rates are measured on the size estimate the replacement's fee is
    // computed from.
    let original_fee_rate = FeeRate::from_fee(original_fee, builder.vsize(original.input.len()));

    if fee_rate <= original_fee_rate {
      return Err(Error::FeeRateTooLow {
        original: original_fee_rate,
        requested: fee_rate,
      });
    }

    let replaced = candidates
      .iter()
      .map(Utxo::outpoint)
      .collect::<BTreeSet<OutPoint>>();

    candidates.extend(
      utxos
        .into_iter()
        .filter(|utxo| utxo.txid != txid && !replaced.contains(&utxo.outpoint())),
    );

    let selection = builder.select(&candidates)?;

    let minimum = original_fee
      .checked_add(FeeRate::INCREMENTAL_RELAY.fee(builder.vsize(selection.inputs.len())))
      .ok_or(Error::ValueOverflow)?;

    if selection.fee < minimum {
      return Err(Error::FeeTooLow {
        fee: selection.fee,
        minimum,
      });
    }

    let previous_transactions = self
      .spent_transactions(account, &selection, previous_transactions)
      .await?;

    log::info!(
      "Replacing {txid} at {fee_rate} sat/vB, up from {original_fee_rate} sat/vB",
    );

    builder.build_selection(selection, &previous_transactions)
  }

  /// The single output not paying back to the account, or the first output
  /// of a transaction that pays only the account.
  fn payment<'a>(account: &Account, original: &'a Transaction, txid: Txid) -> Result<&'a TxOut> {
    let mut foreign = original
      .output
      .iter()
      .filter(|output| !account.owns(&output.script_pubkey));

    match (foreign.next(), foreign.next()) {
      (Some(payment), None) => Ok(payment),
      (None, _) => original
        .output
        .first()
        .ok_or(Error::AmbiguousPayment { txid }),
      (Some(_), Some(_)) => Err(Error::AmbiguousPayment { txid }),
    }
  }
}
