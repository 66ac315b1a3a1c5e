use super::*;

#[tokio::test]
async fn native_segwit_payment() {
  let (core, wallet) = wallet();
  let account = account(AddressType::NativeSegWit);

  core.fund(account.address(), Amount::from_sat(100_000));

  let draft = wallet
    .create_transaction(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      fee_rate(10.0),
    )
    .await
    .unwrap();

  assert_eq!(draft.fee, Amount::from_sat(1_410));

  let signed = wallet.sign(draft, &account).unwrap();

  let psbt = signed.decode_psbt().unwrap();
  assert_eq!(psbt.inputs[0].partial_sigs.len(), 1);
  assert_eq!(psbt.unsigned_tx.input.len(), 1);
  assert_eq!(psbt.unsigned_tx.output.len(), 2);
  assert_eq!(psbt.unsigned_tx.output[1].value, Amount::from_sat(48_590));

  let txid = wallet.broadcast_transaction(signed).await.unwrap();

  let mempool = core.mempool();
  assert_eq!(mempool.len(), 1);
  assert_eq!(mempool[0].compute_txid(), txid);
  assert_eq!(mempool[0].input[0].witness.len(), 2);

  assert_eq!(
    wallet.balance(&account).await.unwrap(),
    Amount::from_sat(48_590)
  );
}

#[tokio::test]
async fn insufficient_funds() {
  let (core, wallet) = wallet();
  let account = account(AddressType::NativeSegWit);

  core.fund(account.address(), Amount::from_sat(50_000));

  assert_matches!(
    wallet
      .create_transaction(
        &account,
        &recipient().to_string(),
        Amount::from_sat(100_000),
        fee_rate(10.0),
      )
      .await,
    Err(Error::InsufficientFunds { needed, available })
      if needed > Amount::from_sat(100_000) && available == Amount::from_sat(50_000)
  );

  assert!(core.mempool().is_empty());
}

#[tokio::test]
async fn taproot_key_path_spend() {
  let (core, wallet) = wallet();
  let account = account(AddressType::Taproot);

  core.fund(account.address(), Amount::from_sat(100_000));

  let txid = wallet
    .send(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      fee_rate(10.0),
    )
    .await
    .unwrap();

  let transaction = core.raw_transaction(txid).unwrap();
  let witness = &transaction.input[0].witness;
  assert_eq!(witness.len(), 1);

  let prevouts = [core
    .previous_output(transaction.input[0].previous_output)
    .unwrap()];

  let sighash = SighashCache::new(&transaction)
    .taproot_key_spend_signature_hash(0, &Prevouts::All(prevouts.as_slice()), TapSighashType::Default)
    .unwrap()
    .to_byte_array();

  let signature = witness.nth(0).unwrap();
  let script_pubkey = account.script_pubkey();
  let output_key = &script_pubkey.as_bytes()[2..];
  let internal_key = account.x_only_public_key().unwrap().serialize();

  assert!(ecc::verify_schnorr(&sighash, output_key, signature));
  assert!(!ecc::verify_schnorr(&sighash, &internal_key, signature));
}

#[tokio::test]
async fn legacy_payment() {
  let (core, wallet) = wallet();
  let account = account(AddressType::Legacy);

  core.fund(account.address(), Amount::from_sat(30_000));
  core.fund(account.address(), Amount::from_sat(40_000));

  let txid = wallet
    .send(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      fee_rate(2.0),
    )
    .await
    .unwrap();

  let transaction = core.raw_transaction(txid).unwrap();

  assert_eq!(transaction.input.len(), 2);
  assert!(transaction
    .input
    .iter()
    .all(|input| !input.script_sig.is_empty() && input.witness.is_empty()));
  assert_eq!(
    transaction.output[1].value,
    Amount::from_sat(70_000 - 50_000 - 2 * 369)
  );
}

#[tokio::test]
async fn fee_priority_follows_estimates() {
  let (core, wallet) = wallet();
  let account = account(AddressType::NativeSegWit);

  core.fund(account.address(), Amount::from_sat(100_000));
  core.set_fee_estimates(2.0, 4.0, 8.0);

  for (priority, fee) in [
    (FeePriority::Slow, 282),
    (FeePriority::Medium, 564),
    (FeePriority::Fast, 1_128),
  ] {
    let draft = wallet
      .create_transaction(
        &account,
        &recipient().to_string(),
        Amount::from_sat(50_000),
        FeeTarget::Priority(priority),
      )
      .await
      .unwrap();

    assert_eq!(draft.fee, Amount::from_sat(fee));
  }

  let draft = wallet
    .create_transaction(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      wallet.default_fee_target(),
    )
    .await
    .unwrap();

  assert_eq!(draft.fee, Amount::from_sat(564));
}

#[tokio::test]
async fn draft_survives_json() {
  let (core, wallet) = wallet();
  let account = account(AddressType::NativeSegWit);

  core.fund(account.address(), Amount::from_sat(100_000));

  let draft = wallet
    .create_transaction(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      fee_rate(1.0),
    )
    .await
    .unwrap();

  let json = serde_json::to_string(&draft).unwrap();
  let decoded = serde_json::from_str::<DraftTransaction>(&json).unwrap();

  pretty_assert_eq!(decoded, draft);

  wallet
    .broadcast_transaction(wallet.sign(decoded, &account).unwrap())
    .await
    .unwrap();
}

#[tokio::test]
async fn broadcast_rejection_is_surfaced() {
  let (core, wallet) = wallet();
  let account = account(AddressType::NativeSegWit);

  core.fund(account.address(), Amount::from_sat(100_000));

  let draft = wallet
    .create_transaction(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      fee_rate(1.0),
    )
    .await
    .unwrap();

  let signed = wallet.sign(draft, &account).unwrap();

  wallet.broadcast_transaction(signed.clone()).await.unwrap();

  assert_matches!(
    wallet.broadcast_transaction(signed).await,
    Err(Error::Network { err }) if err.to_string() == "txn-already-known"
  );
}

#[tokio::test]
async fn unsigned_draft_cannot_be_broadcast() {
  let (core, wallet) = wallet();
  let account = account(AddressType::Taproot);

  core.fund(account.address(), Amount::from_sat(100_000));

  let draft = wallet
    .create_transaction(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      fee_rate(1.0),
    )
    .await
    .unwrap();

  assert_matches!(
    wallet.broadcast_transaction(draft).await,
    Err(Error::MissingSignature { input: 0 })
  );

  assert!(!core
    .requests()
    .iter()
    .any(|request| request.starts_with("broadcast")));
}

#[tokio::test]
async fn history_tracks_payments() {
  let (core, wallet) = wallet();
  let account = account(AddressType::NativeSegWit);

  core.fund(account.address(), Amount::from_sat(100_000));

  let txid = wallet
    .send(
      &account,
      &recipient().to_string(),
      Amount::from_sat(50_000),
      fee_rate(10.0),
    )
    .await
    .unwrap();

  let history = wallet.history(&account).await.unwrap();

  assert_eq!(history.len(), 2);
  pretty_assert_eq!(
    history[0],
    HistoryEntry {
      txid,
      received: Amount::from_sat(48_590),
      sent: Amount::from_sat(100_000),
      fee: Amount::from_sat(1_410),
      block_time: None,
    }
  );
  assert_eq!(history[1].received, Amount::from_sat(100_000));
  assert!(history[1].block_time.is_some());

  core.mine_block();

  assert!(wallet.history(&account).await.unwrap()[0]
    .block_time
    .is_some());
}
