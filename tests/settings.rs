use {super::*, stash::Options};

fn config(contents: &str) -> (TempDir, std::path::PathBuf) {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("stash.yaml");
  fs::File::create(&path)
    .unwrap()
    .write_all(contents.as_bytes())
    .unwrap();
  (dir, path)
}

#[test]
fn config_file_and_overrides() {
  let (_dir, path) = config(
    "chain: signet\ndust_limit: 1000\nesplora_url: https://example.com/api/\nfee_priority: fast\n",
  );

  let settings = Settings::load(Options {
    config: Some(path),
    timeout_seconds: Some(5),
    ..Default::default()
  })
  .unwrap();

  assert_eq!(settings.chain(), Chain::Signet);
  assert_eq!(settings.network(), Network::Signet);
  assert_eq!(settings.dust_limit(), Amount::from_sat(1_000));
  assert_eq!(settings.esplora_url(), "https://example.com/api");
  assert_eq!(settings.fee_priority(), FeePriority::Fast);
  assert_eq!(settings.timeout(), std::time::Duration::from_secs(5));
}

#[test]
fn unknown_config_key_is_rejected() {
  let (_dir, path) = config("colour: blue\n");

  assert!(Settings::load(Options {
    config: Some(path),
    ..Default::default()
  })
  .is_err());
}

#[test]
fn wallet_from_settings() {
  let (_dir, path) = config("chain: regtest\nesplora_url: http://127.0.0.1:3002\n");

  let settings = Settings::load(Options {
    config: Some(path),
    ..Default::default()
  })
  .unwrap();

  let wallet = Wallet::from_settings(settings.clone()).unwrap();

  assert_eq!(wallet.settings(), &settings);
  assert_eq!(wallet.client().url(), "http://127.0.0.1:3002");
}

#[tokio::test]
async fn dust_limit_applies_to_payments() {
  let (_dir, path) = config("chain: regtest\ndust_limit: 10000\n");

  let core = mockchain::spawn();

  let wallet = Wallet::new(
    MockClient(core.clone()),
    Settings::load(Options {
      config: Some(path),
      ..Default::default()
    })
    .unwrap(),
  );

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

  assert_eq!(draft.decode_psbt().unwrap().unsigned_tx.output.len(), 2);

  let draft = wallet
    .create_transaction(
      &account,
      &recipient().to_string(),
      Amount::from_sat(95_000),
      fee_rate(1.0),
    )
    .await
    .unwrap();

  let psbt = draft.decode_psbt().unwrap();
  assert_eq!(psbt.unsigned_tx.output.len(), 1);
  assert_eq!(draft.fee, Amount::from_sat(5_000));
}
