use {super::*, serde::de::DeserializeOwned};

/// `BlockchainClient` backed by an Esplora REST API.
#[derive(Debug, Clone)]
pub struct EsploraClient {
  client: reqwest::Client,
  url: String,
}

#[derive(Deserialize)]
struct EsploraTransaction {
  txid: Txid,
  vin: Vec<EsploraInput>,
  vout: Vec<EsploraOutput>,
  fee: u64,
  status: EsploraStatus,
}

#[derive(Deserialize)]
struct EsploraInput {
  prevout: Option<EsploraOutput>,
}

#[derive(Deserialize)]
struct EsploraOutput {
  scriptpubkey: ScriptBuf,
  value: u64,
}

#[derive(Deserialize)]
struct EsploraStatus {
  block_time: Option<u64>,
}

impl EsploraTransaction {
  fn history_entry(self, script_pubkey: &Script) -> HistoryEntry {
    let received = self
      .vout
      .iter()
      .filter(|output| output.scriptpubkey.as_script() == script_pubkey)
      .map(|output| Amount::from_sat(output.value))
      .sum::<Amount>();

    let sent = self
      .vin
      .iter()
      .filter_map(|input| input.prevout.as_ref())
      .filter(|prevout| prevout.scriptpubkey.as_script() == script_pubkey)
      .map(|prevout| Amount::from_sat(prevout.value))
      .sum::<Amount>();

    HistoryEntry {
      txid: self.txid,
      received,
      sent,
      fee: if sent > Amount::ZERO {
        Amount::from_sat(self.fee)
      } else {
        Amount::ZERO
      },
      block_time: self.status.block_time,
    }
  }
}

impl EsploraClient {
  /// Confirmation targets, in blocks, for slow, medium and fast estimates.
  const TARGETS: [&'static str; 3] = ["6", "3", "1"];

  pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
    Ok(Self {
      client: reqwest::Client::builder().timeout(timeout).build()?,
      url: url.trim_end_matches('/').into(),
    })
  }

  pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
    Self::new(settings.esplora_url(), settings.timeout())
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  async fn get(&self, path: &str) -> anyhow::Result<reqwest::Response> {
    let url = format!("{}{path}", self.url);

    log::debug!("GET {url}");

    self
      .client
      .get(&url)
      .send()
      .await
      .with_context(|| format!("failed to fetch `{url}`"))?
      .error_for_status()
      .with_context(|| format!("request to `{url}` failed"))
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
    self
      .get(path)
      .await?
      .json()
      .await
      .with_context(|| format!("failed to decode response from `{path}`"))
  }

  fn fee_estimates_from_targets(targets: &BTreeMap<String, f64>) -> anyhow::Result<FeeEstimates> {
    let [slow, medium, fast] = Self::TARGETS.map(|target| {
      targets
        .get(target)
        .copied()
        .map(f64::ceil)
        .ok_or_else(|| anyhow!("missing fee estimate for {target} block target"))
        .and_then(FeeRate::try_from)
    });

    Ok(FeeEstimates {
      slow: slow?,
      medium: medium?,
      fast: fast?,
    })
  }
}

impl BlockchainClient for EsploraClient {
  async fn utxos(&self, address: &Address) -> anyhow::Result<Vec<Utxo>> {
    self.get_json(&format!("/address/{address}/utxo")).await
  }

  async fn fee_estimates(&self) -> anyhow::Result<FeeEstimates> {
    Self::fee_estimates_from_targets(&self.get_json("/fee-estimates").await?)
  }

  async fn raw_transaction(&self, txid: Txid) -> anyhow::Result<String> {
    Ok(self.get(&format!("/tx/{txid}/hex")).await?.text().await?)
  }

  async fn broadcast(&self, transaction: &Transaction) -> anyhow::Result<Txid> {
    let url = format!("{}/tx", self.url);

    log::info!("Broadcasting transaction {}", transaction.compute_txid());

    let response = self
      .client
      .post(&url)
      .body(serialize_hex(transaction))
      .send()
      .await
      .with_context(|| format!("failed to post to `{url}`"))?;

    let status = response.status();
    let body = response.text().await?;

    ensure!(status.is_success(), "broadcast rejected with {status}: {body}");

    body
      .trim()
      .parse()
      .with_context(|| format!("invalid txid in broadcast response: {body}"))
  }

  async fn transaction_history(&self, address: &Address) -> anyhow::Result<Vec<HistoryEntry>> {
    let script_pubkey = address.script_pubkey();

    Ok(
      self
        .get_json::<Vec<EsploraTransaction>>(&format!("/address/{address}/txs"))
        .await?
        .into_iter()
        .map(|transaction| transaction.history_entry(&script_pubkey))
        .collect(),
    )
  }
}
