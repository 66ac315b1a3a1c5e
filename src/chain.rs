use super::*;

#[derive(Default, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
  #[default]
  #[serde(alias = "main")]
  Mainnet,
  #[serde(alias = "test")]
  Testnet,
  Signet,
  Regtest,
}

impl Chain {
  pub fn network(self) -> Network {
    match self {
      Self::Mainnet => Network::Bitcoin,
      Self::Testnet => Network::Testnet,
      Self::Signet => Network::Signet,
      Self::Regtest => Network::Regtest,
    }
  }

  pub(crate) fn default_esplora_url(self) -> &'static str {
    match self {
      Self::Mainnet => "https://blockstream.info/api",
      Self::Testnet => "https://blockstream.info/testnet/api",
      Self::Signet => "https://mempool.space/signet/api",
      Self::Regtest => "http://127.0.0.1:3002",
    }
  }
}

impl FromStr for Chain {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "mainnet" | "main" => Ok(Self::Mainnet),
      "testnet" | "test" => Ok(Self::Testnet),
      "signet" => Ok(Self::Signet),
      "regtest" => Ok(Self::Regtest),
      _ => bail!("invalid chain `{s}`"),
    }
  }
}

impl Display for Chain {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Mainnet => "mainnet",
        Self::Regtest => "regtest",
        Self::Signet => "signet",
        Self::Testnet => "testnet",
      }
    )
  }
}
