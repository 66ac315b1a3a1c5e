use super::*;

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Asset {
  pub symbol: String,
  pub name: String,
  pub decimals: u8,
}

impl Asset {
  pub fn bitcoin() -> Self {
    Self {
      symbol: "BTC".into(),
      name: "Bitcoin".into(),
      decimals: 8,
    }
  }
}

/// A payment in progress. `psbt` holds the base64 BIP174 encoding; every
/// stage decodes it, does its work, and hands back a new draft.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DraftTransaction {
  pub psbt: String,
  pub from: Address<NetworkUnchecked>,
  pub to: Address<NetworkUnchecked>,
  pub asset: Asset,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub amount: Amount,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub fee: Amount,
}

impl DraftTransaction {
  pub fn decode_psbt(&self) -> Result<Psbt> {
    Psbt::deserialize(&base64_decode(&self.psbt).snafu_context(error::PsbtEncoding)?)
      .snafu_context(error::Psbt)
  }

  pub(crate) fn with_psbt(self, psbt: &Psbt) -> Self {
    Self {
      psbt: base64_encode(&psbt.serialize()),
      ..self
    }
  }
}
