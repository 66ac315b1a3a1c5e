use super::*;

/// Unspent output as reported by the blockchain client. Deserializes from
/// Esplora's `/address/:address/utxo` entries, ignoring their `status`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Utxo {
  pub txid: Txid,
  pub vout: u32,
  #[serde(with = "bitcoin::amount::serde::as_sat")]
  pub value: Amount,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sequence: Option<Sequence>,
}

impl Utxo {
  pub fn new(outpoint: OutPoint, value: Amount) -> Self {
    Self {
      txid: outpoint.txid,
      vout: outpoint.vout,
      value,
      sequence: None,
    }
  }

  pub fn outpoint(&self) -> OutPoint {
    OutPoint {
      txid: self.txid,
      vout: self.vout,
    }
  }

  pub(crate) fn sequence(&self) -> Sequence {
    self.sequence.unwrap_or(Sequence::ENABLE_RBF_NO_LOCKTIME)
  }
}
