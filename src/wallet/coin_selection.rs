//! Accumulative coin selection.
//!
//! Candidates are taken one at a time, in the order the `Policy` dictates,
//! until their sum covers the target plus the fee for a transaction with the
//! selected inputs and two outputs. The fee is re-estimated after every
//! addition, so it always reflects the final input count. Leftover value
//! becomes a change output only when it exceeds the dust limit; otherwise it
//! is paid to miners.

use super::*;

#[derive(Debug, PartialEq)]
pub enum Error {
  InsufficientFunds { needed: Amount, available: Amount },
  ValueOverflow,
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Error::InsufficientFunds { needed, available } => write!(
        f,
        "insufficient funds: need {} sat, have {} sat",
        needed.to_sat(),
        available.to_sat()
      ),
      Error::ValueOverflow => write!(f, "arithmetic overflow calculating value"),
    }
  }
}

impl std::error::Error for Error {}

impl From<Error> for crate::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::InsufficientFunds { needed, available } => Self::InsufficientFunds { needed, available },
      Error::ValueOverflow => Self::ValueOverflow,
    }
  }
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Policy {
  /// Largest value first, ties broken by outpoint.
  LargestFirst,
  /// Candidates in the order given.
  InputOrder,
}

#[derive(Debug, PartialEq)]
pub struct Selection {
  pub inputs: Vec<Utxo>,
  pub fee: Amount,
  pub change: Option<Amount>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CoinSelector {
  pub dust_limit: Amount,
  pub fee_rate: FeeRate,
  pub input_vbytes: usize,
  pub policy: Policy,
}

impl CoinSelector {
  const BASE_VBYTES: usize = 11;
  const OUTPUT_VBYTES: usize = 31;
  const OUTPUTS: usize = 2;

  pub fn vsize(&self, inputs: usize) -> usize {
    Self::BASE_VBYTES + inputs * self.input_vbytes + Self::OUTPUTS * Self::OUTPUT_VBYTES
  }

  fn candidates(&self, utxos: &[Utxo]) -> Vec<Utxo> {
    let mut candidates = utxos.to_vec();

    if self.policy == Policy::LargestFirst {
      candidates.sort_by(|a, b| {
        b.value
          .cmp(&a.value)
          .then_with(|| a.outpoint().cmp(&b.outpoint()))
      });
    }

    candidates
  }

  pub fn select(&self, utxos: &[Utxo], target: Amount) -> Result<Selection> {
    tprintln!(
      "selecting {} sat from {} candidates at {} sat/vB",
      target.to_sat(),
      utxos.len(),
      self.fee_rate
    );

    let mut inputs = Vec::new();
    let mut total = Amount::ZERO;
    let mut needed = target;

    for utxo in self.candidates(utxos) {
      total = total.checked_add(utxo.value).ok_or(Error::ValueOverflow)?;
      inputs.push(utxo);

      let fee = self.fee_rate.fee(self.vsize(inputs.len()));

      needed = target.checked_add(fee).ok_or(Error::ValueOverflow)?;

      tprintln!(
        "added {} sat input, have {} sat, need {} sat",
        utxo.value.to_sat(),
        total.to_sat(),
        needed.to_sat()
      );

      if total >= needed {
        let excess = total - needed;

        let (fee, change) = if excess > self.dust_limit {
          (fee, Some(excess))
        } else {
          tprintln!("absorbed {} sat of dust change into fee", excess.to_sat());
          (fee + excess, None)
        };

        return Ok(Selection {
          inputs,
          fee,
          change,
        });
      }
    }

    if inputs.is_empty() {
      needed = target
        .checked_add(self.fee_rate.fee(self.vsize(1)))
        .ok_or(Error::ValueOverflow)?;
    }

    Err(Error::InsufficientFunds {
      needed,
      available: total,
    })
  }
}
