use super::*;

/// Fee rate in sat/vB.
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, DeserializeFromStr, SerializeDisplay)]
pub struct FeeRate(f64);

impl FromStr for FeeRate {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::try_from(f64::from_str(s)?)
  }
}

impl TryFrom<f64> for FeeRate {
  type Error = anyhow::Error;

  fn try_from(rate: f64) -> Result<Self, Self::Error> {
    if rate.is_sign_negative() | rate.is_nan() | rate.is_infinite() {
      bail!("invalid fee rate: {rate}")
    }
    Ok(Self(rate))
  }
}

impl Display for FeeRate {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FeeRate {
  /// Minimum rate a replacement must add on top of the fee it replaces.
  pub const INCREMENTAL_RELAY: Self = Self(1.0);

  pub fn n(&self) -> f64 {
    self.0
  }

  /// Fee for `vsize` virtual bytes, rounded up to the next satoshi. The rate
  /// is taken at millisatoshi precision so that decimal rates like 1.1 do not
  /// pick up an extra satoshi from binary rounding.
  pub fn fee(&self, vsize: usize) -> Amount {
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let msat_per_vb = (self.0 * 1000.0).round() as u64;

    Amount::from_sat(
      msat_per_vb
        .saturating_mul(u64::try_from(vsize).unwrap_or(u64::MAX))
        .div_ceil(1000),
    )
  }

  /// Fee rate paid by `fee` over `vsize` virtual bytes.
  #[allow(clippy::cast_precision_loss)]
  pub(crate) fn from_fee(fee: Amount, vsize: usize) -> Self {
    Self(fee.to_sat() as f64 / vsize.max(1) as f64)
  }
}
