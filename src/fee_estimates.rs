use super::*;

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct FeeEstimates {
  pub slow: FeeRate,
  pub medium: FeeRate,
  pub fast: FeeRate,
}

impl FeeEstimates {
  pub fn get(&self, priority: FeePriority) -> FeeRate {
    match priority {
      FeePriority::Slow => self.slow,
      FeePriority::Medium => self.medium,
      FeePriority::Fast => self.fast,
    }
  }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeePriority {
  Slow,
  #[default]
  Medium,
  Fast,
}

impl FromStr for FeePriority {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "slow" => Ok(Self::Slow),
      "medium" => Ok(Self::Medium),
      "fast" => Ok(Self::Fast),
      _ => bail!("invalid fee priority: {s}"),
    }
  }
}

impl Display for FeePriority {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Slow => "slow",
        Self::Medium => "medium",
        Self::Fast => "fast",
      }
    )
  }
}

/// Either a priority, resolved against the client's current estimates, or an
/// explicit rate.
#[derive(Debug, PartialEq, Clone, Copy, DeserializeFromStr, SerializeDisplay)]
pub enum FeeTarget {
  Priority(FeePriority),
  Rate(FeeRate),
}

impl FromStr for FeeTarget {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.parse::<FeePriority>() {
      Ok(priority) => Ok(Self::Priority(priority)),
      Err(_) => Ok(Self::Rate(
        s.parse()
          .with_context(|| format!("invalid fee target: {s}"))?,
      )),
    }
  }
}

impl Display for FeeTarget {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Priority(priority) => write!(f, "{priority}"),
      Self::Rate(rate) => write!(f, "{rate}"),
    }
  }
}

impl From<FeePriority> for FeeTarget {
  fn from(priority: FeePriority) -> Self {
    Self::Priority(priority)
  }
}

impl From<FeeRate> for FeeTarget {
  fn from(rate: FeeRate) -> Self {
    Self::Rate(rate)
  }
}
