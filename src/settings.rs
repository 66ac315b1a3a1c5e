use super::*;

/// Explicit overrides, taking precedence over `STASH_*` environment variables,
/// which take precedence over the configuration file.
#[derive(Default, Debug, Clone)]
pub struct Options {
  pub chain: Option<Chain>,
  pub config: Option<PathBuf>,
  pub dust_limit: Option<u64>,
  pub esplora_url: Option<String>,
  pub fee_priority: Option<FeePriority>,
  pub timeout_seconds: Option<u64>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub chain: Option<Chain>,
  pub dust_limit: Option<u64>,
  pub esplora_url: Option<String>,
  pub fee_priority: Option<FeePriority>,
  pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
  chain: Chain,
  dust_limit: Amount,
  esplora_url: String,
  fee_priority: FeePriority,
  timeout: Duration,
}

impl Default for Settings {
  fn default() -> Self {
    Self::for_chain(Chain::Mainnet)
  }
}

impl Settings {
  pub const DEFAULT_DUST_LIMIT: Amount = Amount::from_sat(546);
  pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

  pub fn for_chain(chain: Chain) -> Self {
    Self {
      chain,
      dust_limit: Self::DEFAULT_DUST_LIMIT,
      esplora_url: chain.default_esplora_url().into(),
      fee_priority: FeePriority::default(),
      timeout: Self::DEFAULT_TIMEOUT,
    }
  }

  pub fn load(options: Options) -> anyhow::Result<Self> {
    let config_path = match &options.config {
      Some(path) => Some(path.clone()),
      None => Self::setting(None, Some("CONFIG"), None, None)?.map(PathBuf::from),
    };

    let config: Config = match config_path {
      Some(path) => {
        log::debug!("Loading configuration from `{}`", path.display());
        serde_yaml::from_reader(
          File::open(&path).with_context(|| format!("failed to open `{}`", path.display()))?,
        )
        .with_context(|| format!("failed to parse `{}`", path.display()))?
      }
      None => Config::default(),
    };

    let chain = Self::setting_typed(options.chain, Some("CHAIN"), config.chain, Chain::Mainnet)?;

    let dust_limit = Amount::from_sat(Self::setting_typed(
      options.dust_limit,
      Some("DUST_LIMIT"),
      config.dust_limit,
      Self::DEFAULT_DUST_LIMIT.to_sat(),
    )?);

    let esplora_url = Self::setting(
      options.esplora_url.as_deref(),
      Some("ESPLORA_URL"),
      config.esplora_url.as_deref(),
      Some(chain.default_esplora_url()),
    )?
    .unwrap_or_else(|| chain.default_esplora_url().into());

    let fee_priority = Self::setting_typed(
      options.fee_priority,
      Some("FEE_PRIORITY"),
      config.fee_priority,
      FeePriority::default(),
    )?;

    let timeout = Duration::from_secs(Self::setting_typed(
      options.timeout_seconds,
      Some("TIMEOUT_SECONDS"),
      config.timeout_seconds,
      Self::DEFAULT_TIMEOUT.as_secs(),
    )?);

    Ok(Self {
      chain,
      dust_limit,
      esplora_url: esplora_url.trim_end_matches('/').into(),
      fee_priority,
      timeout,
    })
  }

  pub fn chain(&self) -> Chain {
    self.chain
  }

  pub fn network(&self) -> Network {
    self.chain.network()
  }

  pub fn dust_limit(&self) -> Amount {
    self.dust_limit
  }

  pub fn esplora_url(&self) -> &str {
    &self.esplora_url
  }

  pub fn fee_priority(&self) -> FeePriority {
    self.fee_priority
  }

  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  fn setting_typed<T>(
    arg_value: Option<T>,
    env_key: Option<&str>,
    config_value: Option<T>,
    default_value: T,
  ) -> anyhow::Result<T>
  where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
  {
    if let Some(arg_value) = arg_value {
      return Ok(arg_value);
    }

    if let Some(env_key) = env_key {
      let key = format!("STASH_{env_key}");
      match env::var(key) {
        Ok(env_value) => {
          return env_value
            .parse()
            .map_err(Into::<anyhow::Error>::into)
            .with_context(|| anyhow!("failed to parse {env_key}"))
        }
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    if let Some(config_value) = config_value {
      return Ok(config_value);
    }

    Ok(default_value)
  }

  fn setting(
    arg_value: Option<&str>,
    env_key: Option<&str>,
    config_value: Option<&str>,
    default_value: Option<&str>,
  ) -> anyhow::Result<Option<String>> {
    if let Some(arg_value) = arg_value {
      return Ok(Some(arg_value.into()));
    }

    if let Some(env_key) = env_key {
      match env::var(format!("STASH_{env_key}")) {
        Ok(env_value) => return Ok(Some(env_value)),
        Err(err @ env::VarError::NotUnicode(_)) => return Err(err.into()),
        Err(env::VarError::NotPresent) => {}
      }
    }

    Ok(config_value.or(default_value).map(str::to_string))
  }
}

#[cfg(test)]
mod tests {
  use {super::*, std::io::Write};

  fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn setting() {
    assert_eq!(Settings::setting(None, None, None, None).unwrap(), None);

    assert_eq!(
      Settings::setting(None, None, None, Some("foo")).unwrap(),
      Some("foo".into())
    );

    assert_eq!(
      Settings::setting(None, None, Some("bar"), Some("foo")).unwrap(),
      Some("bar".into())
    );

    assert_eq!(
      Settings::setting(Some("qux"), None, Some("bar"), Some("foo")).unwrap(),
      Some("qux".into())
    );

    assert_eq!(
      Settings::setting(Some("qux"), None, None, Some("foo")).unwrap(),
      Some("qux".into()),
    );
  }

  #[test]
  fn setting_environment_overrides_config() {
    env::set_var("STASH_TEST_SETTING_ENVIRONMENT", "env");

    assert_eq!(
      Settings::setting(
        None,
        Some("TEST_SETTING_ENVIRONMENT"),
        Some("config"),
        Some("default")
      )
      .unwrap(),
      Some("env".into())
    );

    assert_eq!(
      Settings::setting(
        Some("arg"),
        Some("TEST_SETTING_ENVIRONMENT"),
        Some("config"),
        None
      )
      .unwrap(),
      Some("arg".into())
    );
  }

  #[test]
  fn setting_typed() {
    assert_eq!(
      Settings::setting_typed(None, None, None, Chain::Mainnet).unwrap(),
      Chain::Mainnet
    );

    assert_eq!(
      Settings::setting_typed(None, None, Some(Chain::Signet), Chain::Mainnet).unwrap(),
      Chain::Signet
    );

    assert_eq!(
      Settings::setting_typed(
        Some(Chain::Regtest),
        None,
        Some(Chain::Signet),
        Chain::Mainnet
      )
      .unwrap(),
      Chain::Regtest
    );
  }

  #[test]
  fn setting_typed_parses_environment() {
    env::set_var("STASH_TEST_SETTING_TYPED", "1000");
    assert_eq!(
      Settings::setting_typed(None, Some("TEST_SETTING_TYPED"), Some(5u64), 0).unwrap(),
      1000
    );

    env::set_var("STASH_TEST_SETTING_TYPED_INVALID", "lots");
    assert_eq!(
      Settings::setting_typed(None, Some("TEST_SETTING_TYPED_INVALID"), None, 0u64)
        .unwrap_err()
        .to_string(),
      "failed to parse TEST_SETTING_TYPED_INVALID"
    );
  }

  #[test]
  fn for_chain() {
    let settings = Settings::for_chain(Chain::Testnet);

    assert_eq!(settings.chain(), Chain::Testnet);
    assert_eq!(settings.network(), Network::Testnet);
    assert_eq!(settings.dust_limit(), Amount::from_sat(546));
    assert_eq!(settings.esplora_url(), "https://blockstream.info/testnet/api");
    assert_eq!(settings.fee_priority(), FeePriority::Medium);
    assert_eq!(settings.timeout(), Duration::from_secs(30));
  }

  #[test]
  fn load_from_config_file() {
    let file = config_file(
      "chain: signet
dust_limit: 1000
esplora_url: http://localhost:3000/
fee_priority: fast
timeout_seconds: 5
",
    );

    let settings = Settings::load(Options {
      config: Some(file.path().into()),
      ..default()
    })
    .unwrap();

    assert_eq!(
      settings,
      Settings {
        chain: Chain::Signet,
        dust_limit: Amount::from_sat(1000),
        esplora_url: "http://localhost:3000".into(),
        fee_priority: FeePriority::Fast,
        timeout: Duration::from_secs(5),
      }
    );
  }

  #[test]
  fn options_override_config_file() {
    let file = config_file("chain: signet\ndust_limit: 1000\n");

    let settings = Settings::load(Options {
      chain: Some(Chain::Regtest),
      config: Some(file.path().into()),
      dust_limit: Some(600),
      ..default()
    })
    .unwrap();

    assert_eq!(settings.chain(), Chain::Regtest);
    assert_eq!(settings.dust_limit(), Amount::from_sat(600));
    assert_eq!(settings.esplora_url(), "http://127.0.0.1:3002");
  }

  #[test]
  fn unknown_config_keys_are_rejected() {
    let file = config_file("chain: signet\nbitcoin_rpc_user: foo\n");

    assert!(Settings::load(Options {
      config: Some(file.path().into()),
      ..default()
    })
    .unwrap_err()
    .to_string()
    .starts_with("failed to parse"));
  }

  #[test]
  fn missing_config_file_is_an_error() {
    assert_eq!(
      Settings::load(Options {
        config: Some("/foo/bar/baz/stash.yaml".into()),
        ..default()
      })
      .unwrap_err()
      .to_string(),
      "failed to open `/foo/bar/baz/stash.yaml`"
    );
  }
}
