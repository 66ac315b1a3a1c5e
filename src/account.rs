use super::*;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressType {
  Legacy,
  NativeSegWit,
  Taproot,
}

impl AddressType {
  pub fn from_script(script: &Script) -> Result<Self> {
    if script.is_p2pkh() {
      Ok(Self::Legacy)
    } else if script.is_p2wpkh() {
      Ok(Self::NativeSegWit)
    } else if script.is_p2tr() {
      Ok(Self::Taproot)
    } else {
      Err(Error::UnsupportedAddressType {
        script: script.into(),
      })
    }
  }

  pub fn from_address(address: &Address) -> Result<Self> {
    Self::from_script(&address.script_pubkey())
  }

  /// Virtual size of one signed input spending this address type.
  pub fn input_vbytes(self) -> usize {
    match self {
      Self::Legacy => 148,
      Self::NativeSegWit | Self::Taproot => 68,
    }
  }

  fn purpose(self) -> u32 {
    match self {
      Self::Legacy => 44,
      Self::NativeSegWit => 84,
      Self::Taproot => 86,
    }
  }
}

/// An address together with the signer that controls it. The address is
/// derived once, at construction.
#[derive(Clone)]
pub struct Account {
  address: Address,
  address_type: AddressType,
  network: Network,
  signer: Arc<dyn Signer>,
}

impl fmt::Debug for Account {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_struct("Account")
      .field("address", &self.address)
      .field("address_type", &self.address_type)
      .field("network", &self.network)
      .finish_non_exhaustive()
  }
}

impl Account {
  pub fn new(
    signer: impl Signer + 'static,
    address_type: AddressType,
    network: Network,
  ) -> Result<Self> {
    let public_key =
      CompressedPublicKey::from_slice(&signer.public_key()).map_err(|_| Error::InvalidPrivateKey)?;

    let address = match address_type {
      AddressType::Legacy => Address::p2pkh(public_key.pubkey_hash(), network),
      AddressType::NativeSegWit => Address::p2wpkh(&public_key, network),
      AddressType::Taproot => Address::p2tr(
        SECP256K1,
        XOnlyPublicKey::from(public_key.0),
        None,
        network,
      ),
    };

    log::debug!("Loaded {address_type:?} account {address}");

    Ok(Self {
      address,
      address_type,
      network,
      signer: Arc::new(signer),
    })
  }

  /// Derives the first receive key of account `index` along the BIP44, BIP84
  /// or BIP86 path matching `address_type`.
  pub fn from_xpriv(
    master: &Xpriv,
    address_type: AddressType,
    network: Network,
    index: u32,
  ) -> Result<Self> {
    let path = DerivationPath::master()
      .child(ChildNumber::Hardened {
        index: address_type.purpose(),
      })
      .child(ChildNumber::Hardened {
        index: u32::from(network != Network::Bitcoin),
      })
      .child(ChildNumber::Hardened { index })
      .child(ChildNumber::Normal { index: 0 })
      .child(ChildNumber::Normal { index: 0 });

    let derived = master
      .derive_priv(SECP256K1, &path)
      .snafu_context(error::KeyDerivation)?;

    Self::new(
      PrivateKeySigner::new(derived.private_key.secret_bytes())?,
      address_type,
      network,
    )
  }

  pub fn from_mnemonic(
    phrase: &str,
    passphrase: &str,
    address_type: AddressType,
    network: Network,
    index: u32,
  ) -> Result<Self> {
    let mnemonic = Mnemonic::from_str(phrase).snafu_context(error::Mnemonic)?;

    let master = Xpriv::new_master(network, &mnemonic.to_seed(passphrase))
      .snafu_context(error::KeyDerivation)?;

    Self::from_xpriv(&master, address_type, network, index)
  }

  pub fn address(&self) -> &Address {
    &self.address
  }

  pub fn address_type(&self) -> AddressType {
    self.address_type
  }

  pub fn network(&self) -> Network {
    self.network
  }

  pub fn script_pubkey(&self) -> ScriptBuf {
    self.address.script_pubkey()
  }

  pub fn public_key(&self) -> [u8; 33] {
    self.signer.public_key()
  }

  pub fn x_only_public_key(&self) -> Result<XOnlyPublicKey> {
    XOnlyPublicKey::from_slice(&self.public_key()[1..]).map_err(|_| Error::InvalidPrivateKey)
  }

  pub(crate) fn signer(&self) -> &dyn Signer {
    self.signer.as_ref()
  }

  pub(crate) fn owns(&self, script_pubkey: &Script) -> bool {
    self.address.script_pubkey().as_script() == script_pubkey
  }
}
