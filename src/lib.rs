#![allow(clippy::result_large_err, clippy::too_many_arguments)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::error::ResultExt,
  anyhow::{anyhow, bail, ensure, Context},
  bip39::Mnemonic,
  bitcoin::{
    absolute::LockTime,
    address::{Address, NetworkUnchecked},
    bip32::{ChildNumber, DerivationPath, Xpriv},
    consensus::{self, encode::serialize_hex},
    hashes::Hash,
    key::CompressedPublicKey,
    psbt::{self, Psbt},
    script,
    secp256k1::{self, schnorr, XOnlyPublicKey, SECP256K1},
    sighash::{EcdsaSighashType, Prevouts, SighashCache, TapSighashType},
    taproot::{self, TapTweakHash},
    transaction::Version,
    Amount, Network, OutPoint, PublicKey, Script, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Txid, Witness,
  },
  serde::{Deserialize, Serialize},
  serde_with::{DeserializeFromStr, SerializeDisplay},
  snafu::Snafu,
  std::{
    collections::{BTreeMap, BTreeSet},
    env,
    fmt::{self, Display, Formatter},
    fs::File,
    path::PathBuf,
    str::FromStr,
    sync::Arc,
    time::Duration,
  },
};

pub use self::{
  account::{Account, AddressType},
  blockchain_client::{BlockchainClient, HistoryEntry},
  chain::Chain,
  error::Error,
  esplora::EsploraClient,
  fee_estimates::{FeeEstimates, FeePriority, FeeTarget},
  fee_rate::FeeRate,
  settings::{Options, Settings},
  signer::{PrivateKeySigner, Signer},
  utxo::Utxo,
  wallet::{Asset, DraftTransaction, Wallet},
};


#[cfg(test)]
use self::test::*;

mod account;
mod blockchain_client;
mod chain;
pub mod error;
mod esplora;
mod fee_estimates;
mod fee_rate;
mod macros;
pub mod settings;
mod signer;
mod utxo;
pub mod wallet;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

pub fn base64_encode(data: &[u8]) -> String {
  use base64::Engine;
  base64::engine::general_purpose::STANDARD.encode(data)
}

pub fn base64_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
  use base64::Engine;
  base64::engine::general_purpose::STANDARD.decode(s)
}

fn default<T: Default>() -> T {
  Default::default()
}
