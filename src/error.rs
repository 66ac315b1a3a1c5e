use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum Error {
  #[snafu(display("invalid address `{input}`"))]
  AddressParse {
    input: String,
    source: bitcoin::address::ParseError,
  },
  #[snafu(display("address `{address}` is not valid on {network}"))]
  AddressNetwork {
    address: String,
    network: bitcoin::Network,
  },
  #[snafu(display("input {input} is already finalized"))]
  AlreadyFinalized { input: usize },
  #[snafu(display("transaction {txid} has more than one output not paying to the account"))]
  AmbiguousPayment { txid: Txid },
  #[snafu(display("{err}"))]
  Anyhow { err: anyhow::Error },
  #[snafu(display(
    "output value is below dust value: {} sat < {} sat",
    output_value.to_sat(),
    dust_value.to_sat()
  ))]
  Dust {
    output_value: Amount,
    dust_value: Amount,
  },
  #[snafu(display("failed to extract transaction"))]
  Extract {
    source: bitcoin::psbt::ExtractTxError,
  },
  #[snafu(display("new fee rate {requested} sat/vB does not exceed original fee rate {original} sat/vB"))]
  FeeRateTooLow {
    original: FeeRate,
    requested: FeeRate,
  },
  #[snafu(display(
    "replacement fee {} sat is below the minimum of {} sat",
    fee.to_sat(),
    minimum.to_sat()
  ))]
  FeeTooLow { fee: Amount, minimum: Amount },
  #[snafu(display("input {outpoint} does not pay to the account"))]
  ForeignInput { outpoint: OutPoint },
  #[snafu(display(
    "insufficient funds: need {} sat, have {} sat",
    needed.to_sat(),
    available.to_sat()
  ))]
  InsufficientFunds { needed: Amount, available: Amount },
  #[snafu(display("invalid private key"))]
  InvalidPrivateKey,
  #[snafu(display("input {input} could not be signed"))]
  InvalidSignatureInput { input: usize },
  #[snafu(display("failed to derive key"))]
  KeyDerivation { source: bitcoin::bip32::Error },
  #[snafu(display("invalid mnemonic"))]
  Mnemonic { source: bip39::Error },
  #[snafu(display("input {input} has no previous output"))]
  MissingPreviousOutput { input: usize },
  #[snafu(display("input {input} has no signature"))]
  MissingSignature { input: usize },
  #[snafu(display("blockchain client error: {err}"))]
  Network { err: anyhow::Error },
  #[snafu(display("transaction {txid} does not signal replaceability"))]
  NotRbfEligible { txid: Txid },
  #[snafu(display("previous transaction does not match {outpoint}"))]
  PreviousTransactionMismatch { outpoint: OutPoint },
  #[snafu(display("invalid PSBT"))]
  Psbt { source: bitcoin::psbt::Error },
  #[snafu(display("PSBT is not valid base64"))]
  PsbtEncoding { source: base64::DecodeError },
  #[snafu(display("failed to compute signature hash for input {input}"))]
  Sighash {
    input: usize,
    source: Box<dyn std::error::Error + Send + Sync>,
  },
  #[snafu(display("signature for input {input} failed verification"))]
  SignatureVerification { input: usize },
  #[snafu(display("failed to decode transaction"))]
  TransactionDecode {
    source: bitcoin::consensus::encode::FromHexError,
  },
  #[snafu(display("unsupported address type: {script}"))]
  UnsupportedAddressType { script: ScriptBuf },
  #[snafu(display("arithmetic overflow calculating value"))]
  ValueOverflow,
}

impl From<anyhow::Error> for Error {
  fn from(err: anyhow::Error) -> Error {
    Self::Anyhow { err }
  }
}

impl Error {
  pub(crate) fn network(err: anyhow::Error) -> Self {
    Self::Network { err }
  }

  pub(crate) fn sighash<E: std::error::Error + Send + Sync + 'static>(
    input: usize,
  ) -> impl FnOnce(E) -> Self {
    move |source| Self::Sighash {
      input,
      source: Box::new(source),
    }
  }
}

/// `anyhow::Context` is in scope throughout the crate, which shadows
/// `snafu::ResultExt::context`. This trait provides it under a different name.
pub(crate) trait ResultExt<T, E>: Sized {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.context(context)
  }
}
