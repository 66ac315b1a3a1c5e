use super::*;

/// Key material behind an account. The engine only ever asks for signatures
/// over 32-byte digests, so implementations are free to keep the private key
/// out of process.
pub trait Signer: Send + Sync {
  /// Compressed SEC1 encoding of the account public key.
  fn public_key(&self) -> [u8; 33];

  /// Low-S compact ECDSA signature over `sighash`.
  fn sign_ecdsa(&self, sighash: &[u8; 32]) -> Option<[u8; 64]>;

  /// BIP340 signature over `message`. When `tweak` is present the private key
  /// is tweaked as BIP341 prescribes before signing.
  fn sign_schnorr(&self, message: &[u8; 32], tweak: Option<&[u8; 32]>) -> Option<[u8; 64]>;
}

/// In-memory signer over a raw private key.
pub struct PrivateKeySigner {
  public_key: [u8; 33],
  secret_key: [u8; 32],
}

impl PrivateKeySigner {
  const AUX_RAND: [u8; 32] = [0; 32];

  pub fn new(secret_key: [u8; 32]) -> Result<Self> {
    let public_key = ecc::point_from_scalar(&secret_key, true)
      .and_then(|point| point.try_into().ok())
      .ok_or(Error::InvalidPrivateKey)?;

    Ok(Self {
      public_key,
      secret_key,
    })
  }
}

impl fmt::Debug for PrivateKeySigner {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_struct("PrivateKeySigner")
      .field("public_key", &hex::encode(self.public_key))
      .finish_non_exhaustive()
  }
}

impl Signer for PrivateKeySigner {
  fn public_key(&self) -> [u8; 33] {
    self.public_key
  }

  fn sign_ecdsa(&self, sighash: &[u8; 32]) -> Option<[u8; 64]> {
    ecc::sign(sighash, &self.secret_key)
  }

  fn sign_schnorr(&self, message: &[u8; 32], tweak: Option<&[u8; 32]>) -> Option<[u8; 64]> {
    match tweak {
      Some(tweak) => ecc::sign_schnorr(
        message,
        &ecc::private_tweak_add(&self.secret_key, tweak)?,
        &Self::AUX_RAND,
      ),
      None => ecc::sign_schnorr(message, &self.secret_key, &Self::AUX_RAND),
    }
  }
}
