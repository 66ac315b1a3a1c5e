//! Byte-level secp256k1 arithmetic used for signing and key tweaking.
//!
//! Every function takes and returns plain byte arrays. Inputs that do not
//! decode, and operations whose mathematical result would be the point at
//! infinity or the zero scalar, produce `None` (or `false`), never a
//! placeholder value.
//!
//! All arithmetic goes through libsecp256k1, so private key operations are
//! constant time.

use secp256k1::{
  ecdsa, schnorr, Keypair, Message, Parity, PublicKey, Scalar, SecretKey, XOnlyPublicKey,
  SECP256K1,
};

pub use {
  point::{
    is_point, is_x_only_point, point_add, point_add_scalar, point_compress, point_from_scalar,
    point_multiply, x_only_point_add_tweak, XOnlyTweak,
  },
  scalar::{is_private, private_add, private_negate, private_tweak_add},
  signature::{sign, sign_schnorr, verify, verify_schnorr},
};

/// The order `n` of the secp256k1 group, big-endian.
pub const CURVE_ORDER: [u8; 32] = secp256k1::constants::CURVE_ORDER;

mod point;
mod scalar;
mod signature;

fn encode(point: PublicKey, compressed: bool) -> Vec<u8> {
  if compressed {
    point.serialize().to_vec()
  } else {
    point.serialize_uncompressed().to_vec()
  }
}

fn to_scalar(bytes: &[u8]) -> Option<Scalar> {
  Scalar::from_be_bytes(bytes.try_into().ok()?).ok()
}

fn to_message(bytes: &[u8]) -> Option<Message> {
  Message::from_digest_slice(bytes).ok()
}
