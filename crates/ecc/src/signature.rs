use super::*;

/// RFC6979 deterministic ECDSA over a 32-byte hash. The signature is returned
/// in compact `r || s` form with low S.
pub fn sign(hash: &[u8], d: &[u8]) -> Option<[u8; 64]> {
  let message = to_message(hash)?;
  let secret_key = SecretKey::from_slice(d).ok()?;
  Some(
    SECP256K1
      .sign_ecdsa(&message, &secret_key)
      .serialize_compact(),
  )
}

/// Verifies a compact ECDSA signature. High-S signatures are normalized before
/// verification and accepted.
pub fn verify(hash: &[u8], point: &[u8], signature: &[u8]) -> bool {
  try_verify(hash, point, signature).is_some()
}

fn try_verify(hash: &[u8], point: &[u8], signature: &[u8]) -> Option<()> {
  let message = to_message(hash)?;
  let point = PublicKey::from_slice(point).ok()?;
  let mut signature = ecdsa::Signature::from_compact(signature).ok()?;
  signature.normalize_s();
  SECP256K1.verify_ecdsa(&message, &signature, &point).ok()
}

/// BIP340 Schnorr signature over a 32-byte message with 32 bytes of auxiliary
/// randomness.
pub fn sign_schnorr(message: &[u8], d: &[u8], aux: &[u8]) -> Option<[u8; 64]> {
  let message = to_message(message)?;
  let secret_key = SecretKey::from_slice(d).ok()?;
  let aux: &[u8; 32] = aux.try_into().ok()?;
  let keypair = Keypair::from_secret_key(SECP256K1, &secret_key);
  Some(
    SECP256K1
      .sign_schnorr_with_aux_rand(&message, &keypair, aux)
      .serialize(),
  )
}

pub fn verify_schnorr(message: &[u8], x_only_point: &[u8], signature: &[u8]) -> bool {
  try_verify_schnorr(message, x_only_point, signature).is_some()
}

fn try_verify_schnorr(message: &[u8], x_only_point: &[u8], signature: &[u8]) -> Option<()> {
  let message = to_message(message)?;
  let point = XOnlyPublicKey::from_slice(x_only_point).ok()?;
  let signature = schnorr::Signature::from_slice(signature).ok()?;
  SECP256K1.verify_schnorr(&signature, &message, &point).ok()
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    crate::{
      point_from_scalar, private_negate,
      tests::{bytes, private_keys, scalar, G, THREE_G},
    },
    pretty_assertions::assert_eq,
  };

  // sha256("Satoshi Nakamoto")
  const SATOSHI_NAKAMOTO: &str = "a0dc65ffca799873cbea0ac274015b9526505daaaed385155425f7337704883e";

  fn is_low_s(signature: &[u8; 64]) -> bool {
    let half_order = {
      let mut half = [0u8; 32];
      let mut carry = 0;
      for (i, byte) in crate::CURVE_ORDER.iter().enumerate() {
        half[i] = (carry << 7) | (byte >> 1);
        carry = byte & 1;
      }
      half
    };

    signature[32..] <= half_order[..]
  }

  fn high_s(signature: &[u8; 64]) -> [u8; 64] {
    let s = private_negate(&signature[32..]).unwrap();
    let mut high = *signature;
    high[32..].copy_from_slice(&s);
    high
  }

  #[test]
  fn sign_rfc6979_vector() {
    assert_eq!(
      hex::encode(super::sign(&bytes(SATOSHI_NAKAMOTO), &scalar(1)).unwrap()),
      "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8\
       2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
    );
  }

  #[test]
  fn sign_is_deterministic() {
    let hash = [0x5a; 32];
    assert_eq!(
      super::sign(&hash, &scalar(0x42)),
      super::sign(&hash, &scalar(0x42))
    );
    assert_ne!(
      super::sign(&hash, &scalar(0x42)),
      super::sign(&hash, &scalar(0x43))
    );
  }

  #[test]
  fn sign_produces_low_s() {
    for d in private_keys() {
      for hash in [[0; 32], [0x5a; 32], [0xff; 32]] {
        assert!(is_low_s(&super::sign(&hash, &d).unwrap()));
      }
    }
  }

  #[test]
  fn sign_rejects_invalid_input() {
    assert_eq!(super::sign(&[0; 32], &scalar(0)), None);
    assert_eq!(super::sign(&[0; 32], &crate::CURVE_ORDER), None);
    assert_eq!(super::sign(&[0; 31], &scalar(1)), None);
  }

  #[test]
  fn verify() {
    for d in private_keys() {
      let hash = [0x5a; 32];
      let signature = super::sign(&hash, &d).unwrap();

      assert!(super::verify(
        &hash,
        &point_from_scalar(&d, true).unwrap(),
        &signature
      ));
      assert!(super::verify(
        &hash,
        &point_from_scalar(&d, false).unwrap(),
        &signature
      ));
      assert!(!super::verify(&[0xa5; 32], &point_from_scalar(&d, true).unwrap(), &signature));
    }
  }

  #[test]
  fn verify_accepts_high_s() {
    let hash = bytes(SATOSHI_NAKAMOTO);
    let signature = super::sign(&hash, &scalar(1)).unwrap();
    let high = high_s(&signature);

    assert!(!is_low_s(&high));
    assert!(super::verify(&hash, &bytes(G), &high));
  }

  #[test]
  fn verify_rejects_wrong_key_and_malformed_input() {
    let hash = [0x5a; 32];
    let signature = super::sign(&hash, &scalar(1)).unwrap();

    assert!(!super::verify(&hash, &bytes(THREE_G), &signature));
    assert!(!super::verify(&hash, &[0; 33], &signature));
    assert!(!super::verify(&hash, &bytes(G), &signature[..63]));
    assert!(!super::verify(&hash[..31], &bytes(G), &signature));
  }

  #[test]
  fn sign_schnorr_bip340_vector() {
    let signature = super::sign_schnorr(&[0; 32], &scalar(3), &[0; 32]).unwrap();

    assert_eq!(
      hex::encode(signature),
      "e907831f80848d1069a5371b402410364bdf1c5f8307b0084c55f1ce2dca8215\
       25f66a4a85ea8b71e482a74f382d2ce5ebeee8fdb2172f477df4900d310536c0",
    );

    assert!(super::verify_schnorr(
      &[0; 32],
      &bytes(THREE_G)[1..],
      &signature
    ));
  }

  #[test]
  fn sign_schnorr_odd_y_key() {
    let d = crate::tests::scalar_hex(crate::tests::N_MINUS_ONE);
    let point = point_from_scalar(&d, true).unwrap();
    assert_eq!(point[0], 0x03);

    let signature = super::sign_schnorr(&[0x5a; 32], &d, &[0; 32]).unwrap();
    assert!(super::verify_schnorr(&[0x5a; 32], &point[1..], &signature));
  }

  #[test]
  fn verify_schnorr_rejects_tampered_signature() {
    let mut signature = super::sign_schnorr(&[0x5a; 32], &scalar(3), &[0; 32]).unwrap();
    signature[63] ^= 1;

    assert!(!super::verify_schnorr(
      &[0x5a; 32],
      &bytes(THREE_G)[1..],
      &signature
    ));
  }

  #[test]
  fn sign_schnorr_rejects_invalid_input() {
    assert_eq!(super::sign_schnorr(&[0; 32], &scalar(0), &[0; 32]), None);
    assert_eq!(super::sign_schnorr(&[0; 32], &scalar(1), &[0; 31]), None);
    assert_eq!(super::sign_schnorr(&[0; 31], &scalar(1), &[0; 32]), None);
  }
}
