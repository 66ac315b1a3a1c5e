use super::*;

pub fn is_private(d: &[u8]) -> bool {
  SecretKey::from_slice(d).is_ok()
}

/// `(d + tweak) mod n`. Fails if `d` is not a valid private key, if
/// `tweak >= n`, or if the sum is zero.
pub fn private_add(d: &[u8], tweak: &[u8]) -> Option<[u8; 32]> {
  let secret_key = SecretKey::from_slice(d).ok()?;
  let tweak = to_scalar(tweak)?;
  secret_key
    .add_tweak(&tweak)
    .ok()
    .map(|secret_key| secret_key.secret_bytes())
}

/// `n - d`. Fails if `d` is not a valid private key.
pub fn private_negate(d: &[u8]) -> Option<[u8; 32]> {
  SecretKey::from_slice(d)
    .ok()
    .map(|secret_key| secret_key.negate().secret_bytes())
}

/// BIP341 private key tweak. `d` is first replaced by `n - d` if `d·G` has odd
/// y, so that the result signs for the even-y key that `x_only_point_add_tweak`
/// derives from the same x coordinate.
pub fn private_tweak_add(d: &[u8], tweak: &[u8]) -> Option<[u8; 32]> {
  let secret_key = SecretKey::from_slice(d).ok()?;
  let tweak = to_scalar(tweak)?;

  let secret_key = match secret_key.x_only_public_key(SECP256K1).1 {
    Parity::Even => secret_key,
    Parity::Odd => secret_key.negate(),
  };

  secret_key
    .add_tweak(&tweak)
    .ok()
    .map(|secret_key| secret_key.secret_bytes())
}
