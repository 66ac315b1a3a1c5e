use super::*;

/// Result of tweaking an x-only public key, as used for BIP341 output keys.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct XOnlyTweak {
  /// 0 if the tweaked point has even y, 1 if odd.
  pub parity: u8,
  pub x_only_pubkey: [u8; 32],
}

/// Whether `point` is a compressed or uncompressed SEC1 encoding of a point on
/// the curve.
pub fn is_point(point: &[u8]) -> bool {
  PublicKey::from_slice(point).is_ok()
}

pub fn is_x_only_point(point: &[u8]) -> bool {
  XOnlyPublicKey::from_slice(point).is_ok()
}

/// `a + b`, or `None` if either input is invalid or the sum is the point at
/// infinity.
pub fn point_add(a: &[u8], b: &[u8], compressed: bool) -> Option<Vec<u8>> {
  let a = PublicKey::from_slice(a).ok()?;
  let b = PublicKey::from_slice(b).ok()?;
  a.combine(&b).ok().map(|sum| encode(sum, compressed))
}

/// `point + tweak·G`. Fails for `tweak >= n` and for a sum at infinity.
pub fn point_add_scalar(point: &[u8], tweak: &[u8], compressed: bool) -> Option<Vec<u8>> {
  let point = PublicKey::from_slice(point).ok()?;
  let tweak = to_scalar(tweak)?;
  point
    .add_exp_tweak(SECP256K1, &tweak)
    .ok()
    .map(|point| encode(point, compressed))
}

/// `tweak·point`. A zero tweak would yield infinity and fails.
pub fn point_multiply(point: &[u8], tweak: &[u8], compressed: bool) -> Option<Vec<u8>> {
  let point = PublicKey::from_slice(point).ok()?;
  let tweak = to_scalar(tweak)?;
  point
    .mul_tweak(SECP256K1, &tweak)
    .ok()
    .map(|point| encode(point, compressed))
}

pub fn point_compress(point: &[u8], compressed: bool) -> Option<Vec<u8>> {
  PublicKey::from_slice(point)
    .ok()
    .map(|point| encode(point, compressed))
}

/// `d·G`. Fails unless `0 < d < n`.
pub fn point_from_scalar(d: &[u8], compressed: bool) -> Option<Vec<u8>> {
  let secret_key = SecretKey::from_slice(d).ok()?;
  Some(encode(
    PublicKey::from_secret_key(SECP256K1, &secret_key),
    compressed,
  ))
}

/// Lifts `point` to the even-y point with that x coordinate, adds `tweak·G`,
/// and returns the x coordinate and y parity of the result.
pub fn x_only_point_add_tweak(point: &[u8], tweak: &[u8]) -> Option<XOnlyTweak> {
  let point = XOnlyPublicKey::from_slice(point).ok()?;
  let tweak = to_scalar(tweak)?;
  let (tweaked, parity) = point.add_tweak(SECP256K1, &tweak).ok()?;

  Some(XOnlyTweak {
    parity: parity.to_u8(),
    x_only_pubkey: tweaked.serialize(),
  })
}
