//! Signs every input of a draft with the account's key.
//!
//! Legacy and segwit v0 inputs get a SIGHASH_ALL ECDSA signature in
//! `partial_sigs`. Taproot inputs get a SIGHASH_DEFAULT key-path Schnorr
//! signature, made with the private key tweaked by the input's taproot tweak,
//! in `tap_key_sig`. Each signature is verified before it is stored.

use super::*;

pub fn sign(draft: DraftTransaction, account: &Account) -> Result<DraftTransaction> {
  let mut psbt = draft.decode_psbt()?;

  sign_psbt(&mut psbt, account)?;

  log::info!(
    "Signed {} inputs of transaction {}",
    psbt.inputs.len(),
    psbt.unsigned_tx.compute_txid()
  );

  Ok(draft.with_psbt(&psbt))
}

pub fn sign_psbt(psbt: &mut Psbt, account: &Account) -> Result {
  let prevouts = psbt
    .inputs
    .iter()
    .zip(&psbt.unsigned_tx.input)
    .enumerate()
    .map(|(index, (input, tx_in))| previous_output(index, input, tx_in))
    .collect::<Result<Vec<TxOut>>>()?;

  for (index, (input, prevout)) in psbt.inputs.iter().zip(&prevouts).enumerate() {
    if input.final_script_sig.is_some() || input.final_script_witness.is_some() {
      return Err(Error::AlreadyFinalized { input: index });
    }

    if !account.owns(&prevout.script_pubkey) {
      return Err(Error::ForeignInput {
        outpoint: psbt.unsigned_tx.input[index].previous_output,
      });
    }
  }

  let mut cache = SighashCache::new(&psbt.unsigned_tx);

  for (index, (input, prevout)) in psbt.inputs.iter_mut().zip(&prevouts).enumerate() {
    match account.address_type() {
      AddressType::Legacy => {
        let sighash = cache
          .legacy_signature_hash(
            index,
            &prevout.script_pubkey,
            EcdsaSighashType::All.to_u32(),
          )
          .map_err(Error::sighash(index))?
          .to_byte_array();

        let (public_key, signature) = sign_ecdsa(account, index, &sighash)?;
        input.partial_sigs.insert(public_key, signature);
      }
      AddressType::NativeSegWit => {
        let sighash = cache
          .p2wpkh_signature_hash(
            index,
            &prevout.script_pubkey,
            prevout.value,
            EcdsaSighashType::All,
          )
          .map_err(Error::sighash(index))?
          .to_byte_array();

        let (public_key, signature) = sign_ecdsa(account, index, &sighash)?;
        input.partial_sigs.insert(public_key, signature);
      }
      AddressType::Taproot => {
        let internal_key = match input.tap_internal_key {
          Some(internal_key) => internal_key,
          None => account.x_only_public_key()?,
        };

        let tweak = TapTweakHash::from_key_and_tweak(internal_key, input.tap_merkle_root)
          .to_scalar()
          .to_be_bytes();

        let sighash = cache
          .taproot_key_spend_signature_hash(
            index,
            &Prevouts::All(prevouts.as_slice()),
            TapSighashType::Default,
          )
          .map_err(Error::sighash(index))?
          .to_byte_array();

        let signature = account
          .signer()
          .sign_schnorr(&sighash, Some(&tweak))
          .ok_or(Error::InvalidSignatureInput { input: index })?;

        // witness v1 program: OP_1 OP_PUSHBYTES_32 <output key>
        let output_key = &prevout.script_pubkey.as_bytes()[2..];

        if !ecc::verify_schnorr(&sighash, output_key, &signature) {
          return Err(Error::SignatureVerification { input: index });
        }

        input.tap_key_sig = Some(taproot::Signature {
          signature: schnorr::Signature::from_slice(&signature)
            .map_err(|_| Error::InvalidSignatureInput { input: index })?,
          sighash_type: TapSighashType::Default,
        });
      }
    }
  }

  Ok(())
}

fn sign_ecdsa(
  account: &Account,
  index: usize,
  sighash: &[u8; 32],
) -> Result<(PublicKey, bitcoin::ecdsa::Signature)> {
  let public_key = account.public_key();

  let signature = account
    .signer()
    .sign_ecdsa(sighash)
    .ok_or(Error::InvalidSignatureInput { input: index })?;

  if !ecc::verify(sighash, &public_key, &signature) {
    return Err(Error::SignatureVerification { input: index });
  }

  Ok((
    PublicKey::from_slice(&public_key).map_err(|_| Error::InvalidSignatureInput { input: index })?,
    bitcoin::ecdsa::Signature {
      signature: secp256k1::ecdsa::Signature::from_compact(&signature)
        .map_err(|_| Error::InvalidSignatureInput { input: index })?,
      sighash_type: EcdsaSighashType::All,
    },
  ))
}

/// The output spent by `tx_in`, taken from `witness_utxo` or, failing that,
/// from the full previous transaction.
pub(crate) fn previous_output(index: usize, input: &psbt::Input, tx_in: &TxIn) -> Result<TxOut> {
  if let Some(witness_utxo) = &input.witness_utxo {
    return Ok(witness_utxo.clone());
  }

  let previous = input
    .non_witness_utxo
    .as_ref()
    .ok_or(Error::MissingPreviousOutput { input: index })?;

  let outpoint = tx_in.previous_output;

  if previous.compute_txid() != outpoint.txid {
    return Err(Error::PreviousTransactionMismatch { outpoint });
  }

  usize::try_from(outpoint.vout)
    .ok()
    .and_then(|vout| previous.output.get(vout))
    .cloned()
    .ok_or(Error::PreviousTransactionMismatch { outpoint })
}
