use super::*;

/// Moves every input's signature into its final script sig or witness and
/// drops the partial signing data. Nothing is modified unless every input
/// can be finalized.
pub fn finalize_psbt(psbt: &mut Psbt) -> Result {
  let mut finals = Vec::new();

  for (index, (input, tx_in)) in psbt.inputs.iter().zip(&psbt.unsigned_tx.input).enumerate() {
    if input.final_script_sig.is_some() || input.final_script_witness.is_some() {
      return Err(Error::AlreadyFinalized { input: index });
    }

    let prevout = previous_output(index, input, tx_in)?;

    let missing_signature = || Error::MissingSignature { input: index };

    finals.push(match AddressType::from_script(&prevout.script_pubkey)? {
      AddressType::Legacy => {
        let (public_key, signature) = input
          .partial_sigs
          .iter()
          .next()
          .ok_or_else(missing_signature)?;

        (
          Some(
            script::Builder::new()
              .push_slice(signature.serialize())
              .push_key(public_key)
              .into_script(),
          ),
          None,
        )
      }
      AddressType::NativeSegWit => {
        let (public_key, signature) = input
          .partial_sigs
          .iter()
          .next()
          .ok_or_else(missing_signature)?;

        (
          None,
          Some(Witness::from_slice(&[
            signature.to_vec(),
            public_key.to_bytes(),
          ])),
        )
      }
      AddressType::Taproot => {
        let signature = input.tap_key_sig.ok_or_else(missing_signature)?;

        (None, Some(Witness::from_slice(&[signature.to_vec()])))
      }
    });
  }

  for (input, (final_script_sig, final_script_witness)) in psbt.inputs.iter_mut().zip(finals) {
    *input = psbt::Input {
      non_witness_utxo: input.non_witness_utxo.take(),
      witness_utxo: input.witness_utxo.take(),
      final_script_sig,
      final_script_witness,
      ..default()
    };
  }

  Ok(())
}

/// Finalizes the draft and extracts the network-serializable transaction.
pub fn finalize(draft: DraftTransaction) -> Result<Transaction> {
  let mut psbt = draft.decode_psbt()?;

  finalize_psbt(&mut psbt)?;

  psbt.extract_tx().snafu_context(error::Extract)
}
