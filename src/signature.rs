//! `COSE_Sign1` signature verification.
use coset::{iana, Algorithm};
use thiserror::Error;

use crate::cose::DecodedCoseSign1;
use crate::jwk::{KeyError, JWK};
#[cfg(feature = "secp256r1")]
use crate::jwk::CRV_P256;
#[cfg(feature = "secp384r1")]
use crate::jwk::CRV_P384;

#[derive(Error, Debug)]
enum SignatureError {
    #[error("Missing algorithm in COSE header")]
    MissingAlgorithm,
    #[error("Algorithm in COSE header does not match key curve")]
    AlgorithmMismatch,
    #[error("Curve not implemented: '{0}'")]
    CurveNotImplemented(String),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("Invalid signature")]
    InvalidSignature,
}

/// Verifies the signature of a decoded `COSE_Sign1` against an issuer key.
///
/// The ECDSA variant is selected by the curve of the key, and the protected
/// header `alg` must agree with it. Every failure yields `false`.
pub fn verify_signature(cose: &DecodedCoseSign1, key: &JWK) -> bool {
    match verify(cose, key) {
        Ok(()) => true,
        Err(err) => {
            log::debug!("Signature verification failed: {}", err);
            false
        }
    }
}

#[cfg_attr(
    not(any(feature = "secp256r1", feature = "secp384r1")),
    allow(unused_variables)
)]
fn verify(cose: &DecodedCoseSign1, key: &JWK) -> Result<(), SignatureError> {
    let alg = cose
        .header
        .alg
        .as_ref()
        .ok_or(SignatureError::MissingAlgorithm)?;
    let signing_bytes = cose.tbs_data();
    let signature = cose.signature.as_slice();
    match key.curve.as_deref() {
        #[cfg(feature = "secp256r1")]
        Some(CRV_P256) => {
            use p256::ecdsa::signature::Verifier;
            expect_algorithm(alg, iana::Algorithm::ES256)?;
            let public_key = p256::PublicKey::try_from(key)?;
            let verifying_key = p256::ecdsa::VerifyingKey::from(public_key);
            let sig = p256::ecdsa::Signature::try_from(signature)
                .map_err(|_| SignatureError::InvalidSignature)?;
            verifying_key
                .verify(&signing_bytes, &sig)
                .map_err(|_| SignatureError::InvalidSignature)
        }
        #[cfg(feature = "secp384r1")]
        Some(CRV_P384) => {
            use p384::ecdsa::signature::Verifier;
            expect_algorithm(alg, iana::Algorithm::ES384)?;
            let public_key = p384::PublicKey::try_from(key)?;
            let verifying_key = p384::ecdsa::VerifyingKey::from(public_key);
            let sig = p384::ecdsa::Signature::try_from(signature)
                .map_err(|_| SignatureError::InvalidSignature)?;
            verifying_key
                .verify(&signing_bytes, &sig)
                .map_err(|_| SignatureError::InvalidSignature)
        }
        Some(curve) => Err(SignatureError::CurveNotImplemented(curve.to_string())),
        None => Err(KeyError::MissingCurve.into()),
    }
}

#[cfg_attr(
    not(any(feature = "secp256r1", feature = "secp384r1")),
    allow(dead_code)
)]
fn expect_algorithm(alg: &Algorithm, expected: iana::Algorithm) -> Result<(), SignatureError> {
    if *alg != Algorithm::Assigned(expected) {
        return Err(SignatureError::AlgorithmMismatch);
    }
    Ok(())
}
