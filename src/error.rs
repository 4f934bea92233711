//! Error types for `nzcp` crate
use ciborium::de::Error as CborDecodeError;
use coset::CoseError;
use multibase::Error as MultibaseError;
use serde_json::Error as SerdeJSONError;
use std::fmt;
use thiserror::Error;
use uuid::Error as UuidError;

/// Error type for `nzcp`.
///
/// These errors describe why a single pipeline stage rejected a pass. They
/// are only ever logged by [`Verifier`](crate::Verifier), which reports a
/// uniform [`VerificationFailure`] to its caller.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Payload does not start with the `NZCP:/1/` prefix
    #[error("Invalid payload prefix")]
    InvalidPrefix,
    /// Payload body is not valid base32
    #[error("Invalid base32 payload: {0}")]
    Base32(MultibaseError),
    /// COSE structure could not be decoded
    #[error("Invalid COSE structure: {0}")]
    Cose(CoseError),
    /// COSE_Sign1 carries no attached payload
    #[error("Missing COSE payload")]
    MissingPayload,
    /// Key ID in the protected header is absent
    #[error("Missing key ID in COSE header")]
    MissingKeyId,
    /// Key ID in the protected header is not UTF-8
    #[error("Key ID is not UTF-8")]
    InvalidKeyId,
    /// Claim set could not be decoded as CBOR
    #[error("Invalid CBOR claim set: {0}")]
    Cbor(String),
    /// Claim set is not a CBOR map
    #[error("Expected CBOR map for claim set")]
    ExpectedMap,
    /// Registered claim carries a value of the wrong type
    #[error("Invalid claim: {0}")]
    InvalidClaim(&'static str),
    /// Required claim is absent
    #[error("Missing claim: {0}")]
    MissingClaim(&'static str),
    /// `cti` claim is not a 16-byte UUID
    #[error("Invalid CWT token ID: {0}")]
    InvalidTokenId(#[from] UuidError),
    /// `exp` is in the past
    #[error("Expired pass")]
    Expired,
    /// `nbf` is in the future
    #[error("Pass is not yet valid")]
    NotYetValid,
    /// Issuer is not in the trusted issuer list
    #[error("Untrusted issuer: {0}")]
    UntrustedIssuer(String),
    /// DID resolution failed
    #[error("Unable to resolve DID: {0}")]
    DIDResolution(String),
    /// Key reference is not listed as an assertion method
    #[error("Key is not an assertion method: {0}")]
    NotAssertionMethod(String),
    /// No verification method matches the key reference
    #[error("Verification method not found: {0}")]
    VerificationMethodNotFound(String),
    /// Verification method is not a `JsonWebKey2020`
    #[error("Unsupported verification method type: {0}")]
    UnsupportedVerificationMethodType(String),
    /// Verification method has no `publicKeyJwk`
    #[error("Missing publicKeyJwk")]
    MissingKey,
    /// Signature did not verify
    #[error("Invalid signature")]
    InvalidSignature,
    /// Error from `serde_json` crate
    #[error(transparent)]
    SerdeJSON(#[from] SerdeJSONError),
}

impl From<MultibaseError> for Error {
    fn from(err: MultibaseError) -> Self {
        Error::Base32(err)
    }
}

impl From<CoseError> for Error {
    fn from(err: CoseError) -> Self {
        Error::Cose(err)
    }
}

impl<T: fmt::Debug> From<CborDecodeError<T>> for Error {
    fn from(err: CborDecodeError<T>) -> Self {
        Error::Cbor(format!("{:?}", err))
    }
}

/// Outcome of a rejected pass.
///
/// Carries no detail about which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerificationFailure;

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid COVID pass")
    }
}

impl std::error::Error for VerificationFailure {}
