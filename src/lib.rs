//! Verification of New Zealand COVID Passes (NZCP).
//!
//! A pass is a `NZCP:/1/<base32>` string wrapping a CBOR Web Token signed
//! as a [`COSE_Sign1`][cose] message. Verifying it means decoding the
//! envelope, checking the validity window and the issuer, resolving the
//! issuer's public key from its [DID document][dids], and checking the
//! ECDSA signature.
//!
//! [cose]: <https://www.rfc-editor.org/rfc/rfc8152>
//! [dids]: <https://www.w3.org/TR/did-core/>
//!
//! # Basic Usage
//!
//! ```ignore
//! use nzcp::{CachingResolver, Verifier};
//! use did_web::DIDWeb;
//!
//! let verifier = Verifier::new(CachingResolver::new(DIDWeb::default()));
//! match verifier.verify(pass).await {
//!     Ok(credential) => println!("{}", credential.vc.credential_subject.given_name),
//!     Err(failure) => println!("{}", failure),
//! }
//! ```
//!
//! Failures are opaque: the reason a pass was rejected is only logged, at
//! debug level, through the [`log`] facade.

pub mod claims;
pub mod cose;
pub mod credential;
pub mod did;
pub mod did_resolve;
pub mod error;
pub mod jwk;
pub mod payload;
pub mod resolve_key;
pub mod signature;
pub mod validation;
pub mod verifier;

pub use ciborium::Value as CborValue;

pub use credential::Credential;
pub use did_resolve::{CachingResolver, DIDResolver};
pub use error::{Error, VerificationFailure};
pub use jwk::JWK;
pub use validation::TrustedIssuers;
pub use verifier::{Verifier, VerifierOptions};
