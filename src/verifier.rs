//! Pass verification pipeline.
use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

use crate::claims::Claims;
use crate::cose::CoseSign1Bytes;
use crate::credential::Credential;
use crate::did_resolve::DIDResolver;
use crate::error::{Error, VerificationFailure};
use crate::payload::parse_payload;
use crate::resolve_key::{key_reference, resolve_public_key};
use crate::signature::verify_signature;
use crate::validation::{validate_claims, TrustedIssuers, NZCP_PRODUCTION_ISSUER};

/// Verifier configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct VerifierOptions {
    /// Issuer DIDs whose passes are accepted. An empty list rejects every
    /// pass.
    pub trusted_issuers: Vec<String>,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            trusted_issuers: vec![NZCP_PRODUCTION_ISSUER.to_string()],
        }
    }
}

impl VerifierOptions {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Last stage a pass got through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    Parsed,
    Decoded,
    ClaimsExtracted,
    ClaimsValid,
    KeyResolved,
    SignatureChecked,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Parsed => "parsed",
            Self::Decoded => "decoded",
            Self::ClaimsExtracted => "claims extracted",
            Self::ClaimsValid => "claims valid",
            Self::KeyResolved => "key resolved",
            Self::SignatureChecked => "signature checked",
        };
        f.write_str(name)
    }
}

/// Verifies NZCP passes against a set of trusted issuers.
///
/// Issuer keys are looked up through the DID resolver given at
/// construction. A verifier holds no mutable state and may be shared
/// between tasks.
pub struct Verifier<R> {
    trusted_issuers: TrustedIssuers,
    resolver: R,
}

impl<R: DIDResolver> Verifier<R> {
    /// Verifier trusting the NZ Ministry of Health production issuer.
    pub fn new(resolver: R) -> Self {
        Self::with_options(resolver, VerifierOptions::default())
    }

    pub fn with_options(resolver: R, options: VerifierOptions) -> Self {
        Self {
            trusted_issuers: TrustedIssuers::new(options.trusted_issuers),
            resolver,
        }
    }

    pub fn trusted_issuers(&self) -> &TrustedIssuers {
        &self.trusted_issuers
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Verifies a `NZCP:/1/...` payload at the current time.
    pub async fn verify(&self, payload: &str) -> Result<Credential, VerificationFailure> {
        self.verify_at(payload, Utc::now()).await
    }

    /// Verifies a payload as of `now`.
    ///
    /// The reason for a rejection is logged at debug level and is not
    /// returned.
    pub async fn verify_at(
        &self,
        payload: &str,
        now: DateTime<Utc>,
    ) -> Result<Credential, VerificationFailure> {
        let mut stage = Stage::Start;
        match self.check(payload, now.timestamp(), &mut stage).await {
            Ok(credential) => Ok(credential),
            Err(err) => {
                log::debug!("Pass rejected after stage \"{}\": {}", stage, err);
                Err(VerificationFailure)
            }
        }
    }

    /// Whether the payload is a valid pass at the current time.
    pub async fn is_valid(&self, payload: &str) -> bool {
        self.verify(payload).await.is_ok()
    }

    async fn check(&self, payload: &str, now: i64, stage: &mut Stage) -> Result<Credential, Error> {
        let bytes = parse_payload(payload)?;
        *stage = Stage::Parsed;

        let cose = CoseSign1Bytes::new(bytes).decode()?;
        *stage = Stage::Decoded;

        let claims = Claims::from_cbor(&cose.payload)?;
        *stage = Stage::ClaimsExtracted;

        validate_claims(&claims, &self.trusted_issuers, now)?;
        *stage = Stage::ClaimsValid;

        let key_id = cose.header.kid.as_deref().ok_or(Error::MissingKeyId)?;
        let iss = claims.iss.as_deref().ok_or(Error::MissingClaim("iss"))?;
        let reference = key_reference(iss, key_id);
        let jwk = resolve_public_key(&self.resolver, &reference).await?;
        *stage = Stage::KeyResolved;

        if !verify_signature(&cose, &jwk) {
            return Err(Error::InvalidSignature);
        }
        *stage = Stage::SignatureChecked;

        Credential::try_from(claims)
    }
}
