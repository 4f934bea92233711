//! Verified pass contents.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::TryFrom;

use crate::claims::Claims;
use crate::error::Error;
use crate::CborValue;

pub const DEFAULT_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";
pub const NZCP_CONTEXT: &str = "https://nzcp.covid19.health.nz/contexts/v1";
pub const TYPE_VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";
pub const TYPE_PUBLIC_COVID_PASS: &str = "PublicCovidPass";

/// A verified public COVID pass.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Credential {
    pub iss: String,
    pub nbf: i64,
    pub exp: i64,
    pub vc: VerifiableCredential,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub version: String,
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    pub credential_subject: CredentialSubject,
    #[serde(flatten)]
    pub property_set: BTreeMap<String, CborValue>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    pub given_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Date of birth, `YYYY-MM-DD`.
    pub dob: String,
    #[serde(flatten)]
    pub property_set: BTreeMap<String, CborValue>,
}

impl TryFrom<Claims> for Credential {
    type Error = Error;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let vc = claims.vc.ok_or(Error::MissingClaim("vc"))?;
        let vc: VerifiableCredential = vc
            .deserialized()
            .map_err(|_| Error::InvalidClaim("vc"))?;
        Ok(Self {
            iss: claims.iss.ok_or(Error::MissingClaim("iss"))?,
            nbf: claims.nbf.ok_or(Error::MissingClaim("nbf"))?,
            exp: claims.exp.ok_or(Error::MissingClaim("exp"))?,
            vc,
            jti: claims.jti,
        })
    }
}
