//! CWT claim set mapping.
//!
//! The payload of an NZCP `COSE_Sign1` is a [CWT](https://www.rfc-editor.org/rfc/rfc8392)
//! claim set: a CBOR map keyed by small integers for the registered claims,
//! plus the text key `vc` carrying the credential itself.
use uuid::Uuid;

use crate::error::Error;
use crate::CborValue;

/// Claim key of the verifiable credential.
pub const VC_CLAIM: &str = "vc";

/// Registered CWT claims.
///
/// See: <https://www.rfc-editor.org/rfc/rfc8392#section-3.1>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisteredClaim {
    Iss,
    Sub,
    Aud,
    Exp,
    Nbf,
    Iat,
    Cti,
}

impl RegisteredClaim {
    pub fn from_i64(key: i64) -> Option<Self> {
        match key {
            1 => Some(Self::Iss),
            2 => Some(Self::Sub),
            3 => Some(Self::Aud),
            4 => Some(Self::Exp),
            5 => Some(Self::Nbf),
            6 => Some(Self::Iat),
            7 => Some(Self::Cti),
            _ => None,
        }
    }

    pub fn to_i64(self) -> i64 {
        match self {
            Self::Iss => 1,
            Self::Sub => 2,
            Self::Aud => 3,
            Self::Exp => 4,
            Self::Nbf => 5,
            Self::Iat => 6,
            Self::Cti => 7,
        }
    }

    /// JWT name of the claim.
    ///
    /// `cti` is exposed under its JWT counterpart `jti`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Iss => "iss",
            Self::Sub => "sub",
            Self::Aud => "aud",
            Self::Exp => "exp",
            Self::Nbf => "nbf",
            Self::Iat => "iat",
            Self::Cti => "jti",
        }
    }
}

/// Claim set key.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimLabel {
    Registered(RegisteredClaim),
    /// The `vc` claim.
    Credential,
    /// Anything else, kept as the raw CBOR key.
    Other(CborValue),
}

impl From<CborValue> for ClaimLabel {
    fn from(key: CborValue) -> Self {
        let registered = key
            .as_integer()
            .and_then(|i| i64::try_from(i).ok())
            .and_then(RegisteredClaim::from_i64);
        if let Some(claim) = registered {
            return Self::Registered(claim);
        }
        match key {
            CborValue::Text(ref text) if text == VC_CLAIM => Self::Credential,
            key => Self::Other(key),
        }
    }
}

/// Decoded CWT claims.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Claims {
    pub iss: Option<String>,
    pub sub: Option<CborValue>,
    pub aud: Option<CborValue>,
    pub exp: Option<i64>,
    pub nbf: Option<i64>,
    pub iat: Option<CborValue>,
    /// `urn:uuid:` reference built from the `cti` claim.
    pub jti: Option<String>,
    pub vc: Option<CborValue>,
    /// Unrecognized claims, under their raw key.
    pub other: Vec<(CborValue, CborValue)>,
}

impl Claims {
    /// Decodes a CBOR-encoded claim set.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Error> {
        let value: CborValue = ciborium::de::from_reader(bytes)?;
        Self::from_value(value)
    }

    pub fn from_value(value: CborValue) -> Result<Self, Error> {
        let entries = match value {
            CborValue::Map(entries) => entries,
            _ => return Err(Error::ExpectedMap),
        };
        let mut claims = Self::default();
        for (key, value) in entries {
            match ClaimLabel::from(key.clone()) {
                ClaimLabel::Registered(claim) => claims.set(claim, value)?,
                ClaimLabel::Credential => claims.vc = Some(value),
                ClaimLabel::Other(_) => claims.other.push((key, value)),
            }
        }
        Ok(claims)
    }

    fn set(&mut self, claim: RegisteredClaim, value: CborValue) -> Result<(), Error> {
        match claim {
            RegisteredClaim::Iss => self.iss = Some(expect_text(claim, value)?),
            RegisteredClaim::Sub => self.sub = Some(value),
            RegisteredClaim::Aud => self.aud = Some(value),
            RegisteredClaim::Exp => self.exp = Some(expect_integer(claim, &value)?),
            RegisteredClaim::Nbf => self.nbf = Some(expect_integer(claim, &value)?),
            RegisteredClaim::Iat => self.iat = Some(value),
            RegisteredClaim::Cti => {
                let bytes = match value {
                    CborValue::Bytes(bytes) => bytes,
                    _ => return Err(Error::InvalidClaim(claim.name())),
                };
                self.jti = Some(token_id_urn(&bytes)?);
            }
        }
        Ok(())
    }
}

/// Formats a 16-byte CWT ID as `urn:uuid:<lowercase hyphenated UUID>`.
pub fn token_id_urn(bytes: &[u8]) -> Result<String, Error> {
    let uuid = Uuid::from_slice(bytes)?;
    Ok(uuid.urn().to_string())
}

fn expect_text(claim: RegisteredClaim, value: CborValue) -> Result<String, Error> {
    match value {
        CborValue::Text(text) => Ok(text),
        _ => Err(Error::InvalidClaim(claim.name())),
    }
}

fn expect_integer(claim: RegisteredClaim, value: &CborValue) -> Result<i64, Error> {
    value
        .as_integer()
        .and_then(|i| i64::try_from(i).ok())
        .ok_or(Error::InvalidClaim(claim.name()))
}
