use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

// RFC 7517 - JSON Web Key (JWK)
// RFC 7518 - JSON Web Algorithms (JWA)

/// base64url, accepting input with or without padding.
const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub const KTY_EC: &str = "EC";
pub const CRV_P256: &str = "P-256";
pub const CRV_P384: &str = "P-384";

/// Public key material of a `JsonWebKey2020` verification method.
///
/// Each component is decoded from base64url independently. Components
/// absent from the source key are `None`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct JWK {
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "crv")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(rename = "alg")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(rename = "x")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_coordinate: Option<Base64urlUInt>,
    #[serde(rename = "y")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_coordinate: Option<Base64urlUInt>,
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Base64urlUInt>,
    #[serde(rename = "k")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_value: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
#[serde(into = "Base64urlUIntString")]
pub struct Base64urlUInt(pub Vec<u8>);
type Base64urlUIntString = String;

impl Base64urlUInt {
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl TryFrom<String> for Base64urlUInt {
    type Error = base64::DecodeError;
    fn try_from(data: String) -> Result<Self, Self::Error> {
        Ok(Base64urlUInt(BASE64URL.decode(data)?))
    }
}

impl From<&Base64urlUInt> for String {
    fn from(data: &Base64urlUInt) -> String {
        BASE64URL.encode(&data.0)
    }
}

impl From<Base64urlUInt> for Base64urlUIntString {
    fn from(data: Base64urlUInt) -> Base64urlUIntString {
        String::from(&data)
    }
}

/// Error converting a [`JWK`] into a verifying key.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),
    #[error("Missing curve in JWK")]
    MissingCurve,
    #[error("Curve not implemented: '{0}'")]
    CurveNotImplemented(String),
    #[error("Missing elliptic curve point in JWK")]
    MissingPoint,
    #[error("Invalid elliptic curve point")]
    InvalidPoint,
}

const EC_UNCOMPRESSED_POINT_TAG: &[u8] = &[0x04];

impl JWK {
    /// SEC1 uncompressed encoding of the public point, for the given curve.
    fn ec_point(&self, expected_curve: &str) -> Result<Vec<u8>, KeyError> {
        if self.key_type != KTY_EC {
            return Err(KeyError::UnsupportedKeyType(self.key_type.clone()));
        }
        let curve = self.curve.as_ref().ok_or(KeyError::MissingCurve)?;
        if curve != expected_curve {
            return Err(KeyError::CurveNotImplemented(curve.to_string()));
        }
        let x = &self.x_coordinate.as_ref().ok_or(KeyError::MissingPoint)?.0;
        let y = &self.y_coordinate.as_ref().ok_or(KeyError::MissingPoint)?.0;
        Ok([EC_UNCOMPRESSED_POINT_TAG, x.as_slice(), y.as_slice()].concat())
    }
}

#[cfg(feature = "secp256r1")]
impl TryFrom<&JWK> for p256::PublicKey {
    type Error = KeyError;
    fn try_from(jwk: &JWK) -> Result<Self, Self::Error> {
        let pk_data = jwk.ec_point(CRV_P256)?;
        p256::PublicKey::from_sec1_bytes(&pk_data).map_err(|_| KeyError::InvalidPoint)
    }
}

#[cfg(feature = "secp384r1")]
impl TryFrom<&JWK> for p384::PublicKey {
    type Error = KeyError;
    fn try_from(jwk: &JWK) -> Result<Self, Self::Error> {
        let pk_data = jwk.ec_point(CRV_P384)?;
        p384::PublicKey::from_sec1_bytes(&pk_data).map_err(|_| KeyError::InvalidPoint)
    }
}
