//! `COSE_Sign1` decoding, based on [`coset`].
//!
//! An NZCP pass is a tagged (tag 18) `COSE_Sign1` object whose protected
//! header names the signing algorithm and key ID, and whose payload is a CWT
//! claim set.
//!
//! [`coset`]: <https://crates.io/crates/coset>
use coset::{
    sig_structure_data, Algorithm, CoseSign1, Label, ProtectedHeader, SignatureContext,
    TaggedCborSerializable,
};

use crate::error::Error;
use crate::CborValue;

/// CBOR tag of a `COSE_Sign1` object.
pub const COSE_SIGN1_TAG: u64 = 18;

/// CBOR-encoded `COSE_Sign1` object.
///
/// The bytes are not checked until [`Self::decode`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoseSign1Bytes(Vec<u8>);

impl CoseSign1Bytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decodes the bytes as a tagged `COSE_Sign1` object.
    ///
    /// Untagged objects, other tags, detached payloads and trailing bytes
    /// are all rejected.
    pub fn decode(&self) -> Result<DecodedCoseSign1, Error> {
        let cose = CoseSign1::from_tagged_slice(&self.0)?;
        DecodedCoseSign1::try_from(cose)
    }

    /// Returns the raw CBOR bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for CoseSign1Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Vec<u8>> for CoseSign1Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Protected header parameters of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct CoseHeader {
    /// `alg` (label 1).
    pub alg: Option<Algorithm>,

    /// `kid` (label 4), decoded as UTF-8.
    pub kid: Option<String>,

    /// Any other header parameter, left uninterpreted.
    pub rest: Vec<(Label, CborValue)>,
}

impl TryFrom<&ProtectedHeader> for CoseHeader {
    type Error = Error;

    fn try_from(protected: &ProtectedHeader) -> Result<Self, Self::Error> {
        let header = &protected.header;
        let kid = if header.key_id.is_empty() {
            None
        } else {
            Some(String::from_utf8(header.key_id.clone()).map_err(|_| Error::InvalidKeyId)?)
        };
        Ok(Self {
            alg: header.alg.clone(),
            kid,
            rest: header.rest.clone(),
        })
    }
}

/// Decoded `COSE_Sign1` object.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCoseSign1 {
    /// Protected header, including its original serialization.
    pub protected: ProtectedHeader,

    /// Interpretation of the protected header.
    pub header: CoseHeader,

    /// Payload bytes (the CWT claim set).
    pub payload: Vec<u8>,

    /// Signature bytes.
    pub signature: Vec<u8>,
}

impl DecodedCoseSign1 {
    /// Returns the bytes that were signed: the `Signature1` Sig_structure
    /// with empty external AAD.
    pub fn tbs_data(&self) -> Vec<u8> {
        sig_structure_data(
            SignatureContext::CoseSign1,
            self.protected.clone(),
            None,
            &[],
            &self.payload,
        )
    }
}

impl TryFrom<CoseSign1> for DecodedCoseSign1 {
    type Error = Error;

    fn try_from(value: CoseSign1) -> Result<Self, Self::Error> {
        let header = CoseHeader::try_from(&value.protected)?;
        Ok(Self {
            header,
            protected: value.protected,
            payload: value.payload.ok_or(Error::MissingPayload)?,
            signature: value.signature,
        })
    }
}
