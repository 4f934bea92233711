use std::collections::HashMap as Map;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jwk::JWK;

// ***********************************************
// * Data Structures for Decentralized Identifiers
// * https://www.w3.org/TR/did-core/
// ***********************************************

pub const DEFAULT_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Verification method type of the keys NZCP issuers publish.
pub const TYPE_JSON_WEB_KEY_2020: &str = "JsonWebKey2020";

type DID = String;
type DIDURL = String;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "@context")]
    pub context: Contexts,
    pub id: DID,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<OneOrMany<DID>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<VerificationMethod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<VerificationMethod>>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Contexts {
    One(String),
    Many(Vec<Value>),
}

/// Entry of a verification relationship: either a reference to a method
/// declared elsewhere, or an embedded method.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum VerificationMethod {
    DIDURL(DIDURL),
    Map(VerificationMethodMap),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethodMap {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub controller: DID,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<JWK>,
    #[serde(flatten)]
    pub property_set: Option<Map<String, Value>>,
}

impl VerificationMethod {
    pub fn id(&self) -> &str {
        match self {
            Self::DIDURL(id) => id,
            Self::Map(map) => &map.id,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Document {
            context: Contexts::One(DEFAULT_CONTEXT.to_string()),
            id: "".to_string(),
            controller: None,
            verification_method: None,
            authentication: None,
            assertion_method: None,
            property_set: None,
        }
    }
}

impl Document {
    pub fn new(id: &str) -> Document {
        Document {
            id: String::from(id),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Document, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_bytes(json: &[u8]) -> Result<Document, serde_json::Error> {
        serde_json::from_slice(json)
    }

    /// Whether `id` is listed, by reference, under `assertionMethod`.
    ///
    /// Embedded methods do not count: the key must be declared under
    /// `verificationMethod` and referenced here by its exact ID.
    pub fn has_assertion_method_reference(&self, id: &str) -> bool {
        self.assertion_method
            .iter()
            .flatten()
            .any(|vm| matches!(vm, VerificationMethod::DIDURL(url) if url == id))
    }

    /// Finds the `verificationMethod` entry whose `id` is exactly `id`.
    pub fn find_verification_method(&self, id: &str) -> Option<&VerificationMethodMap> {
        self.verification_method
            .iter()
            .flatten()
            .find_map(|vm| match vm {
                VerificationMethod::Map(map) if map.id == id => Some(map),
                _ => None,
            })
    }
}

/// Splits a DID URL into its DID and fragment.
pub fn split_fragment(did_url: &str) -> (&str, Option<&str>) {
    match did_url.split_once('#') {
        Some((did, fragment)) => (did, Some(fragment)),
        None => (did_url, None),
    }
}
