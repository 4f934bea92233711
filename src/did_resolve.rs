use async_trait::async_trait;
use chrono::prelude::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// https://w3c-ccg.github.io/did-resolution/

use crate::did::Document;

pub const TYPE_DID_LD_JSON: &str = "application/did+ld+json";
pub const ERROR_INVALID_DID: &str = "invalidDid";
pub const ERROR_NOT_FOUND: &str = "notFound";
pub const ERROR_METHOD_NOT_SUPPORTED: &str = "methodNotSupported";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Metadata {
    String(String),
    Map(HashMap<String, Metadata>),
    List(Vec<Metadata>),
    Boolean(bool),
    Null,
}

/// [DID Resolution Options](https://www.w3.org/TR/did-core/#did-resolution-options)
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionInputMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Bypass any cached document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<bool>,
    #[serde(flatten)]
    pub property_set: Option<HashMap<String, Metadata>>,
}

/// <https://www.w3.org/TR/did-core/#did-resolution-metadata>
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub property_set: Option<HashMap<String, Metadata>>,
}

/// <https://www.w3.org/TR/did-core/#did-document-metadata>
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    #[serde(flatten)]
    pub property_set: Option<HashMap<String, Metadata>>,
}

impl ResolutionMetadata {
    pub fn from_error(err: &str) -> Self {
        Self {
            error: Some(err.to_owned()),
            ..Default::default()
        }
    }
}

/// A DID resolver.
///
/// Implementations report failures through [`ResolutionMetadata::error`]
/// rather than a `Result`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait DIDResolver: Sync {
    /// [Resolve a DID](https://w3c-ccg.github.io/did-resolution/#resolving-algorithm)
    async fn resolve(
        &self,
        did: &str,
        input_metadata: &ResolutionInputMetadata,
    ) -> (
        ResolutionMetadata,
        Option<Document>,
        Option<DocumentMetadata>,
    );
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<T: DIDResolver + Send + ?Sized> DIDResolver for Box<T> {
    async fn resolve(
        &self,
        did: &str,
        input_metadata: &ResolutionInputMetadata,
    ) -> (
        ResolutionMetadata,
        Option<Document>,
        Option<DocumentMetadata>,
    ) {
        (**self).resolve(did, input_metadata).await
    }
}

/// Resolver wrapper caching successfully resolved documents by DID.
///
/// A cache miss delegates to the wrapped resolver unchanged. Failed
/// resolutions are not cached. Entries never expire on their own; call
/// [`CachingResolver::clear`] to drop them.
#[derive(Debug, Default)]
pub struct CachingResolver<R> {
    resolver: R,
    documents: DashMap<String, (Document, Option<DocumentMetadata>)>,
}

impl<R> CachingResolver<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            documents: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.resolver
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&self) {
        self.documents.clear();
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<R: DIDResolver + Send> DIDResolver for CachingResolver<R> {
    async fn resolve(
        &self,
        did: &str,
        input_metadata: &ResolutionInputMetadata,
    ) -> (
        ResolutionMetadata,
        Option<Document>,
        Option<DocumentMetadata>,
    ) {
        if input_metadata.no_cache != Some(true) {
            if let Some(entry) = self.documents.get(did) {
                log::trace!("DID document cache hit: {}", did);
                let (doc, doc_meta) = entry.value().clone();
                return (ResolutionMetadata::default(), Some(doc), doc_meta);
            }
        }
        let (res_meta, doc_opt, doc_meta_opt) = self.resolver.resolve(did, input_metadata).await;
        if let (None, Some(doc)) = (&res_meta.error, &doc_opt) {
            self.documents
                .insert(did.to_string(), (doc.clone(), doc_meta_opt.clone()));
        }
        (res_meta, doc_opt, doc_meta_opt)
    }
}
