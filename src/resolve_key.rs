//! Issuer public key resolution.
//!
//! The key that signed a pass is referenced by `<issuer DID>#<kid>`. It must
//! be listed under the issuer document's `assertionMethod` and declared under
//! `verificationMethod` as a `JsonWebKey2020`.
use crate::did::{split_fragment, TYPE_JSON_WEB_KEY_2020};
use crate::did_resolve::{DIDResolver, ResolutionInputMetadata};
use crate::error::Error;
use crate::jwk::JWK;

/// Builds the DID URL of an issuer key.
pub fn key_reference(issuer: &str, key_id: &str) -> String {
    format!("{}#{}", issuer, key_id)
}

/// Resolves the public key referenced by `reference` (`<DID>#<key id>`).
pub async fn resolve_public_key(
    resolver: &dyn DIDResolver,
    reference: &str,
) -> Result<JWK, Error> {
    let (did, _) = split_fragment(reference);
    let (res_meta, doc_opt, _doc_meta) = resolver
        .resolve(did, &ResolutionInputMetadata::default())
        .await;
    if let Some(error) = res_meta.error {
        return Err(Error::DIDResolution(error));
    }
    let doc = doc_opt.ok_or_else(|| Error::DIDResolution("missing document".to_string()))?;

    if !doc.has_assertion_method_reference(reference) {
        return Err(Error::NotAssertionMethod(reference.to_string()));
    }
    let vm = doc
        .find_verification_method(reference)
        .ok_or_else(|| Error::VerificationMethodNotFound(reference.to_string()))?;
    if vm.type_ != TYPE_JSON_WEB_KEY_2020 {
        return Err(Error::UnsupportedVerificationMethodType(vm.type_.clone()));
    }
    let jwk = vm.public_key_jwk.clone().ok_or(Error::MissingKey)?;
    log::debug!(
        "Resolved {} ({} {} x={})",
        reference,
        jwk.key_type,
        jwk.curve.as_deref().unwrap_or("-"),
        jwk.x_coordinate
            .as_ref()
            .map(|x| x.to_hex())
            .unwrap_or_default()
    );
    Ok(jwk)
}
