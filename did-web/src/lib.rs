use async_trait::async_trait;
use std::time::Duration;

use nzcp::did::Document;
use nzcp::did_resolve::{
    DIDResolver, DocumentMetadata, ResolutionInputMetadata, ResolutionMetadata, ERROR_INVALID_DID,
    ERROR_NOT_FOUND, TYPE_DID_LD_JSON,
};
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default bound on a whole DID document request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// For testing, enable handling requests at localhost.
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
thread_local! {
  static PROXY: RefCell<Option<String>> = RefCell::new(None);
}

/// did:web Method
///
/// [Specification](https://w3c-ccg.github.io/did-method-web/)
#[derive(Debug, Clone)]
pub struct DIDWeb {
    timeout: Duration,
}

impl DIDWeb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver giving up on requests that take longer than `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches the raw DID document.
    pub async fn resolve_representation(
        &self,
        did: &str,
        input_metadata: &ResolutionInputMetadata,
    ) -> (ResolutionMetadata, Vec<u8>, Option<DocumentMetadata>) {
        let url = match did_web_url(did) {
            Err(meta) => return (meta, Vec::new(), None),
            Ok(url) => url,
        };

        let mut headers = reqwest::header::HeaderMap::new();

        headers.insert(
            "User-Agent",
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );

        let builder = reqwest::Client::builder().default_headers(headers);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(self.timeout);
        let client = match builder.build() {
            Ok(c) => c,
            Err(err) => {
                return (
                    ResolutionMetadata::from_error(&format!("Error building HTTP client: {err}")),
                    Vec::new(),
                    None,
                )
            }
        };
        let accept = input_metadata
            .accept
            .clone()
            .unwrap_or_else(|| "application/json".to_string());
        let resp = match client.get(&url).header("Accept", accept).send().await {
            Ok(req) => req,
            Err(err) => {
                log::debug!("did:web request to {} failed: {}", url, err);
                return (
                    ResolutionMetadata::from_error(&format!(
                        "Error sending HTTP request ({url}): {err}"
                    )),
                    Vec::new(),
                    None,
                );
            }
        };
        if let Err(err) = resp.error_for_status_ref() {
            log::debug!("did:web request to {} failed: {}", url, err);
            if err.status() == Some(reqwest::StatusCode::NOT_FOUND) {
                return (
                    ResolutionMetadata::from_error(ERROR_NOT_FOUND),
                    Vec::new(),
                    Some(DocumentMetadata::default()),
                );
            }
            return (
                ResolutionMetadata::from_error(&err.to_string()),
                Vec::new(),
                Some(DocumentMetadata::default()),
            );
        }
        let doc_representation = match resp.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => {
                return (
                    ResolutionMetadata::from_error(
                        &("Error reading HTTP response: ".to_string() + &err.to_string()),
                    ),
                    Vec::new(),
                    None,
                )
            }
        };
        (
            ResolutionMetadata {
                error: None,
                content_type: Some(TYPE_DID_LD_JSON.to_string()),
                property_set: None,
            },
            doc_representation,
            Some(DocumentMetadata::default()),
        )
    }
}

impl Default for DIDWeb {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn did_web_url(did: &str) -> Result<String, ResolutionMetadata> {
    let mut parts = did.split(':').peekable();
    let domain_name = match (parts.next(), parts.next(), parts.next()) {
        (Some("did"), Some("web"), Some(domain_name)) if !domain_name.is_empty() => domain_name,
        _ => {
            return Err(ResolutionMetadata::from_error(ERROR_INVALID_DID));
        }
    };
    let path = match parts.peek() {
        Some(_) => parts.collect::<Vec<&str>>().join("/"),
        None => ".well-known".to_string(),
    };
    // Use http for localhost, for testing purposes.
    let proto = if domain_name.starts_with("localhost") {
        "http"
    } else {
        "https"
    };
    #[allow(unused_mut)]
    let mut url = format!(
        "{}://{}/{}/did.json",
        proto,
        domain_name.replacen("%3A", ":", 1),
        path
    );
    #[cfg(test)]
    PROXY.with(|proxy| {
        if let Some(ref proxy) = *proxy.borrow() {
            url = proxy.clone() + &url;
        }
    });
    Ok(url)
}

/// <https://w3c-ccg.github.io/did-method-web/#read-resolve>
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl DIDResolver for DIDWeb {
    async fn resolve(
        &self,
        did: &str,
        input_metadata: &ResolutionInputMetadata,
    ) -> (
        ResolutionMetadata,
        Option<Document>,
        Option<DocumentMetadata>,
    ) {
        let (mut res_meta, doc_data, doc_meta_opt) =
            self.resolve_representation(did, input_metadata).await;
        let doc_opt = if doc_data.is_empty() {
            None
        } else {
            match Document::from_json_bytes(&doc_data) {
                Ok(doc) => Some(doc),
                Err(err) => {
                    return (
                        ResolutionMetadata::from_error(
                            &("JSON Error: ".to_string() + &err.to_string()),
                        ),
                        None,
                        None,
                    )
                }
            }
        };
        // https://www.w3.org/TR/did-core/#did-resolution-metadata
        // contentType - "MUST NOT be present if the resolve function was called"
        res_meta.content_type = None;
        (res_meta, doc_opt, doc_meta_opt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nzcp::resolve_key::resolve_public_key;
    use nzcp::Error;

    #[test]
    fn parse_did_web() {
        // https://w3c-ccg.github.io/did-method-web/#example-3-creating-the-did
        assert_eq!(
            did_web_url("did:web:w3c-ccg.github.io").unwrap(),
            "https://w3c-ccg.github.io/.well-known/did.json"
        );
        // https://w3c-ccg.github.io/did-method-web/#example-4-creating-the-did-with-optional-path
        assert_eq!(
            did_web_url("did:web:w3c-ccg.github.io:user:alice").unwrap(),
            "https://w3c-ccg.github.io/user/alice/did.json"
        );
        // https://w3c-ccg.github.io/did-method-web/#example-creating-the-did-with-optional-path-and-port
        assert_eq!(
            did_web_url("did:web:example.com%3A443:u:bob").unwrap(),
            "https://example.com:443/u/bob/did.json"
        );
        assert_eq!(
            did_web_url("did:web:nzcp.identity.health.nz").unwrap(),
            "https://nzcp.identity.health.nz/.well-known/did.json"
        );
    }

    #[test]
    fn invalid_did_web() {
        for did in ["did:key:z6Mk", "did:web:", "web:example.com", ""] {
            let meta = did_web_url(did).unwrap_err();
            assert_eq!(meta.error.as_deref(), Some(ERROR_INVALID_DID));
        }
    }

    #[test]
    fn default_timeout() {
        assert_eq!(DIDWeb::new().timeout(), DEFAULT_TIMEOUT);
        let resolver = DIDWeb::with_timeout(Duration::from_millis(500));
        assert_eq!(resolver.timeout(), Duration::from_millis(500));
    }

    const DID_URL: &str = "http://localhost/.well-known/did.json";
    const DID_JSON: &str = r#"{
      "@context": [
        "https://w3.org/ns/did/v1",
        "https://w3id.org/security/suites/jws-2020/v1"
      ],
      "id": "did:web:localhost",
      "verificationMethod": [{
        "id": "did:web:localhost#key-1",
        "controller": "did:web:localhost",
        "type": "JsonWebKey2020",
        "publicKeyJwk": {
          "kty": "EC",
          "crv": "P-256",
          "x": "zRR-XGsCp12Vvbgui4DD6O6cqmhfPuXMhi1OxPl8760",
          "y": "Iv5SU6FuW-TRYh5_GOrJlcV_gpF_GpFQhCOD8LSk3T0"
        }
      }],
      "assertionMethod": ["did:web:localhost#key-1"]
    }"#;

    // localhost web server for serving did:web DID documents.
    fn web_server() -> Result<(String, impl FnOnce() -> Result<(), ()>), hyper::Error> {
        use http::header::{HeaderValue, CONTENT_TYPE};
        use hyper::service::{make_service_fn, service_fn};
        use hyper::{Body, Response, Server};
        let addr = ([127, 0, 0, 1], 0).into();
        let make_svc = make_service_fn(|_| async move {
            Ok::<_, hyper::Error>(service_fn(|req| async move {
                let uri = req.uri();
                // Skip leading slash
                let proxied_url: String = uri.path().chars().skip(1).collect();
                if proxied_url == DID_URL {
                    let body = Body::from(DID_JSON);
                    let mut response = Response::new(body);
                    response
                        .headers_mut()
                        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                    return Ok::<_, hyper::Error>(response);
                }

                let (mut parts, body) = Response::<Body>::default().into_parts();
                parts.status = hyper::StatusCode::NOT_FOUND;
                let response = Response::from_parts(parts, body);
                Ok::<_, hyper::Error>(response)
            }))
        });
        let server = Server::try_bind(&addr)?.serve(make_svc);
        let url = "http://".to_string() + &server.local_addr().to_string() + "/";
        let (shutdown_tx, shutdown_rx) = futures::channel::oneshot::channel();
        let graceful = server.with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        tokio::task::spawn(async move {
            graceful.await.ok();
        });
        let shutdown = || shutdown_tx.send(());
        Ok((url, shutdown))
    }

    #[test_log::test(tokio::test)]
    async fn resolve_localhost() {
        let (url, shutdown) = web_server().unwrap();
        PROXY.with(|proxy| {
            proxy.replace(Some(url));
        });
        let (res_meta, doc_opt, _doc_meta) = DIDWeb::default()
            .resolve("did:web:localhost", &ResolutionInputMetadata::default())
            .await;
        assert_eq!(res_meta.error, None);
        assert_eq!(res_meta.content_type, None);
        let doc_expected = Document::from_json(DID_JSON).unwrap();
        assert_eq!(doc_opt, Some(doc_expected));

        let (res_meta, doc_opt, _doc_meta) = DIDWeb::default()
            .resolve("did:web:localhost:missing", &ResolutionInputMetadata::default())
            .await;
        assert_eq!(res_meta.error.as_deref(), Some(ERROR_NOT_FOUND));
        assert_eq!(doc_opt, None);
        PROXY.with(|proxy| {
            proxy.replace(None);
        });
        shutdown().ok();
    }

    #[test_log::test(tokio::test)]
    async fn resolve_issuer_key() {
        let (url, shutdown) = web_server().unwrap();
        PROXY.with(|proxy| {
            proxy.replace(Some(url));
        });
        let jwk = resolve_public_key(&DIDWeb::default(), "did:web:localhost#key-1")
            .await
            .unwrap();
        assert_eq!(
            jwk.x_coordinate.unwrap().to_hex(),
            "cd147e5c6b02a75d95bdb82e8b80c3e8ee9caa685f3ee5cc862d4ec4f97cefad"
        );
        assert!(matches!(
            resolve_public_key(&DIDWeb::default(), "did:web:localhost#key-2").await,
            Err(Error::NotAssertionMethod(_))
        ));
        assert!(matches!(
            resolve_public_key(&DIDWeb::default(), "did:web:localhost:missing#key-1").await,
            Err(Error::DIDResolution(_))
        ));
        PROXY.with(|proxy| {
            proxy.replace(None);
        });
        shutdown().ok();
    }

    #[tokio::test]
    async fn unreachable_host() {
        // Nothing listens on port 1.
        let (res_meta, doc_opt, _) = DIDWeb::with_timeout(Duration::from_secs(2))
            .resolve("did:web:localhost%3A1", &ResolutionInputMetadata::default())
            .await;
        assert!(res_meta.error.is_some());
        assert_eq!(doc_opt, None);
    }
}
