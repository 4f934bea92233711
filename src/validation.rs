//! Claim validation: required claims, validity window and issuer trust.
use std::collections::HashSet;

use crate::claims::Claims;
use crate::error::Error;

/// Issuer of production NZ COVID passes.
pub const NZCP_PRODUCTION_ISSUER: &str = "did:web:nzcp.identity.health.nz";

/// Issuer of the NZCP example and test passes.
pub const NZCP_TEST_ISSUER: &str = "did:web:nzcp.covid19.health.nz";

/// Set of trusted issuer DIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedIssuers(HashSet<String>);

impl TrustedIssuers {
    pub fn new<I, S>(issuers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(issuers.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, issuer: &str) -> bool {
        self.0.contains(issuer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for TrustedIssuers {
    fn default() -> Self {
        Self::new([NZCP_PRODUCTION_ISSUER])
    }
}

/// Checks the claims against the time `now` (Unix seconds) and the trusted
/// issuers.
///
/// `nbf` and `exp` are each compared to `now` only; they are not compared to
/// each other.
pub fn validate_claims(claims: &Claims, trusted: &TrustedIssuers, now: i64) -> Result<(), Error> {
    let iss = claims.iss.as_deref().ok_or(Error::MissingClaim("iss"))?;
    let nbf = claims.nbf.ok_or(Error::MissingClaim("nbf"))?;
    let exp = claims.exp.ok_or(Error::MissingClaim("exp"))?;
    if claims.vc.is_none() {
        return Err(Error::MissingClaim("vc"));
    }
    if exp < now {
        return Err(Error::Expired);
    }
    if nbf > now {
        return Err(Error::NotYetValid);
    }
    if !trusted.contains(iss) {
        return Err(Error::UntrustedIssuer(iss.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CborValue;

    const NOW: i64 = 1700000000;

    fn claims() -> Claims {
        Claims {
            iss: Some(NZCP_TEST_ISSUER.to_string()),
            nbf: Some(NOW - 100),
            exp: Some(NOW + 100),
            vc: Some(CborValue::Map(vec![])),
            ..Default::default()
        }
    }

    fn trusted() -> TrustedIssuers {
        TrustedIssuers::new([NZCP_TEST_ISSUER])
    }

    #[test]
    fn valid_claims() {
        validate_claims(&claims(), &trusted(), NOW).unwrap();
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let mut c = claims();
        c.nbf = Some(NOW);
        c.exp = Some(NOW);
        validate_claims(&c, &trusted(), NOW).unwrap();
    }

    #[test]
    fn missing_required_claims() {
        let mut c = claims();
        c.iss = None;
        assert!(matches!(
            validate_claims(&c, &trusted(), NOW),
            Err(Error::MissingClaim("iss"))
        ));
        let mut c = claims();
        c.nbf = None;
        assert!(matches!(
            validate_claims(&c, &trusted(), NOW),
            Err(Error::MissingClaim("nbf"))
        ));
        let mut c = claims();
        c.exp = None;
        assert!(matches!(
            validate_claims(&c, &trusted(), NOW),
            Err(Error::MissingClaim("exp"))
        ));
        let mut c = claims();
        c.vc = None;
        assert!(matches!(
            validate_claims(&c, &trusted(), NOW),
            Err(Error::MissingClaim("vc"))
        ));
    }

    #[test]
    fn expired() {
        let mut c = claims();
        c.exp = Some(NOW - 1);
        assert!(matches!(
            validate_claims(&c, &trusted(), NOW),
            Err(Error::Expired)
        ));
    }

    #[test]
    fn not_yet_valid() {
        let mut c = claims();
        c.nbf = Some(NOW + 1);
        assert!(matches!(
            validate_claims(&c, &trusted(), NOW),
            Err(Error::NotYetValid)
        ));
    }

    #[test]
    fn window_checked_before_issuer() {
        let mut c = claims();
        c.iss = Some("did:web:example.com".to_string());
        c.exp = Some(NOW - 1);
        assert!(matches!(
            validate_claims(&c, &trusted(), NOW),
            Err(Error::Expired)
        ));
    }

    #[test]
    fn untrusted_issuer() {
        assert!(matches!(
            validate_claims(&claims(), &TrustedIssuers::default(), NOW),
            Err(Error::UntrustedIssuer(_))
        ));
    }

    #[test]
    fn default_issuers() {
        let issuers = TrustedIssuers::default();
        assert!(issuers.contains(NZCP_PRODUCTION_ISSUER));
        assert!(!issuers.contains(NZCP_TEST_ISSUER));
        assert_eq!(issuers.iter().count(), 1);
    }
}
