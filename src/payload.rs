//! QR code payload parsing.
//!
//! An NZCP QR code carries the string `NZCP:/1/<body>` where `<body>` is the
//! unpadded [RFC 4648](https://www.rfc-editor.org/rfc/rfc4648#section-6)
//! base32 encoding of a CBOR-encoded `COSE_Sign1` structure.
use multibase::{Base, Error as MultibaseError};

use crate::error::Error;

/// Payload scheme, including the trailing colon.
pub const SCHEME: &str = "NZCP:";

/// Supported payload version.
pub const VERSION: &str = "1";

const BASE32_BLOCK: usize = 8;

/// Restore the `=` padding stripped from a base32 string.
pub fn add_base32_padding(input: &str) -> String {
    let mut padded = input.to_string();
    while padded.len() % BASE32_BLOCK != 0 {
        padded.push('=');
    }
    padded
}

/// Parse a QR code payload into the raw `COSE_Sign1` bytes.
pub fn parse_payload(payload: &str) -> Result<Vec<u8>, Error> {
    let mut parts = payload.splitn(3, '/');
    let body = match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(VERSION), Some(body)) => body,
        _ => return Err(Error::InvalidPrefix),
    };
    // The multibase decoder folds case; the payload alphabet is uppercase only.
    if !body.bytes().all(is_base32_char) {
        return Err(MultibaseError::InvalidBaseString.into());
    }
    let bytes = Base::Base32PadUpper.decode(add_base32_padding(body))?;
    Ok(bytes)
}

/// RFC 4648 base32 alphabet, without padding.
fn is_base32_char(c: u8) -> bool {
    matches!(c, b'A'..=b'Z' | b'2'..=b'7')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding() {
        assert_eq!(add_base32_padding(""), "");
        assert_eq!(add_base32_padding("MZXW6"), "MZXW6===");
        assert_eq!(add_base32_padding("MZXW6YQ"), "MZXW6YQ=");
        assert_eq!(add_base32_padding("MZXW6YTB"), "MZXW6YTB");
    }

    #[test]
    fn parse_valid_payload() {
        assert_eq!(parse_payload("NZCP:/1/MZXW6YTBOI").unwrap(), b"foobar");
        assert_eq!(parse_payload("NZCP:/1/MY").unwrap(), b"f");
    }

    #[test]
    fn reject_wrong_prefix() {
        for payload in [
            "",
            "NZCP:",
            "NZCP:/1",
            "NZCP:/2/MZXW6YTBOI",
            "nzcp:/1/MZXW6YTBOI",
            "NZCP/1/MZXW6YTBOI",
            "HC1:/1/MZXW6YTBOI",
        ] {
            assert!(
                matches!(parse_payload(payload), Err(Error::InvalidPrefix)),
                "{:?}",
                payload
            );
        }
    }

    #[test]
    fn reject_invalid_alphabet() {
        assert!(matches!(
            parse_payload("NZCP:/1/MZXW1YTBOI"),
            Err(Error::Base32(_))
        ));
        assert!(matches!(
            parse_payload("NZCP:/1/mzxw6ytboi"),
            Err(Error::Base32(_))
        ));
        assert!(matches!(
            parse_payload("NZCP:/1/MZXW6YTBOI/extra"),
            Err(Error::Base32(_))
        ));
    }

    #[test]
    fn reject_mixed_case_and_padding() {
        for payload in [
            "NZCP:/1/MZXW6YTBOi",
            "NZCP:/1/mZXW6YTBOI",
            "NZCP:/1/MZXW6YTBOI======",
            "NZCP:/1/MZXW6YTB OI",
        ] {
            assert!(
                matches!(parse_payload(payload), Err(Error::Base32(_))),
                "{:?}",
                payload
            );
        }
    }
}
