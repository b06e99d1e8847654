//! The wire-format status document served by the device.

use serde::Deserialize;
use snafu::ResultExt as _;

use crate::crypto;
use crate::error::{ClientError, MalformedReport, PlaintextUtf8, UndecodablePayload};

/// A single record of the status document.
///
/// The device serves records with additional attributes (`vartype` and
/// friends); only the identifier/value pair is consumed, the rest is
/// ignored on deserialization.
#[derive(Clone, Debug, Deserialize)]
pub struct ReportEntry {
    /// Field identifier.
    pub varid: String,
    /// Field value. Always transported as a string, even for numeric fields.
    pub varvalue: String,
}

/// The decoded status report: the ordered sequence of records as served.
#[derive(Clone, Debug)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Value of the first record whose identifier matches `varid`, if any.
    ///
    /// Identifiers are not guaranteed unique at the wire level; the fields
    /// this crate consumes appear exactly once in practice, and first match
    /// wins otherwise.
    pub fn value_of(&self, varid: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.varid == varid)
            .map(|entry| entry.varvalue.as_str())
    }

    /// Number of records in the report.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the report holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<ReportEntry>> for Report {
    fn from(entries: Vec<ReportEntry>) -> Self {
        Self { entries }
    }
}

/// Decodes a response body into a [`Report`].
///
/// The body is first taken at face value: some firmware revisions serve the
/// document unencrypted, and a plain document parses as-is. Anything else is
/// treated as hex-encoded AES-CCM ciphertext with the authentication tag
/// appended, decrypted with `key`, and parsed from the UTF-8 plaintext.
///
/// # Errors
///
/// Returns an error if the body is neither a plain report nor valid hex, if
/// tag verification fails, or if the decrypted plaintext is not a report.
pub fn parse_report(body: &str, key: &[u8]) -> Result<Report, ClientError> {
    if let Ok(entries) = serde_json::from_str::<Vec<ReportEntry>>(body) {
        return Ok(Report::from(entries));
    }

    let payload = hex::decode(body.trim()).context(UndecodablePayload)?;
    let plaintext = crypto::decrypt(&payload, key)?;
    let document = String::from_utf8(plaintext).context(PlaintextUtf8)?;
    let entries: Vec<ReportEntry> = serde_json::from_str(&document).context(MalformedReport)?;

    Ok(Report::from(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "cdc0cac1280b516e674f0057e4929bca84447cca8425007e33a88a5cf598a92e";

    const PLAIN_REPORT: &str = r#"[
        {"vartype":"status","varid":"dsl_link_status","varvalue":"online"},
        {"vartype":"value","varid":"dsl_downstream","varvalue":"100000"}
    ]"#;

    fn key() -> Vec<u8> {
        crypto::decode_key(KEY_HEX).unwrap()
    }

    #[test]
    fn plain_document_parses_directly() {
        let report = parse_report(PLAIN_REPORT, &key()).unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.value_of("dsl_link_status"), Some("online"));
        assert_eq!(report.value_of("dsl_downstream"), Some("100000"));
    }

    #[test]
    fn encrypted_document_is_decrypted_and_parsed() {
        let sealed = crypto::encrypt(PLAIN_REPORT.as_bytes(), &key()).unwrap();

        let report = parse_report(&hex::encode(sealed), &key()).unwrap();
        assert_eq!(report.value_of("dsl_downstream"), Some("100000"));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let sealed = crypto::encrypt(PLAIN_REPORT.as_bytes(), &key()).unwrap();

        let body = format!("  {}\n", hex::encode(sealed));
        assert!(parse_report(&body, &key()).is_ok());
    }

    #[test]
    fn garbage_body_is_undecodable() {
        let result = parse_report("<html>login required</html>", &key());
        assert!(matches!(result, Err(ClientError::UndecodablePayload { .. })));
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = crypto::encrypt(PLAIN_REPORT.as_bytes(), &key()).unwrap();
        let mut other = key();
        other[31] ^= 0xff;

        let result = parse_report(&hex::encode(sealed), &other);
        assert!(matches!(result, Err(ClientError::AuthenticationFailed)));
    }

    #[test]
    fn first_match_wins_for_duplicate_identifiers() {
        let body = r#"[
            {"varid":"dsl_downstream","varvalue":"1"},
            {"varid":"dsl_downstream","varvalue":"2"}
        ]"#;

        let report = parse_report(body, &key()).unwrap();
        assert_eq!(report.value_of("dsl_downstream"), Some("1"));
    }

    #[test]
    fn missing_identifier_is_none() {
        let report = parse_report(PLAIN_REPORT, &key()).unwrap();
        assert!(report.value_of("dsl_upstream").is_none());
        assert!(!report.is_empty());
    }
}
