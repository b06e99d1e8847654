use snafu::Snafu;

/// Errors produced while fetching or decoding the device status document.
///
/// The retry loop treats transport and payload failures as per-attempt
/// failures; key errors surface before the first request, and extraction
/// errors after the last one.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
#[snafu(visibility(pub(crate)))]
pub enum ClientError {
    /// Configured decryption key was not valid hexadecimal.
    #[snafu(display("decryption key is not valid hex: {source}"))]
    InvalidKey {
        /// Error from decoding the key.
        source: hex::FromHexError,
    },

    /// Configured decryption key decoded to an unsupported number of bytes.
    #[snafu(display("decryption key must be 16, 24 or 32 bytes, got {length}"))]
    UnsupportedKeyLength {
        /// Decoded key length, in bytes.
        length: usize,
    },

    /// The HTTP request itself failed: connection error, timeout, and so on.
    #[snafu(display("request to '{url}' failed: {source}"))]
    Transport {
        /// URL the request was issued against.
        url: String,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },

    /// Response body was neither a plain status report nor hex-encoded ciphertext.
    #[snafu(display("response body is neither a status report nor hex-encoded ciphertext: {source}"))]
    UndecodablePayload {
        /// Error from decoding the body as hex.
        source: hex::FromHexError,
    },

    /// Authentication tag verification failed during decryption.
    ///
    /// The tag cannot tell a wrong key apart from a payload corrupted in
    /// transit, so this is retried like any other decode failure.
    #[snafu(display("payload decryption failed: authentication tag mismatch (wrong key or corrupted payload)"))]
    AuthenticationFailed,

    /// Decrypted plaintext was not valid UTF-8.
    #[snafu(display("decrypted payload is not valid UTF-8: {source}"))]
    PlaintextUtf8 {
        /// Error from the UTF-8 conversion.
        source: std::string::FromUtf8Error,
    },

    /// Decrypted plaintext did not parse as a status report.
    #[snafu(display("decrypted payload is not a valid status report: {source}"))]
    MalformedReport {
        /// Error from parsing the plaintext document.
        source: serde_json::Error,
    },

    /// A required field was absent from the report.
    #[snafu(display("required field '{field}' is missing from the status report"))]
    MissingField {
        /// Identifier of the missing field.
        field: &'static str,
    },

    /// A numeric field held a value that does not parse as an integer.
    #[snafu(display("field '{field}' holds non-numeric value '{value}'"))]
    MalformedField {
        /// Identifier of the malformed field.
        field: &'static str,
        /// Value the device actually served.
        value: String,
    },

    /// Every fetch attempt failed and the retry budget is spent.
    #[snafu(display("maximum retries exceeded after {attempts} attempts: {source}"))]
    RetriesExhausted {
        /// Total number of attempts made, including the initial one.
        attempts: usize,
        /// Failure of the last attempt.
        #[snafu(source(from(ClientError, Box::new)))]
        source: Box<ClientError>,
    },
}
