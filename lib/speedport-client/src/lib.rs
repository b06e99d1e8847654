//! Client for the encrypted status endpoint of Speedport-class DSL routers.
//!
//! The device serves `/data/Status.json` either as a plain JSON document or
//! as hex-encoded AES-CCM ciphertext, depending on firmware generation.
//! [`DeviceClient`] fetches the document with bounded retries, decodes it
//! either way, and projects out the link fields a monitoring check consumes.
#![deny(warnings)]
#![deny(missing_docs)]

mod client;
mod error;
mod report;
mod status;

pub mod crypto;

pub use self::client::{ClientConfig, DeviceClient};
pub use self::error::ClientError;
pub use self::report::{parse_report, Report, ReportEntry};
pub use self::status::{
    StatusSnapshot, FIELD_DSL_DOWNSTREAM, FIELD_DSL_LINK_STATUS, FIELD_DSL_UPSTREAM, FIELD_FIRMWARE_VERSION,
};
