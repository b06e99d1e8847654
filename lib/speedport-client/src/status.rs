//! Projection of the raw report into the fields the check consumes.

use crate::error::{ClientError, MalformedField, MissingField};
use crate::report::Report;

/// `varid` of the DSL link state record.
pub const FIELD_DSL_LINK_STATUS: &str = "dsl_link_status";

/// `varid` of the downstream sync rate record, in kbit/s.
pub const FIELD_DSL_DOWNSTREAM: &str = "dsl_downstream";

/// `varid` of the upstream sync rate record, in kbit/s.
pub const FIELD_DSL_UPSTREAM: &str = "dsl_upstream";

/// `varid` of the firmware version record.
pub const FIELD_FIRMWARE_VERSION: &str = "firmware_version";

/// The fields the check consumes, pulled out of a [`Report`].
///
/// Built once per invocation and read-only afterwards.
#[derive(Clone, Debug)]
pub struct StatusSnapshot {
    /// Reported DSL link state; `"online"` when the line is up.
    pub link_status: String,
    /// Downstream sync rate, in kbit/s.
    pub downstream_kbit: i64,
    /// Upstream sync rate, in kbit/s.
    pub upstream_kbit: i64,
    /// Firmware version string reported by the device.
    pub firmware_version: String,
}

impl StatusSnapshot {
    /// Builds a snapshot from a report.
    ///
    /// Fields are extracted in the fixed order above, not report order. An
    /// absent record is an error rather than an empty or zero reading:
    /// missing fields signal malformed or unexpected upstream data, and a
    /// partial snapshot is never returned.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing from the report, or
    /// if a rate field holds a non-numeric value.
    pub fn from_report(report: &Report) -> Result<Self, ClientError> {
        let link_status = string_field(report, FIELD_DSL_LINK_STATUS)?;
        let downstream_kbit = integer_field(report, FIELD_DSL_DOWNSTREAM)?;
        let upstream_kbit = integer_field(report, FIELD_DSL_UPSTREAM)?;
        let firmware_version = string_field(report, FIELD_FIRMWARE_VERSION)?;

        Ok(Self {
            link_status,
            downstream_kbit,
            upstream_kbit,
            firmware_version,
        })
    }
}

fn string_field(report: &Report, field: &'static str) -> Result<String, ClientError> {
    match report.value_of(field) {
        Some(value) => Ok(value.to_string()),
        None => MissingField { field }.fail(),
    }
}

fn integer_field(report: &Report, field: &'static str) -> Result<i64, ClientError> {
    let value = string_field(report, field)?;
    match value.trim().parse() {
        Ok(number) => Ok(number),
        Err(_) => MalformedField { field, value }.fail(),
    }
}
