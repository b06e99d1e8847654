//! Threshold policy over a status snapshot.

use speedport_client::StatusSnapshot;

/// Link state value the device reports while the DSL line is up.
const LINK_ONLINE: &str = "online";

/// Check outcome, in the monitoring-plugin convention.
///
/// Escalation order is OK < WARNING < CRITICAL, and the first check to fire
/// is terminal. `Unknown` is the could-not-determine-status outcome: it is
/// produced when the pipeline fails before evaluation, never by the
/// evaluator itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    /// All enabled checks passed.
    Ok = 0,
    /// A warning bound was crossed.
    Warning,
    /// The link is down or a critical bound was crossed.
    Critical,
    /// The status could not be determined.
    Unknown,
}

impl Severity {
    /// Label used in the plugin output line.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::Unknown => "UNKNOWN",
        }
    }

    /// Process exit code consumed by the monitoring framework.
    pub fn exit_code(self) -> u8 {
        self as u8
    }
}

/// Threshold bounds for the rate checks, in kbit/s.
///
/// A pair is enforced only when both of its bounds are positive; partial
/// configuration disables the whole pair rather than applying a one-sided
/// comparison.
#[derive(Debug, Copy, Clone, Default)]
pub struct Thresholds {
    /// Downstream WARNING bound.
    pub download_warn: i64,
    /// Downstream CRITICAL bound.
    pub download_crit: i64,
    /// Upstream WARNING bound.
    pub upload_warn: i64,
    /// Upstream CRITICAL bound.
    pub upload_crit: i64,
}

impl Thresholds {
    fn download_enabled(&self) -> bool {
        self.download_warn > 0 && self.download_crit > 0
    }

    fn upload_enabled(&self) -> bool {
        self.upload_warn > 0 && self.upload_crit > 0
    }
}

/// Decides the check severity for `status` under `thresholds`.
///
/// Checks run in strict order and the first hit is terminal: link state,
/// then the download pair (critical bound before warning), then the upload
/// pair.
pub fn evaluate(status: &StatusSnapshot, thresholds: &Thresholds) -> Severity {
    if status.link_status != LINK_ONLINE {
        return Severity::Critical;
    }

    if thresholds.download_enabled() {
        if status.downstream_kbit <= thresholds.download_crit {
            return Severity::Critical;
        }
        if status.downstream_kbit <= thresholds.download_warn {
            return Severity::Warning;
        }
    }

    if thresholds.upload_enabled() {
        if status.upstream_kbit <= thresholds.upload_crit {
            return Severity::Critical;
        }
        if status.upstream_kbit <= thresholds.upload_warn {
            return Severity::Warning;
        }
    }

    Severity::Ok
}
