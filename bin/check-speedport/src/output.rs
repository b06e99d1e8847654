//! Plugin-format output rendering.

use speedport_client::{ClientError, StatusSnapshot};

use crate::check::Severity;

/// Renders the single plugin output line for an evaluated snapshot.
///
/// The segment after the pipe is machine-readable performance data in the
/// `label=value;warn;crit;` convention; the threshold slots are left empty
/// since the bounds live on the command line, not in the metric.
pub fn render_status_line(severity: Severity, status: &StatusSnapshot) -> String {
    format!(
        "{} - Download: {} kbit/s Upload: {} kbit/s | Download={};;; Upload={};;;",
        severity.as_str(),
        status.downstream_kbit,
        status.upstream_kbit,
        status.downstream_kbit,
        status.upstream_kbit
    )
}

/// Renders the single diagnostic line for a check that could not determine
/// the device status.
pub fn render_unknown_line(error: &ClientError) -> String {
    format!("{} - {}", Severity::Unknown.as_str(), error)
}
