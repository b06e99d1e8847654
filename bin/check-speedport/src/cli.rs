use clap::Parser;
use speedport_client::ClientConfig;

use crate::check::Thresholds;

/// Built-in decryption key for the status endpoint.
///
/// Shipped in the device firmware and identical across devices, so it
/// doubles as a usable default; `--key` overrides it should a firmware
/// update ever rotate it.
const DEFAULT_STATUS_KEY: &str = "cdc0cac1280b516e674f0057e4929bca84447cca8425007e33a88a5cf598a92e";

/// Monitoring check for the DSL link of Speedport-class home routers.
///
/// Fetches the router's status document, compares link state and sync rates
/// against the configured thresholds, and reports the result in the
/// monitoring-plugin convention. Threshold pairs are only enforced when both
/// bounds of the pair are positive.
#[derive(Clone, Debug, Parser)]
#[command(about, version)]
pub struct Cli {
    /// Hostname or address of the router.
    #[arg(long, default_value = "")]
    pub hostname: String,

    /// TCP port of the status endpoint.
    #[arg(long, default_value_t = 443)]
    pub port: u16,

    /// Hex-encoded decryption key for the status payload.
    #[arg(long, default_value = DEFAULT_STATUS_KEY)]
    pub key: String,

    /// Downstream rate at or below which the check reports WARNING, in kbit/s.
    #[arg(long = "downloadWarn", default_value_t = 0)]
    pub download_warn: i64,

    /// Downstream rate at or below which the check reports CRITICAL, in kbit/s.
    #[arg(long = "downloadCrit", default_value_t = 0)]
    pub download_crit: i64,

    /// Upstream rate at or below which the check reports WARNING, in kbit/s.
    #[arg(long = "uploadWarn", default_value_t = 0)]
    pub upload_warn: i64,

    /// Upstream rate at or below which the check reports CRITICAL, in kbit/s.
    #[arg(long = "uploadCrit", default_value_t = 0)]
    pub upload_crit: i64,
}

impl Cli {
    /// Threshold policy selected on the command line.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            download_warn: self.download_warn,
            download_crit: self.download_crit,
            upload_warn: self.upload_warn,
            upload_crit: self.upload_crit,
        }
    }

    /// Device client configuration selected on the command line.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.hostname.clone(), self.port, self.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let cli = Cli::try_parse_from(["check-speedport"]).unwrap();

        assert_eq!(cli.hostname, "");
        assert_eq!(cli.port, 443);
        assert_eq!(cli.key, DEFAULT_STATUS_KEY);
        assert_eq!(cli.download_warn, 0);
        assert_eq!(cli.download_crit, 0);
        assert_eq!(cli.upload_warn, 0);
        assert_eq!(cli.upload_crit, 0);
    }

    #[test]
    fn threshold_flags_use_their_historical_names() {
        let cli = Cli::try_parse_from([
            "check-speedport",
            "--hostname",
            "192.168.2.1",
            "--downloadWarn",
            "60000",
            "--downloadCrit",
            "40000",
            "--uploadWarn",
            "10000",
            "--uploadCrit",
            "5000",
        ])
        .unwrap();

        let thresholds = cli.thresholds();
        assert_eq!(thresholds.download_warn, 60_000);
        assert_eq!(thresholds.download_crit, 40_000);
        assert_eq!(thresholds.upload_warn, 10_000);
        assert_eq!(thresholds.upload_crit, 5_000);
    }
}
