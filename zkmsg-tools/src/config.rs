//! Combined configuration file.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zkmsg_aggregator::AggregatorConfig;
use zkmsg_deposit::DepositConfig;
use zkmsg_mailbox::MailboxConfig;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "ZKMSG_CONFIG";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZkmsgConfig {
    pub deposit: DepositConfig,
    pub mailbox: MailboxConfig,
    pub aggregator: AggregatorConfig,
}

impl ZkmsgConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkmsg_common::Digest;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: ZkmsgConfig =
            serde_json::from_str(r#"{"aggregator": {"seed": 4}, "deposit": {"require_signature": true}}"#)
                .unwrap();
        assert_eq!(config.aggregator.seed, 4);
        assert_eq!(config.aggregator.program_id, AggregatorConfig::default().program_id);
        assert!(config.deposit.require_signature);
        assert_eq!(config.mailbox, MailboxConfig::default());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"mailbox": {"require_proof": true}}"#).unwrap();
        let config = ZkmsgConfig::load(Some(file.path())).unwrap();
        assert!(config.mailbox.require_proof);
        assert_eq!(config.deposit, DepositConfig::default());
    }

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(ZkmsgConfig::load(None).unwrap(), ZkmsgConfig::default());
    }

    #[test]
    fn secrets_are_read_as_hex() {
        let secret = "0x".to_string() + &"11".repeat(32);
        let json = format!(
            r#"{{"aggregator": {{"secret": "{secret}"}}, "mailbox": {{"prover_secret": "{secret}"}}}}"#
        );
        let config: ZkmsgConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.aggregator.secret, Some(Digest::from_bytes([0x11; 32])));
        assert_eq!(config.mailbox.prover_secret, config.aggregator.secret);
    }
}
