use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Remote credentials and bucket are non-empty
/// - Worker count is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let remote = &config.remote;
    for (name, value) in [
        ("remote.account_id", &remote.account_id),
        ("remote.access_key_id", &remote.access_key_id),
        ("remote.secret_access_key", &remote.secret_access_key),
        ("remote.bucket", &remote.bucket),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if config.sync.workers == 0 {
        return Err(ConfigError::ValidationError(
            "sync.workers must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RemoteConfig, SyncConfig};

    fn valid_config() -> Config {
        Config {
            remote: RemoteConfig {
                account_id: "acct123".to_string(),
                access_key_id: "key".to_string(),
                secret_access_key: "secret".to_string(),
                bucket: "videos".to_string(),
                public_domain: None,
                region: "auto".to_string(),
                timeout_secs: 300,
            },
            sync: SyncConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_bucket_fails() {
        let mut config = valid_config();
        config.remote.bucket = "  ".to_string();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = valid_config();
        config.sync.workers = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
