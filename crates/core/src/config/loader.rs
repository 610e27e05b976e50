use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("MEDIALIB_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    const MINIMAL_REMOTE: &str = r#"
[remote]
account_id = "acct123"
access_key_id = "key"
secret_access_key = "secret"
bucket = "videos"
"#;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(MINIMAL_REMOTE).unwrap();
        assert_eq!(config.remote.bucket, "videos");
        assert_eq!(config.remote.region, "auto");
        assert_eq!(config.remote.timeout_secs, 300);
        assert_eq!(config.sync.workers, 4);
        assert!(config.sync.skip_existing);
        assert!(config.sync.check_remote_exists);
        assert_eq!(config.sync.library_path, PathBuf::from("library.json"));
    }

    #[test]
    fn test_load_config_from_str_missing_remote() {
        let result = load_config_from_str("[sync]\nworkers = 2\n");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[remote]
account_id = "acct123"
access_key_id = "key"
secret_access_key = "secret"
bucket = "videos"
public_domain = "media.example.com"

[sync]
workers = 8
skip_existing = false
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.remote.public_domain.as_deref(), Some("media.example.com"));
        assert_eq!(config.sync.workers, 8);
        assert!(!config.sync.skip_existing);
    }
}
