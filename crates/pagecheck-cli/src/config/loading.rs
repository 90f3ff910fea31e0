use crate::config::{ConfigOverrides, PagecheckConfig};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use std::path::Path;
use tracing::debug;

/// Config file picked up from the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "pagecheck.config.json";

/// Prefix for environment overrides, e.g. `PAGECHECK_BUDGET_SECS=10`.
pub const ENV_PREFIX: &str = "PAGECHECK_";

impl PagecheckConfig {
    /// Load configuration from every source.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// An explicit `config_path` must exist; the default file is optional.
    pub fn load(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            debug!(path = %path.display(), "reading config file");
            figment = figment.merge(Json::file(path));
        }

        // PAGECHECK_BUDGET_SECS -> budgetSecs
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .map(|key| env_key_to_field(key.as_str()).into()),
        );

        figment = figment.merge(Serialized::defaults(overrides));

        let config: Self = figment.extract().map_err(ConfigError::from)?;
        Ok(config)
    }
}

/// Maps an environment key (after the prefix) to its camelCase field name.
pub(crate) fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper_next = false;

    for c in key.chars() {
        if c == '_' {
            upper_next = !field.is_empty();
        } else if upper_next {
            field.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }

    field
}
