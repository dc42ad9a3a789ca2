use std::{env, path::PathBuf, time::Duration};

use ui_common::i18n::Locale;

use crate::config::{BACKEND_CONFIG, DEFAULT_DATA_DIR};

pub struct Environment {
    pub data_dir: PathBuf,
    pub geocoding_base_url: String,
    pub geocoding_api_key: Option<String>,
    pub backend_delay: Duration,
    pub locale: Locale,
}

fn optional_var(name: &str) -> anyhow::Result<Option<String>> {
    match env::var(name) {
        Ok(v) => Ok(Some(v)),
        Err(e) => match e {
            env::VarError::NotPresent => Ok(None),
            env::VarError::NotUnicode(e) => {
                anyhow::bail!("Invalid value for environment variable {name}: {e:?}");
            }
        },
    }
}

pub fn load() -> anyhow::Result<Environment> {
    let data_dir = optional_var("GEOPINS_DATA_DIR")?
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let geocoding_base_url = geocoding_api::get_base_url();
    let geocoding_api_key = optional_var("GEOCODING_API_KEY")?.filter(|k| !k.is_empty());

    let default_delay = BACKEND_CONFIG.default_delay;
    let backend_delay = match env::var("BACKEND_DELAY_MS") {
        Ok(ms) => match ms.parse() {
            Ok(ms) => Duration::from_millis(ms),
            Err(e) => {
                log::error!("Invalid BACKEND_DELAY_MS `{ms}`: {e}");
                log::info!("Using default delay {default_delay:?}");
                default_delay
            }
        },
        Err(e) => {
            log::debug!("Error reading BACKEND_DELAY_MS from environment: {e}");
            default_delay
        }
    };

    let locale = optional_var("GEOPINS_LOCALE")?
        .map(|tag| Locale::from_tag(&tag))
        .unwrap_or_default();

    Ok(Environment {
        data_dir,
        geocoding_base_url,
        geocoding_api_key,
        backend_delay,
        locale,
    })
}
