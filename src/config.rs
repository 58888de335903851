use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CAPTION_API_URL: &str =
    "https://router.huggingface.co/hf-inference/models/Salesforce/blip-image-captioning-base";
pub const DEFAULT_TRANSLATION_API_URL: &str = "https://api.mesolitica.com/translation/public";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_LOG_FILTER: &str = "info,hurai=debug,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub caption: CaptionSettings,
    pub translation: TranslationSettings,
    pub upload: UploadSettings,
    pub logging: LoggingSettings,
    /// Applies to both outbound APIs; they share one client.
    pub upstream_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct CaptionSettings {
    pub api_url: String,
    /// Used when a request carries no key of its own.
    pub fallback_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TranslationSettings {
    pub api_url: String,
    pub target_lang: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_bytes: usize,
    pub max_dimension: u32,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub environment: String,
    pub json_format: bool,
    /// `EnvFilter` directives, taken from `RUST_LOG`.
    pub filter: String,
}

impl Settings {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server: ServerSettings {
                host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&get, "SERVER_PORT", 3000u16)?,
            },
            caption: CaptionSettings {
                api_url: get("CAPTION_API_URL")
                    .unwrap_or_else(|| DEFAULT_CAPTION_API_URL.to_string()),
                fallback_api_key: get("HUGGINGFACE_INF_KEY"),
            },
            translation: TranslationSettings {
                api_url: get("TRANSLATION_API_URL")
                    .unwrap_or_else(|| DEFAULT_TRANSLATION_API_URL.to_string()),
                target_lang: get("TRANSLATION_TARGET_LANG").unwrap_or_else(|| "ms".to_string()),
                model: get("TRANSLATION_MODEL").unwrap_or_else(|| "small".to_string()),
            },
            upload: UploadSettings {
                max_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
                max_dimension: parse_or(&get, "MAX_IMAGE_DIMENSION", 1024u32)?,
            },
            logging: LoggingSettings {
                environment: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
                json_format: get("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
                filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            },
            upstream_timeout: Duration::from_secs(parse_or(
                &get,
                "UPSTREAM_TIMEOUT_SECS",
                60u64,
            )?),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                value: raw,
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}
