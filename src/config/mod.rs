pub mod media;

use anyhow::{anyhow, Result};
use std::str::FromStr;
use url::Url;

pub use media::{ImageSpec, MediaSettings};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: Url,
    pub anon_key: String,
    pub storage_public_url: String,
    pub http_timeout_seconds: Option<u64>,
    pub media: MediaSettings,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        let api_url = parse_api_url(&env_or_err("LINKUP_API_URL")?)?;
        let storage_public_url = std::env::var("LINKUP_STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| default_storage_public_url(&api_url));

        let http_timeout_seconds = match std::env::var("LINKUP_HTTP_TIMEOUT_SECONDS") {
            Ok(value) => Some(
                value
                    .parse::<u64>()
                    .map_err(|err| anyhow!("invalid LINKUP_HTTP_TIMEOUT_SECONDS: {}", err))?,
            ),
            Err(_) => None,
        };

        let media = MediaSettings {
            post_image: ImageSpec::new(
                env_or_parse("LINKUP_POST_IMAGE_WIDTH", "600")?,
                env_or_parse("LINKUP_POST_IMAGE_HEIGHT", "400")?,
                env_or_parse("LINKUP_JPEG_QUALITY", "70")?,
            )?,
            avatar: ImageSpec::square(
                env_or_parse("LINKUP_AVATAR_SIZE", "300")?,
                env_or_parse("LINKUP_JPEG_QUALITY", "70")?,
            )?,
            upload_max_bytes: env_or_parse("LINKUP_UPLOAD_MAX_BYTES", "10485760")?,
        };

        Ok(Self {
            api_url,
            anon_key: env_or_err("LINKUP_ANON_KEY")?,
            storage_public_url,
            http_timeout_seconds,
            media,
        })
    }

    /// Config for an API endpoint with every other setting at its default.
    pub fn for_api(api_url: &str, anon_key: impl Into<String>) -> Result<Self> {
        let api_url = parse_api_url(api_url)?;
        Ok(Self {
            storage_public_url: default_storage_public_url(&api_url),
            api_url,
            anon_key: anon_key.into(),
            http_timeout_seconds: None,
            media: MediaSettings::default(),
        })
    }
}

fn parse_api_url(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|err| anyhow!("invalid LINKUP_API_URL: {}", err))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("invalid LINKUP_API_URL: unsupported scheme {}", url.scheme()));
    }
    Ok(url)
}

fn default_storage_public_url(api_url: &Url) -> String {
    format!(
        "{}/storage/v1/object/public",
        api_url.as_str().trim_end_matches('/')
    )
}

fn env_or_err(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow!("missing required env var: {}", key))
}

fn env_or_parse<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
