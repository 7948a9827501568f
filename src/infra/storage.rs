use crate::config::ClientConfig;
use crate::domain::feed::Avatar;

/// Builds public object URLs by concatenating the public storage base and a
/// stored path. No request is made and nothing checks the object exists.
#[derive(Clone, Debug)]
pub struct PublicStorage {
    base_url: String,
}

impl PublicStorage {
    pub fn new(config: &ClientConfig) -> Self {
        Self::from_base(&config.storage_public_url)
    }

    pub fn from_base(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, stored_path: &str) -> String {
        format!("{}/{}", self.base_url, stored_path.trim_start_matches('/'))
    }

    pub fn image_url(&self, stored_path: Option<&str>) -> Option<String> {
        stored_path
            .filter(|path| !path.is_empty())
            .map(|path| self.public_url(path))
    }

    pub fn avatar(&self, stored_path: Option<&str>) -> Avatar {
        match self.image_url(stored_path) {
            Some(url) => Avatar::Remote(url),
            None => Avatar::Default,
        }
    }
}
