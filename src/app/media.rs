use anyhow::{anyhow, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::app::session::Session;
use crate::config::{ImageSpec, MediaSettings};
use crate::domain::media::{ImageKind, StoredObject, JPEG_CONTENT_TYPE};
use crate::infra::remote::RemoteDataService;

/// An image chosen by the user, not yet normalized.
#[derive(Debug, Clone)]
pub struct PickedImage {
    bytes: Bytes,
}

impl PickedImage {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| anyhow!("failed to read {}: {}", path.display(), err))?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Clone)]
pub struct MediaService {
    remote: Arc<dyn RemoteDataService>,
    settings: MediaSettings,
}

impl MediaService {
    pub fn new(remote: Arc<dyn RemoteDataService>, settings: MediaSettings) -> Self {
        Self { remote, settings }
    }

    pub fn spec_for(&self, kind: ImageKind) -> ImageSpec {
        match kind {
            ImageKind::PostImage => self.settings.post_image,
            ImageKind::Avatar => self.settings.avatar,
        }
    }

    /// Normalizes the image for `kind` and uploads it under a fresh path.
    /// The returned `full_path` is what the owning record stores.
    pub async fn upload_image(
        &self,
        session: &Session,
        kind: ImageKind,
        image: &PickedImage,
    ) -> Result<StoredObject> {
        if image.len() as u64 > self.settings.upload_max_bytes {
            return Err(anyhow!(
                "image is {} bytes, limit is {}",
                image.len(),
                self.settings.upload_max_bytes
            ));
        }

        let jpeg = normalize(image, self.spec_for(kind))?;
        let path = object_path(kind, session.user_id());
        let bytes = jpeg.len();

        let stored = self
            .remote
            .upload(
                session.access_token(),
                kind.bucket(),
                &path,
                jpeg,
                JPEG_CONTENT_TYPE,
            )
            .await?;

        info!(
            user_id = %session.user_id(),
            path = %stored.full_path,
            bytes,
            "image uploaded"
        );
        Ok(stored)
    }
}

/// Resizes to exactly the target dimensions and re-encodes as JPEG.
pub fn normalize(image: &PickedImage, spec: ImageSpec) -> Result<Bytes> {
    if image.is_empty() {
        return Err(anyhow!("image is empty"));
    }
    let decoded = image::load_from_memory(&image.bytes)
        .map_err(|err| anyhow!("failed to decode image: {}", err))?;

    let resized = if decoded.dimensions() == (spec.width, spec.height) {
        decoded
    } else {
        decoded.resize_exact(spec.width, spec.height, FilterType::Triangle)
    };
    let rgb = resized.to_rgb8();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, spec.quality)
        .encode_image(&rgb)
        .map_err(|err| anyhow!("failed to encode image: {}", err))?;
    Ok(Bytes::from(out))
}

/// `<bucket>/<user id><random 128-bit id>_<suffix>.jpg`
pub fn object_path(kind: ImageKind, user_id: Uuid) -> String {
    format!(
        "{}/{}{}_{}.jpg",
        kind.bucket().as_str(),
        user_id,
        Uuid::new_v4().simple(),
        kind.file_suffix()
    )
}
