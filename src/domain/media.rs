pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Posts,
    Avatars,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Avatars => "avatars",
        }
    }
}

/// What an uploaded image belongs to. Decides bucket, key prefix and the
/// file-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    PostImage,
    Avatar,
}

impl ImageKind {
    pub fn bucket(&self) -> Bucket {
        match self {
            Self::PostImage => Bucket::Posts,
            Self::Avatar => Bucket::Avatars,
        }
    }

    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::PostImage => "post",
            Self::Avatar => "avatar",
        }
    }
}

/// Result of a storage upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Key inside the bucket, as requested by the caller.
    pub path: String,
    /// Bucket-qualified key; this is what records store.
    pub full_path: String,
}
