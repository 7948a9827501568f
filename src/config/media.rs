use anyhow::{anyhow, Result};

/// Target geometry and JPEG quality for one kind of uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl ImageSpec {
    pub fn new(width: u32, height: u32, quality: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("image dimensions must be greater than 0"));
        }
        if !(1..=100).contains(&quality) {
            return Err(anyhow!("jpeg quality must be between 1 and 100"));
        }
        Ok(Self {
            width,
            height,
            quality,
        })
    }

    pub fn square(size: u32, quality: u8) -> Result<Self> {
        Self::new(size, size, quality)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MediaSettings {
    pub post_image: ImageSpec,
    pub avatar: ImageSpec,
    pub upload_max_bytes: u64,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            post_image: ImageSpec {
                width: 600,
                height: 400,
                quality: 70,
            },
            avatar: ImageSpec {
                width: 300,
                height: 300,
                quality: 70,
            },
            upload_max_bytes: 10 * 1024 * 1024,
        }
    }
}
