//! Image providers, decoded handles and box fitting.
//!
//! Providers decode through the `image` crate. Decoding happens outside the
//! render pass (see [`ImageLoader`]); the tree only ever sees finished
//! [`ImageLoadPayload`]s delivered as notifications.

pub mod loader;

pub use loader::{
    ImageEvent, ImageLifecycle, ImageLoader, ImageNotification, ImageRequest, ImageTicket,
};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use thiserror::Error;

use crate::layout::Size;

/// Decoded RGBA pixels, shared between the cache, the tree and surfaces.
///
/// Two handles are equal when they point at the same pixel buffer.
#[derive(Clone)]
pub struct ImageHandle {
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Intrinsic size in logical pixels.
    pub fn size(&self) -> Size {
        Size::new(self.width() as f32, self.height() as f32)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// What a provider resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLoadPayload {
    pub size: Size,
    pub handle: ImageHandle,
}

impl ImageLoadPayload {
    pub fn new(handle: ImageHandle) -> Self {
        Self {
            size: handle.size(),
            handle,
        }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("{0}")]
    Provider(String),
}

/// Progress callback: `(bytes_loaded, total_bytes)`.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, Option<u64>);

/// Source of image data.
///
/// `load` blocks; the loader decides whether it runs inline or on a
/// worker thread.
pub trait ImageProvider: Send + Sync + fmt::Debug {
    /// Cache key. Providers with equal keys must produce the same image.
    fn key(&self) -> String;

    fn load(&self, progress: ProgressFn<'_>) -> Result<ImageLoadPayload, ImageError>;
}

fn decode(bytes: &[u8]) -> Result<ImageLoadPayload, ImageError> {
    let pixels = image::load_from_memory(bytes)?.to_rgba8();
    Ok(ImageLoadPayload::new(ImageHandle::new(pixels)))
}

/// Encoded image bytes held in memory.
#[derive(Clone)]
pub struct MemoryImageProvider {
    key: String,
    bytes: Arc<[u8]>,
}

impl MemoryImageProvider {
    pub fn new(key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            bytes: bytes.into().into(),
        }
    }
}

impl fmt::Debug for MemoryImageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryImageProvider")
            .field("key", &self.key)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl ImageProvider for MemoryImageProvider {
    fn key(&self) -> String {
        format!("memory:{}", self.key)
    }

    fn load(&self, progress: ProgressFn<'_>) -> Result<ImageLoadPayload, ImageError> {
        let total = self.bytes.len() as u64;
        progress(0, Some(total));
        let payload = decode(&self.bytes)?;
        progress(total, Some(total));
        Ok(payload)
    }
}

/// Image file on disk, read and decoded on load.
#[derive(Debug, Clone)]
pub struct FileImageProvider {
    path: PathBuf,
}

impl FileImageProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageProvider for FileImageProvider {
    fn key(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn load(&self, progress: ProgressFn<'_>) -> Result<ImageLoadPayload, ImageError> {
        let total = std::fs::metadata(&self.path).ok().map(|m| m.len());
        progress(0, total);
        let bytes = std::fs::read(&self.path).map_err(|source| ImageError::Io {
            path: self.path.clone(),
            source,
        })?;
        progress(bytes.len() as u64, total);
        decode(&bytes)
    }
}

/// How an image is inscribed into the box it paints in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxFit {
    /// Stretch to fill, ignoring the aspect ratio.
    Fill,
    /// As large as possible while still fully inside the box.
    #[default]
    Contain,
    /// As small as possible while still covering the box; the source is cropped.
    Cover,
    FitWidth,
    FitHeight,
    /// Intrinsic size, cropped to the box.
    None,
    /// `Contain`, but never scaled up.
    ScaleDown,
}

/// Region of the image to read (`source`) and the size to draw it at
/// (`destination`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedSizes {
    pub source: Size,
    pub destination: Size,
}

pub fn apply_box_fit(fit: BoxFit, input: Size, output: Size) -> FittedSizes {
    if input.is_empty() || output.is_empty() {
        return FittedSizes {
            source: Size::zero(),
            destination: Size::zero(),
        };
    }

    let output_wider = output.width / output.height > input.width / input.height;
    let (source, destination) = match fit {
        BoxFit::Fill => (input, output),
        BoxFit::Contain => {
            let destination = if output_wider {
                Size::new(input.width * output.height / input.height, output.height)
            } else {
                Size::new(output.width, input.height * output.width / input.width)
            };
            (input, destination)
        }
        BoxFit::Cover => {
            let source = if output_wider {
                Size::new(input.width, input.width * output.height / output.width)
            } else {
                Size::new(input.height * output.width / output.height, input.height)
            };
            (source, output)
        }
        BoxFit::FitWidth => {
            if output_wider {
                (
                    Size::new(input.width, input.width * output.height / output.width),
                    output,
                )
            } else {
                (
                    input,
                    Size::new(output.width, input.height * output.width / input.width),
                )
            }
        }
        BoxFit::FitHeight => {
            if output_wider {
                (
                    input,
                    Size::new(input.width * output.height / input.height, output.height),
                )
            } else {
                (
                    Size::new(input.height * output.width / output.height, input.height),
                    output,
                )
            }
        }
        BoxFit::None => {
            let source = Size::new(
                input.width.min(output.width),
                input.height.min(output.height),
            );
            (source, source)
        }
        BoxFit::ScaleDown => {
            let aspect = input.width / input.height;
            let mut destination = input;
            if destination.height > output.height {
                destination = Size::new(output.height * aspect, output.height);
            }
            if destination.width > output.width {
                destination = Size::new(output.width, output.width / aspect);
            }
            (input, destination)
        }
    };

    FittedSizes {
        source,
        destination,
    }
}
