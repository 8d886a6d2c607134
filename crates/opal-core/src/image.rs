//! Image descriptors and handles.
//!
//! [`ImageDesc`] is the "header" of an image: geometry, declared host
//! format, and the total size of its opaque device-side storage. The
//! transfer core only ever reads these fields; creation and destruction of
//! the storage itself belong to the allocation collaborator.
//!
//! # Usage
//!
//! ```rust
//! use opal_core::format::{CanonicalFormat, ChannelOrder, ChannelType, ImageFormat};
//! use opal_core::image::{ImageDesc, ImageHandle};
//!
//! let fmt = ImageFormat::new(ChannelOrder::Rgba, ChannelType::UnormInt8);
//! let img = ImageDesc::with_canonical_storage(
//!     ImageHandle::new(1), 640, 480, fmt, &CanonicalFormat::RGBA_F32,
//! ).unwrap();
//! assert_eq!(img.size, 640 * 480 * 16);
//! ```

use crate::error::{Error, Result};
use crate::format::{CanonicalFormat, ImageFormat};

/// Opaque identity of an image across the runtime.
///
/// Handles are minted by the allocation collaborator; the transfer core
/// only forwards them to the transfer backend, which resolves them to
/// device storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(u64);

impl ImageHandle {
    /// Wraps a raw handle value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Geometry, format, and storage size of an image.
///
/// `size` is the allocated byte size of the device-side canonical storage,
/// not of any host layout; region validation bounds every transfer against
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDesc {
    /// Runtime-wide identity.
    pub handle: ImageHandle,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Declared host-side format.
    pub format: ImageFormat,
    /// Allocated device storage in bytes.
    pub size: usize,
}

impl ImageDesc {
    /// Creates a descriptor, rejecting zero dimensions.
    pub fn new(
        handle: ImageHandle,
        width: u32,
        height: u32,
        format: ImageFormat,
        size: usize,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(
                width,
                height,
                "image dimensions must be positive",
            ));
        }
        Ok(Self {
            handle,
            width,
            height,
            format,
            size,
        })
    }

    /// Creates a descriptor whose storage size matches the given canonical
    /// layout exactly.
    pub fn with_canonical_storage(
        handle: ImageHandle,
        width: u32,
        height: u32,
        format: ImageFormat,
        canonical: &CanonicalFormat,
    ) -> Result<Self> {
        Self::new(handle, width, height, format, canonical.image_size(width, height))
    }

    /// Pixels in the image.
    #[inline]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
