//! Pixel-space transfer regions and their device byte-space translation.
//!
//! A [`Region`] is the (origin, extent) pair an application passes to
//! address a sub-rectangle of an image for a partial transfer, in pixel
//! units. [`Region::to_device_span`] turns it into the byte/row addressing
//! of the canonical device layout and validates it against the image's
//! allocated storage, producing a [`DeviceSpan`] for the transfer backend.
//!
//! # Coordinate System
//!
//! Origin (0, 0, 0) is the top-left pixel of the first slice; X increases
//! to the right, Y downward. 2-D images carry a depth extent of 1.
//!
//! # Translation
//!
//! Only axis 0 changes unit: it is scaled by the canonical pixel size
//! (16 bytes for the default RGBA/F32 layout). Axes 1 and 2 stay in
//! row/slice units because the canonical row pitch already encodes the row
//! width. The canonical layout has no slice padding, so the slice pitch is
//! always zero in this core's 2-D scope.
//!
//! # Usage
//!
//! ```rust
//! use opal_core::region::Region;
//!
//! let full = Region::full(640, 480);
//! assert_eq!(full.volume(), 640 * 480);
//!
//! let empty = Region::new_2d(0, 0, 0, 480);
//! assert!(empty.is_empty());
//! ```
//!
//! # Used By
//!
//! - `opal-transfer` - entry points validate every region before staging

use crate::error::{Error, Result};
use crate::format::CanonicalFormat;
use crate::image::ImageDesc;

/// An (origin, extent) pair in pixel units addressing a sub-rectangle of an
/// image.
///
/// # Invariants
///
/// Extents are non-negative by construction; a zero-volume extent is a
/// valid no-op transfer, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Starting pixel along (x, y, z).
    pub origin: [usize; 3],
    /// Extent in (pixels, rows, slices).
    pub extent: [usize; 3],
}

impl Region {
    /// Creates a region from raw origin and extent triples.
    #[inline]
    pub const fn new(origin: [usize; 3], extent: [usize; 3]) -> Self {
        Self { origin, extent }
    }

    /// 2-D region at `(x, y)` covering `width x height` pixels, depth 1.
    #[inline]
    pub const fn new_2d(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            origin: [x, y, 0],
            extent: [width, height, 1],
        }
    }

    /// Full extent of a `width x height` image.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new_2d(0, 0, width as usize, height as usize)
    }

    /// Pixel volume of the region.
    #[inline]
    pub const fn volume(&self) -> usize {
        self.extent[0] * self.extent[1] * self.extent[2]
    }

    /// Returns `true` if any extent dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.volume() == 0
    }

    /// Translates this region into canonical byte-space addressing and
    /// validates it against the image's allocated storage.
    ///
    /// For a non-zero volume the last addressed byte,
    /// `(extent[0]-1) + row_pitch*(extent[1]-1) + slice_pitch*(extent[2]-1)`
    /// in byte-space, must fall inside `image.size`; otherwise the region is
    /// rejected with [`Error::RegionOutOfBounds`]. Zero-volume regions
    /// always pass.
    pub fn to_device_span(
        &self,
        canonical: &CanonicalFormat,
        image: &ImageDesc,
    ) -> Result<DeviceSpan> {
        let pixel_size = canonical.pixel_size();
        let span = DeviceSpan {
            origin: [self.origin[0] * pixel_size, self.origin[1], self.origin[2]],
            extent: [self.extent[0] * pixel_size, self.extent[1], self.extent[2]],
            row_pitch: canonical.row_pitch(image.width),
            slice_pitch: 0,
        };
        if !self.is_empty() {
            let last = (span.extent[0] - 1)
                + span.row_pitch * (span.extent[1] - 1)
                + span.slice_pitch * (span.extent[2] - 1);
            if last >= image.size {
                return Err(Error::region_out_of_bounds(last + 1, image.size));
            }
        }
        Ok(span)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Region(({}, {}, {}) + {}x{}x{})",
            self.origin[0],
            self.origin[1],
            self.origin[2],
            self.extent[0],
            self.extent[1],
            self.extent[2]
        )
    }
}

/// Device-level byte addressing for a translated region.
///
/// `origin[0]` and `extent[0]` are in bytes; the other axes stay in
/// row/slice units. Handed verbatim to the transfer backend's rect
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSpan {
    /// Byte-space origin.
    pub origin: [usize; 3],
    /// Byte-space extent.
    pub extent: [usize; 3],
    /// Canonical row pitch in bytes.
    pub row_pitch: usize,
    /// Canonical slice pitch in bytes (zero, no slice padding).
    pub slice_pitch: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{ChannelOrder, ChannelType, ImageFormat};
    use crate::image::ImageHandle;

    fn image(width: u32, height: u32) -> ImageDesc {
        ImageDesc::with_canonical_storage(
            ImageHandle::new(1),
            width,
            height,
            ImageFormat::new(ChannelOrder::Rgba, ChannelType::Float),
            &CanonicalFormat::RGBA_F32,
        )
        .unwrap()
    }

    #[test]
    fn test_translation_scales_first_axis_only() {
        let img = image(8, 8);
        let span = Region::new_2d(1, 2, 3, 4)
            .to_device_span(&CanonicalFormat::RGBA_F32, &img)
            .unwrap();
        assert_eq!(span.origin, [16, 2, 0]);
        assert_eq!(span.extent, [48, 4, 1]);
        assert_eq!(span.row_pitch, 8 * 16);
        assert_eq!(span.slice_pitch, 0);
    }

    #[test]
    fn test_translation_follows_canonical_scalar() {
        let img = ImageDesc::with_canonical_storage(
            ImageHandle::new(1),
            8,
            8,
            ImageFormat::new(ChannelOrder::Rgba, ChannelType::Float),
            &CanonicalFormat::RGBA_F16,
        )
        .unwrap();
        let span = Region::new_2d(1, 0, 2, 1)
            .to_device_span(&CanonicalFormat::RGBA_F16, &img)
            .unwrap();
        assert_eq!(span.origin, [8, 0, 0]);
        assert_eq!(span.extent, [16, 1, 1]);
        assert_eq!(span.row_pitch, 8 * 8);
    }

    #[test]
    fn test_full_region_fits_exactly() {
        let img = image(4, 4);
        let span = Region::full(4, 4)
            .to_device_span(&CanonicalFormat::RGBA_F32, &img)
            .unwrap();
        let last = (span.extent[0] - 1) + span.row_pitch * (span.extent[1] - 1);
        assert_eq!(last, img.size - 1);
    }

    #[test]
    fn test_oversized_region_rejected() {
        let img = image(4, 4);
        let err = Region::new_2d(0, 0, 5, 4)
            .to_device_span(&CanonicalFormat::RGBA_F32, &img)
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = Region::new_2d(0, 0, 4, 5)
            .to_device_span(&CanonicalFormat::RGBA_F32, &img)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_zero_volume_always_passes() {
        let img = image(4, 4);
        for extent in [[0, 4, 1], [4, 0, 1], [4, 4, 0], [0, 0, 0]] {
            let region = Region::new([0, 0, 0], extent);
            assert!(region.is_empty());
            assert!(region
                .to_device_span(&CanonicalFormat::RGBA_F32, &img)
                .is_ok());
        }
        // Even a zero-volume region far outside the extent is a no-op.
        let region = Region::new([100, 100, 0], [0, 10, 1]);
        assert!(region
            .to_device_span(&CanonicalFormat::RGBA_F32, &img)
            .is_ok());
    }

    #[test]
    fn test_volume() {
        assert_eq!(Region::new_2d(0, 0, 3, 2).volume(), 6);
        assert_eq!(Region::full(4, 4).volume(), 16);
        assert!(!Region::full(4, 4).is_empty());
    }
}
