//! Error types for opal transfer operations.
//!
//! One [`Error`] enum covers every failure mode of the transfer core:
//! invalid image objects, invalid call arguments, staged-buffer allocation
//! failures, and unsupported pixel formats. Every error is detected
//! synchronously and returned to the immediate caller; nothing is retried
//! internally.
//!
//! # Categories
//!
//! Callers that need the coarse status taxonomy rather than the precise
//! variant can use the category predicates:
//!
//! - [`is_invalid_object`](Error::is_invalid_object) -
//!   [`UnboundImage`](Error::UnboundImage), [`InvalidDimensions`](Error::InvalidDimensions)
//! - [`is_invalid_argument`](Error::is_invalid_argument) -
//!   [`HostBufferTooSmall`](Error::HostBufferTooSmall),
//!   [`InvalidRowPitch`](Error::InvalidRowPitch),
//!   [`RegionOutOfBounds`](Error::RegionOutOfBounds)
//! - [`is_out_of_memory`](Error::is_out_of_memory) -
//!   [`AllocationFailed`](Error::AllocationFailed)
//! - [`is_unsupported_format`](Error::is_unsupported_format) -
//!   [`UnsupportedFormat`](Error::UnsupportedFormat)
//!
//! [`TransferFailed`](Error::TransferFailed) sits outside the four
//! categories: it propagates a failure reported by the transfer backend.
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use crate::format::{ChannelOrder, ChannelType};
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving formats, translating regions, or
/// transferring image data.
#[derive(Debug, Error)]
pub enum Error {
    /// The image handle is not bound to any storage on the selected device.
    #[error("invalid image object: no storage bound for handle {handle}")]
    UnboundImage {
        /// Raw handle value that failed to resolve
        handle: u64,
    },

    /// The image descriptor carries unusable geometry.
    #[error("invalid image object: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Why the geometry is unusable
        reason: String,
    },

    /// The host buffer is missing or smaller than the transfer requires.
    #[error("host buffer holds {provided} bytes, transfer requires {required}")]
    HostBufferTooSmall {
        /// Bytes the conversion would touch
        required: usize,
        /// Bytes the caller supplied
        provided: usize,
    },

    /// A caller-supplied row pitch is below the minimum for the image width.
    #[error("host row pitch {pitch} is less than minimum {min_pitch} for width {width}")]
    InvalidRowPitch {
        /// Requested pitch in elements
        pitch: usize,
        /// Minimum pitch in elements
        min_pitch: usize,
        /// Image width in pixels
        width: u32,
    },

    /// The translated byte span does not fit in the image's allocated storage.
    #[error("region needs {span} bytes of device storage, image holds {size}")]
    RegionOutOfBounds {
        /// Bytes the translated region addresses
        span: usize,
        /// Allocated storage size in bytes
        size: usize,
    },

    /// Staged-buffer allocation failed.
    #[error("failed to allocate {requested} bytes for the staged buffer")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
    },

    /// The (channel order, channel type) pair is outside the coverage of the
    /// resolver or the converters.
    #[error("unsupported image format {order}/{channel_type}: {reason}")]
    UnsupportedFormat {
        /// Channel order of the rejected format
        order: ChannelOrder,
        /// Channel type of the rejected format
        channel_type: ChannelType,
        /// Which piece of the core rejected it
        reason: &'static str,
    },

    /// The transfer backend reported a failure.
    #[error("device transfer failed: {reason}")]
    TransferFailed {
        /// Backend-supplied description
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::UnboundImage`] error.
    #[inline]
    pub fn unbound_image(handle: u64) -> Self {
        Self::UnboundImage { handle }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::HostBufferTooSmall`] error.
    #[inline]
    pub fn host_buffer_too_small(required: usize, provided: usize) -> Self {
        Self::HostBufferTooSmall { required, provided }
    }

    /// Creates an [`Error::InvalidRowPitch`] error.
    #[inline]
    pub fn invalid_row_pitch(pitch: usize, min_pitch: usize, width: u32) -> Self {
        Self::InvalidRowPitch {
            pitch,
            min_pitch,
            width,
        }
    }

    /// Creates an [`Error::RegionOutOfBounds`] error.
    #[inline]
    pub fn region_out_of_bounds(span: usize, size: usize) -> Self {
        Self::RegionOutOfBounds { span, size }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize) -> Self {
        Self::AllocationFailed { requested }
    }

    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(
        order: ChannelOrder,
        channel_type: ChannelType,
        reason: &'static str,
    ) -> Self {
        Self::UnsupportedFormat {
            order,
            channel_type,
            reason,
        }
    }

    /// Creates an [`Error::TransferFailed`] error.
    #[inline]
    pub fn transfer_failed(reason: impl Into<String>) -> Self {
        Self::TransferFailed {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is an invalid-object error.
    #[inline]
    pub fn is_invalid_object(&self) -> bool {
        matches!(
            self,
            Self::UnboundImage { .. } | Self::InvalidDimensions { .. }
        )
    }

    /// Returns `true` if this is an invalid-argument error.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::HostBufferTooSmall { .. }
                | Self::InvalidRowPitch { .. }
                | Self::RegionOutOfBounds { .. }
        )
    }

    /// Returns `true` if this is a resource-exhaustion error.
    #[inline]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Returns `true` if this is an unsupported-format error.
    #[inline]
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbound_image() {
        let err = Error::unbound_image(42);
        assert!(err.to_string().contains("42"));
        assert!(err.is_invalid_object());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_host_buffer_too_small() {
        let err = Error::host_buffer_too_small(256, 16);
        let msg = err.to_string();
        assert!(msg.contains("256"));
        assert!(msg.contains("16"));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_region_out_of_bounds() {
        let err = Error::region_out_of_bounds(128, 64);
        assert!(err.is_invalid_argument());
        assert!(!err.is_out_of_memory());
    }

    #[test]
    fn test_allocation_failed() {
        let err = Error::allocation_failed(usize::MAX);
        assert!(err.is_out_of_memory());
    }

    #[test]
    fn test_unsupported_format() {
        let err = Error::unsupported_format(
            ChannelOrder::Rg,
            ChannelType::Float,
            "no conversion to the canonical layout",
        );
        let msg = err.to_string();
        assert!(msg.contains("rg"));
        assert!(msg.contains("float"));
        assert!(err.is_unsupported_format());
    }

    #[test]
    fn test_categories_are_disjoint() {
        let errs = [
            Error::unbound_image(1),
            Error::host_buffer_too_small(2, 1),
            Error::allocation_failed(8),
            Error::unsupported_format(ChannelOrder::R, ChannelType::HalfFloat, "x"),
        ];
        for err in &errs {
            let hits = [
                err.is_invalid_object(),
                err.is_invalid_argument(),
                err.is_out_of_memory(),
                err.is_unsupported_format(),
            ]
            .iter()
            .filter(|&&b| b)
            .count();
            assert_eq!(hits, 1);
        }
    }
}
