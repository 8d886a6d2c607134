//! Channel orders, channel types, and the format resolver.
//!
//! This module defines the host-side pixel format vocabulary of the runtime
//! and the two format descriptors derived from it:
//!
//! - [`ImageFormat`] - the (channel order, channel type) pair an application
//!   declares for an image
//! - [`FormatDesc`] - the resolved `(channel_count, element_byte_size)` pair,
//!   computed by [`ImageFormat::resolve`]
//! - [`CanonicalFormat`] - the layout a device stores every image in,
//!   declared by the transfer backend rather than hard-wired
//!
//! # Resolution
//!
//! The resolver is a pure function of its inputs. A pair it does not cover
//! is reported as [`Error::UnsupportedFormat`]; the descriptor is always a
//! complete value or an error, never partially filled.
//!
//! ```rust
//! use opal_core::format::{ChannelOrder, ChannelType, ImageFormat};
//!
//! let fmt = ImageFormat::new(ChannelOrder::Rgba, ChannelType::UnormInt8);
//! let desc = fmt.resolve().unwrap();
//! assert_eq!(desc.element_size, 1);
//! assert_eq!(desc.channels, 4);
//! ```
//!
//! # Dependencies
//!
//! - [`half`] - F16 canonical lane encoding
//! - [`bytemuck`] - byte views of F32 lanes
//!
//! # Used By
//!
//! - [`crate::image::ImageDesc`] - carries an [`ImageFormat`]
//! - [`crate::region`] - canonical pixel size drives byte-space translation
//! - `opal-transfer` - converters and entry points

use crate::error::{Error, Result};
use half::f16;

/// Which named channels a pixel format exposes and in what arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// Single red channel.
    R,
    /// Single alpha channel.
    A,
    /// Red and green.
    Rg,
    /// Red and alpha.
    Ra,
    /// Single intensity channel replicated on read.
    Intensity,
    /// Single luminance channel replicated on read.
    Luminance,
    /// Red, green, blue. Only valid with the packed short/int types.
    Rgb,
    /// Red, green, blue with a padding element. Packed types only.
    Rgbx,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red, alpha.
    Bgra,
    /// Alpha, red, green, blue.
    Argb,
}

impl ChannelOrder {
    /// Number of interleaved channels a host buffer carries per pixel.
    ///
    /// This is the nominal count of the order, used for host buffer
    /// addressing and pitch defaults. It is distinct from the resolver's
    /// channel count, which describes elements per pixel of the legacy
    /// device layout (see [`ImageFormat::resolve`]).
    #[inline]
    pub const fn host_channels(&self) -> u32 {
        match self {
            Self::R | Self::A | Self::Intensity | Self::Luminance => 1,
            Self::Rg | Self::Ra => 2,
            Self::Rgb | Self::Rgbx => 3,
            Self::Rgba | Self::Bgra | Self::Argb => 4,
        }
    }

    /// Whether the converters expand this order from a single host channel.
    #[inline]
    pub const fn is_single_channel(&self) -> bool {
        matches!(self, Self::R | Self::A | Self::Intensity | Self::Luminance)
    }

    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::R => "r",
            Self::A => "a",
            Self::Rg => "rg",
            Self::Ra => "ra",
            Self::Intensity => "intensity",
            Self::Luminance => "luminance",
            Self::Rgb => "rgb",
            Self::Rgbx => "rgbx",
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
            Self::Argb => "argb",
        }
    }
}

impl std::fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Numeric encoding of each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// Normalized signed 8-bit integer.
    SnormInt8,
    /// Normalized signed 16-bit integer.
    SnormInt16,
    /// Normalized unsigned 8-bit integer.
    UnormInt8,
    /// Normalized unsigned 16-bit integer.
    UnormInt16,
    /// Packed normalized 5-6-5 RGB short.
    UnormShort565,
    /// Packed normalized x-5-5-5 RGB short.
    UnormShort555,
    /// Packed normalized x-10-10-10 RGB int.
    UnormInt101010,
    /// Unnormalized signed 8-bit integer.
    SignedInt8,
    /// Unnormalized signed 16-bit integer.
    SignedInt16,
    /// Unnormalized signed 32-bit integer.
    SignedInt32,
    /// Unnormalized unsigned 8-bit integer.
    UnsignedInt8,
    /// Unnormalized unsigned 16-bit integer.
    UnsignedInt16,
    /// Unnormalized unsigned 32-bit integer.
    UnsignedInt32,
    /// 16-bit half-precision float.
    HalfFloat,
    /// 32-bit single-precision float.
    Float,
}

impl ChannelType {
    /// Short name for display.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SnormInt8 => "snorm_int8",
            Self::SnormInt16 => "snorm_int16",
            Self::UnormInt8 => "unorm_int8",
            Self::UnormInt16 => "unorm_int16",
            Self::UnormShort565 => "unorm_short_565",
            Self::UnormShort555 => "unorm_short_555",
            Self::UnormInt101010 => "unorm_int_101010",
            Self::SignedInt8 => "signed_int8",
            Self::SignedInt16 => "signed_int16",
            Self::SignedInt32 => "signed_int32",
            Self::UnsignedInt8 => "unsigned_int8",
            Self::UnsignedInt16 => "unsigned_int16",
            Self::UnsignedInt32 => "unsigned_int32",
            Self::HalfFloat => "half_float",
            Self::Float => "float",
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Host-side pixel format of an image: channel order plus channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageFormat {
    /// Channel arrangement.
    pub order: ChannelOrder,
    /// Per-channel numeric encoding.
    pub channel_type: ChannelType,
}

impl ImageFormat {
    /// Creates a format from an order and a channel type.
    #[inline]
    pub const fn new(order: ChannelOrder, channel_type: ChannelType) -> Self {
        Self {
            order,
            channel_type,
        }
    }

    /// The format resolver: maps this pair to its element byte size and
    /// legacy channel count.
    ///
    /// Element size is 1 byte for the 8-bit integer types, 2 bytes for the
    /// 16-bit integer and packed short types, 4 bytes for the 32-bit
    /// unsigned, float, and packed 10-10-10 types. The channel count keeps
    /// the legacy layout's rule: the packed RGB/RGBx orders store one
    /// element per pixel, every other order stores four.
    ///
    /// Pairs outside those tables resolve to
    /// [`Error::UnsupportedFormat`]; the descriptor is never defaulted.
    pub fn resolve(&self) -> Result<FormatDesc> {
        let element_size = match self.channel_type {
            ChannelType::SnormInt8
            | ChannelType::UnormInt8
            | ChannelType::SignedInt8
            | ChannelType::UnsignedInt8 => 1,
            ChannelType::SnormInt16
            | ChannelType::UnormInt16
            | ChannelType::SignedInt16
            | ChannelType::UnsignedInt16
            | ChannelType::UnormShort555
            | ChannelType::UnormShort565 => 2,
            ChannelType::UnsignedInt32 | ChannelType::Float | ChannelType::UnormInt101010 => 4,
            ChannelType::SignedInt32 | ChannelType::HalfFloat => {
                return Err(Error::unsupported_format(
                    self.order,
                    self.channel_type,
                    "no element size defined for this channel type",
                ));
            }
        };
        let channels = match self.order {
            ChannelOrder::Rgb | ChannelOrder::Rgbx => 1,
            _ => 4,
        };
        Ok(FormatDesc {
            channels,
            element_size,
        })
    }

    /// Checks that the converters implement this format end to end.
    ///
    /// Conversion covers FLOAT and UNORM_INT8 scalars on the RGBA order and
    /// the single-channel orders. Anything else is rejected here, before any
    /// buffer is allocated or touched.
    pub fn ensure_convertible(&self) -> Result<()> {
        self.resolve()?;
        match self.channel_type {
            ChannelType::Float | ChannelType::UnormInt8 => {}
            _ => {
                return Err(Error::unsupported_format(
                    self.order,
                    self.channel_type,
                    "no conversion to the canonical layout",
                ));
            }
        }
        if self.order == ChannelOrder::Rgba || self.order.is_single_channel() {
            Ok(())
        } else {
            Err(Error::unsupported_format(
                self.order,
                self.channel_type,
                "no channel expansion for this order",
            ))
        }
    }

    /// Bytes per pixel in a host buffer laid out in this format.
    pub fn host_pixel_size(&self) -> Result<usize> {
        let desc = self.resolve()?;
        Ok(self.order.host_channels() as usize * desc.element_size)
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.order, self.channel_type)
    }
}

/// Resolved `(channel_count, element_byte_size)` pair for a host format.
///
/// Derived, never stored: recompute via [`ImageFormat::resolve`] for every
/// call so descriptors cannot leak across calls with different formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDesc {
    /// Elements per pixel of the legacy device layout.
    pub channels: u32,
    /// Bytes per element.
    pub element_size: usize,
}

/// Scalar encoding of a canonical lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CanonicalScalar {
    /// 32-bit single-precision float lanes.
    #[default]
    F32,
    /// 16-bit half-precision float lanes.
    F16,
}

impl CanonicalScalar {
    /// Bytes per lane.
    #[inline]
    pub const fn size(&self) -> usize {
        match self {
            Self::F32 => 4,
            Self::F16 => 2,
        }
    }
}

/// The layout a device stores every image in, whatever format the
/// application declared.
///
/// Canonical storage is always four channels, row-major, no slice padding;
/// the scalar encoding of each lane is the device's choice. The default is
/// four F32 lanes per pixel.
///
/// # Example
///
/// ```rust
/// use opal_core::format::CanonicalFormat;
///
/// assert_eq!(CanonicalFormat::RGBA_F32.pixel_size(), 16);
/// assert_eq!(CanonicalFormat::RGBA_F16.pixel_size(), 8);
/// assert_eq!(CanonicalFormat::RGBA_F32.row_pitch(640), 640 * 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CanonicalFormat {
    /// Lane scalar encoding.
    pub scalar: CanonicalScalar,
}

impl CanonicalFormat {
    /// Canonical lanes per pixel.
    pub const CHANNELS: usize = 4;

    /// Four F32 lanes per pixel.
    pub const RGBA_F32: Self = Self {
        scalar: CanonicalScalar::F32,
    };

    /// Four F16 lanes per pixel.
    pub const RGBA_F16: Self = Self {
        scalar: CanonicalScalar::F16,
    };

    /// Bytes per canonical pixel.
    #[inline]
    pub const fn pixel_size(&self) -> usize {
        Self::CHANNELS * self.scalar.size()
    }

    /// Canonical row pitch in bytes for an image of the given width.
    #[inline]
    pub const fn row_pitch(&self, width: u32) -> usize {
        width as usize * self.pixel_size()
    }

    /// Total canonical storage for a full image.
    #[inline]
    pub const fn image_size(&self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.pixel_size()
    }

    /// Encodes one pixel's four lanes into `texel`.
    ///
    /// `texel` must be exactly [`pixel_size`](Self::pixel_size) bytes.
    pub fn store_texel(&self, texel: &mut [u8], lanes: [f32; 4]) {
        match self.scalar {
            CanonicalScalar::F32 => {
                texel.copy_from_slice(bytemuck::bytes_of(&lanes));
            }
            CanonicalScalar::F16 => {
                for (chunk, lane) in texel.chunks_exact_mut(2).zip(lanes) {
                    chunk.copy_from_slice(&f16::from_f32(lane).to_ne_bytes());
                }
            }
        }
    }

    /// Decodes one pixel's four lanes from `texel`.
    ///
    /// `texel` must be exactly [`pixel_size`](Self::pixel_size) bytes.
    pub fn load_texel(&self, texel: &[u8]) -> [f32; 4] {
        let mut lanes = [0.0f32; 4];
        match self.scalar {
            CanonicalScalar::F32 => {
                bytemuck::bytes_of_mut(&mut lanes).copy_from_slice(texel);
            }
            CanonicalScalar::F16 => {
                for (lane, chunk) in lanes.iter_mut().zip(texel.chunks_exact(2)) {
                    *lane = f16::from_ne_bytes([chunk[0], chunk[1]]).to_f32();
                }
            }
        }
        lanes
    }
}
