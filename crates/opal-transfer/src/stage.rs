//! Staged-buffer conversion between host pixel layouts and the canonical
//! device layout.
//!
//! The staged buffer always covers the full image extent in canonical
//! layout. On a write the host buffer is decoded, expanded to four
//! channels, and encoded into it; on a read it is decoded back and
//! re-encoded into the host's declared format. Convertibility is checked by
//! the entry points before any buffer here is allocated.

use opal_core::{CanonicalFormat, ChannelOrder, ChannelType, Error, ImageDesc, ImageFormat, Result};

/// Resolves the caller's host row pitch, in elements.
///
/// `None` defaults to one full row of interleaved channels; an explicit
/// pitch below that minimum is an invalid argument.
pub fn resolve_row_pitch(image: &ImageDesc, requested: Option<usize>) -> Result<usize> {
    let min_pitch = image.width as usize * image.format.order.host_channels() as usize;
    match requested {
        None => Ok(min_pitch),
        Some(pitch) if pitch < min_pitch => {
            Err(Error::invalid_row_pitch(pitch, min_pitch, image.width))
        }
        Some(pitch) => Ok(pitch),
    }
}

/// Host bytes the full-image conversion touches at the given element pitch.
pub fn host_span_bytes(image: &ImageDesc, row_pitch: usize) -> Result<usize> {
    let desc = image.format.resolve()?;
    let channels = image.format.order.host_channels() as usize;
    let rows = image.height as usize;
    Ok(((rows - 1) * row_pitch + image.width as usize * channels) * desc.element_size)
}

/// Allocates the zeroed staged buffer for the full image extent.
///
/// The only fallible allocation in a transfer; failure maps to the
/// resource-exhaustion status without touching the device.
pub fn alloc_staged(image: &ImageDesc, canonical: &CanonicalFormat) -> Result<Vec<u8>> {
    let size = canonical.image_size(image.width, image.height);
    let mut staged = Vec::new();
    staged
        .try_reserve_exact(size)
        .map_err(|_| Error::allocation_failed(size))?;
    staged.resize(size, 0);
    Ok(staged)
}

/// Write path: decodes host pixels, expands each to four canonical
/// channels, and encodes them into `staged`.
///
/// The host buffer must span [`host_span_bytes`] at `row_pitch`; `staged`
/// must span the full canonical image.
pub fn stage_from_host(
    image: &ImageDesc,
    canonical: &CanonicalFormat,
    host: &[u8],
    row_pitch: usize,
    staged: &mut [u8],
) -> Result<()> {
    let desc = image.format.resolve()?;
    let channels = image.format.order.host_channels() as usize;
    let texel = canonical.pixel_size();
    let width = image.width as usize;

    for y in 0..image.height as usize {
        for x in 0..width {
            let base = (y * row_pitch + x * channels) * desc.element_size;
            let mut lanes = [0.0f32; 4];
            for (k, lane) in lanes.iter_mut().enumerate().take(channels) {
                *lane = decode_channel(
                    image.format,
                    host,
                    base + k * desc.element_size,
                )?;
            }
            let expanded = expand_channels(image.format.order, lanes)?;
            let off = (y * width + x) * texel;
            canonical.store_texel(&mut staged[off..off + texel], expanded);
        }
    }
    Ok(())
}

/// Read path: decodes canonical pixels from `staged`, selects the channels
/// the image's order exposes, and re-encodes them into `host`.
pub fn unstage_to_host(
    image: &ImageDesc,
    canonical: &CanonicalFormat,
    staged: &[u8],
    host: &mut [u8],
    row_pitch: usize,
) -> Result<()> {
    let desc = image.format.resolve()?;
    let channels = image.format.order.host_channels() as usize;
    let texel = canonical.pixel_size();
    let width = image.width as usize;

    for y in 0..image.height as usize {
        for x in 0..width {
            let off = (y * width + x) * texel;
            let lanes = canonical.load_texel(&staged[off..off + texel]);
            let selected = select_channels(image.format.order, lanes)?;
            let base = (y * row_pitch + x * channels) * desc.element_size;
            for (k, value) in selected.iter().enumerate().take(channels) {
                encode_channel(
                    image.format,
                    *value,
                    host,
                    base + k * desc.element_size,
                )?;
            }
        }
    }
    Ok(())
}

/// Decodes one host channel at `offset` to its normalized float value.
fn decode_channel(format: ImageFormat, host: &[u8], offset: usize) -> Result<f32> {
    match format.channel_type {
        ChannelType::Float => Ok(f32::from_ne_bytes([
            host[offset],
            host[offset + 1],
            host[offset + 2],
            host[offset + 3],
        ])),
        ChannelType::UnormInt8 => Ok(host[offset] as f32 / 255.0),
        _ => Err(Error::unsupported_format(
            format.order,
            format.channel_type,
            "no conversion to the canonical layout",
        )),
    }
}

/// Re-encodes one normalized float value into the host channel at `offset`.
///
/// UNORM_INT8 clamps to [0, 1] before scaling, so out-of-range canonical
/// values saturate instead of wrapping.
fn encode_channel(format: ImageFormat, value: f32, host: &mut [u8], offset: usize) -> Result<()> {
    match format.channel_type {
        ChannelType::Float => {
            host[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
            Ok(())
        }
        ChannelType::UnormInt8 => {
            host[offset] = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
            Ok(())
        }
        _ => Err(Error::unsupported_format(
            format.order,
            format.channel_type,
            "no conversion from the canonical layout",
        )),
    }
}

/// Expands decoded host channels into the four canonical lanes.
///
/// RGBA copies all four; a single-channel order lands in lane 0 with
/// opaque alpha.
fn expand_channels(order: ChannelOrder, lanes: [f32; 4]) -> Result<[f32; 4]> {
    if order == ChannelOrder::Rgba {
        Ok(lanes)
    } else if order.is_single_channel() {
        Ok([lanes[0], 0.0, 0.0, 1.0])
    } else {
        Err(Error::unsupported_format(
            order,
            ChannelType::Float,
            "no channel expansion for this order",
        ))
    }
}

/// Selects the canonical lanes the image's order exposes on read.
///
/// RGBA takes all four; a single-channel order takes lane 0 and discards
/// the rest.
fn select_channels(order: ChannelOrder, lanes: [f32; 4]) -> Result<[f32; 4]> {
    if order == ChannelOrder::Rgba {
        Ok(lanes)
    } else if order.is_single_channel() {
        Ok([lanes[0], 0.0, 0.0, 0.0])
    } else {
        Err(Error::unsupported_format(
            order,
            ChannelType::Float,
            "no channel selection for this order",
        ))
    }
}
