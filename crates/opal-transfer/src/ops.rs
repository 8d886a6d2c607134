//! Entry points: write and read an image region through the staged
//! canonical layout.
//!
//! Both operations run synchronously on the caller's thread: validate in
//! taxonomy order, translate the region, stage one full-image conversion
//! buffer, and issue exactly one rectangular transfer. Nothing is retried;
//! every rejection happens before the device or the host buffer is
//! touched.

use opal_core::{Error, ImageDesc, Region, Result};
use tracing::{debug, trace, warn};

use crate::device::RectTransfer;
use crate::stage;

/// Writes a region of `host` pixels into the image's device storage.
///
/// The host buffer is laid out in the image's declared format, row-major,
/// interleaved, covering the full image extent. `host_row_pitch` is in
/// elements and defaults to `width * host_channels`; `host_slice_pitch` is
/// accepted for call-shape compatibility but has no effect on 2-D images,
/// which carry no slices.
///
/// A zero-volume region validates its arguments and returns without
/// converting or transferring anything.
pub fn write_image_region<D: RectTransfer>(
    device: &mut D,
    image: &ImageDesc,
    region: &Region,
    host_row_pitch: Option<usize>,
    _host_slice_pitch: Option<usize>,
    host: &[u8],
) -> Result<()> {
    debug!(
        width = image.width,
        height = image.height,
        format = %image.format,
        %region,
        "write image region"
    );
    if host.is_empty() {
        return Err(Error::host_buffer_too_small(1, 0));
    }
    image.format.ensure_convertible()?;

    let canonical = device.canonical_format();
    let span = region.to_device_span(&canonical, image)?;
    if region.is_empty() {
        trace!("zero-volume region, nothing to transfer");
        return Ok(());
    }

    let row_pitch = stage::resolve_row_pitch(image, host_row_pitch)?;
    let required = stage::host_span_bytes(image, row_pitch)?;
    if host.len() < required {
        return Err(Error::host_buffer_too_small(required, host.len()));
    }

    let mut staged = stage::alloc_staged(image, &canonical)?;
    stage::stage_from_host(image, &canonical, host, row_pitch, &mut staged)?;
    trace!(staged_bytes = staged.len(), "staged full image for write");

    device.write_rect(
        image.handle,
        &staged,
        span.origin,
        span.origin,
        span.extent,
        span.row_pitch,
        span.slice_pitch,
        span.row_pitch,
        span.slice_pitch,
    )
}

/// Reads the image back from device storage into `host`, re-encoded in the
/// image's declared format.
///
/// The staged read covers the full image extent; the caller's region is
/// validated against the device storage like on the write path but only
/// addresses the device copy. `host_row_pitch` is in elements and defaults
/// to `width * host_channels`; `host_slice_pitch` is accepted for
/// call-shape compatibility but has no effect on 2-D images.
///
/// On any rejection the host buffer is left untouched.
pub fn read_image_region<D: RectTransfer>(
    device: &D,
    image: &ImageDesc,
    region: &Region,
    host_row_pitch: Option<usize>,
    _host_slice_pitch: Option<usize>,
    host: &mut [u8],
) -> Result<()> {
    debug!(
        width = image.width,
        height = image.height,
        format = %image.format,
        %region,
        "read image region"
    );
    if host.is_empty() {
        return Err(Error::host_buffer_too_small(1, 0));
    }
    image.format.ensure_convertible()?;

    let canonical = device.canonical_format();
    if let Err(err) = region.to_device_span(&canonical, image) {
        warn!(%region, size = image.size, "read region rejected by bounds validation");
        return Err(err);
    }
    if region.is_empty() {
        trace!("zero-volume region, nothing to transfer");
        return Ok(());
    }

    let row_pitch = stage::resolve_row_pitch(image, host_row_pitch)?;
    let required = stage::host_span_bytes(image, row_pitch)?;
    if host.len() < required {
        return Err(Error::host_buffer_too_small(required, host.len()));
    }

    let mut staged = stage::alloc_staged(image, &canonical)?;
    let full = Region::full(image.width, image.height).to_device_span(&canonical, image)?;
    device.read_rect(
        image.handle,
        &mut staged,
        full.origin,
        full.origin,
        full.extent,
        full.row_pitch,
        full.slice_pitch,
        full.row_pitch,
        full.slice_pitch,
    )?;
    trace!(staged_bytes = staged.len(), "staged full image for read");

    stage::unstage_to_host(image, &canonical, &staged, host, row_pitch)
}
