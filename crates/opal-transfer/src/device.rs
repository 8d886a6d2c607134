//! Transfer backend contract and the host-memory reference backend.

use std::collections::HashMap;

use opal_core::{CanonicalFormat, Error, ImageDesc, ImageHandle, Result};

/// Synchronous rectangular transfer engine for one device.
///
/// Implementors move bytes between a staged host buffer and the device
/// storage bound to an image handle, and declare the canonical layout the
/// device stores images in. Both operations block until the copy has fully
/// completed or failed; the caller keeps the staged buffer alive for the
/// whole call. A failure must be reported, never swallowed, and leaves the
/// destination in an unspecified state.
///
/// Origins and the first region axis are in bytes; the remaining axes are
/// in row/slice units (see [`opal_core::DeviceSpan`]).
pub trait RectTransfer {
    /// Canonical layout this device stores images in.
    fn canonical_format(&self) -> CanonicalFormat;

    /// Copies `region` from the staged buffer into the image's device
    /// storage.
    #[allow(clippy::too_many_arguments)]
    fn write_rect(
        &mut self,
        image: ImageHandle,
        staged: &[u8],
        host_origin: [usize; 3],
        device_origin: [usize; 3],
        region: [usize; 3],
        host_row_pitch: usize,
        host_slice_pitch: usize,
        device_row_pitch: usize,
        device_slice_pitch: usize,
    ) -> Result<()>;

    /// Copies `region` from the image's device storage into the staged
    /// buffer.
    #[allow(clippy::too_many_arguments)]
    fn read_rect(
        &self,
        image: ImageHandle,
        staged: &mut [u8],
        host_origin: [usize; 3],
        device_origin: [usize; 3],
        region: [usize; 3],
        host_row_pitch: usize,
        host_slice_pitch: usize,
        device_row_pitch: usize,
        device_slice_pitch: usize,
    ) -> Result<()>;
}

/// Host-memory device: per-handle storage and a plain rectangular byte
/// copy.
///
/// The reference [`RectTransfer`] backend. Real accelerator backends live
/// behind the same trait; this one keeps storage in host vectors, which is
/// enough for tests and for running the runtime device-less.
#[derive(Debug, Default)]
pub struct MemoryDevice {
    canonical: CanonicalFormat,
    storage: HashMap<ImageHandle, Vec<u8>>,
}

impl MemoryDevice {
    /// Device with the given canonical layout.
    pub fn new(canonical: CanonicalFormat) -> Self {
        Self {
            canonical,
            storage: HashMap::new(),
        }
    }

    /// Allocates zeroed canonical storage for `image`.
    ///
    /// Replaces any storage already bound to the handle.
    pub fn bind(&mut self, image: &ImageDesc) -> Result<()> {
        let size = self.canonical.image_size(image.width, image.height);
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| Error::allocation_failed(size))?;
        data.resize(size, 0);
        self.storage.insert(image.handle, data);
        Ok(())
    }

    /// Releases the storage bound to `handle`, if any.
    pub fn unbind(&mut self, handle: ImageHandle) {
        self.storage.remove(&handle);
    }

    /// Raw canonical bytes bound to `handle`.
    pub fn storage_bytes(&self, handle: ImageHandle) -> Option<&[u8]> {
        self.storage.get(&handle).map(Vec::as_slice)
    }
}

impl RectTransfer for MemoryDevice {
    fn canonical_format(&self) -> CanonicalFormat {
        self.canonical
    }

    fn write_rect(
        &mut self,
        image: ImageHandle,
        staged: &[u8],
        host_origin: [usize; 3],
        device_origin: [usize; 3],
        region: [usize; 3],
        host_row_pitch: usize,
        host_slice_pitch: usize,
        device_row_pitch: usize,
        device_slice_pitch: usize,
    ) -> Result<()> {
        let dst = self
            .storage
            .get_mut(&image)
            .ok_or_else(|| Error::unbound_image(image.raw()))?;
        copy_rect(
            staged,
            host_origin,
            host_row_pitch,
            host_slice_pitch,
            dst,
            device_origin,
            device_row_pitch,
            device_slice_pitch,
            region,
        )
    }

    fn read_rect(
        &self,
        image: ImageHandle,
        staged: &mut [u8],
        host_origin: [usize; 3],
        device_origin: [usize; 3],
        region: [usize; 3],
        host_row_pitch: usize,
        host_slice_pitch: usize,
        device_row_pitch: usize,
        device_slice_pitch: usize,
    ) -> Result<()> {
        let src = self
            .storage
            .get(&image)
            .ok_or_else(|| Error::unbound_image(image.raw()))?;
        copy_rect(
            src,
            device_origin,
            device_row_pitch,
            device_slice_pitch,
            staged,
            host_origin,
            host_row_pitch,
            host_slice_pitch,
            region,
        )
    }
}

/// Row-by-row rectangular byte copy between two pitched buffers.
#[allow(clippy::too_many_arguments)]
fn copy_rect(
    src: &[u8],
    src_origin: [usize; 3],
    src_row_pitch: usize,
    src_slice_pitch: usize,
    dst: &mut [u8],
    dst_origin: [usize; 3],
    dst_row_pitch: usize,
    dst_slice_pitch: usize,
    region: [usize; 3],
) -> Result<()> {
    if region[0] * region[1] * region[2] == 0 {
        return Ok(());
    }
    for z in 0..region[2] {
        for y in 0..region[1] {
            let src_off = (src_origin[2] + z) * src_slice_pitch
                + (src_origin[1] + y) * src_row_pitch
                + src_origin[0];
            let dst_off = (dst_origin[2] + z) * dst_slice_pitch
                + (dst_origin[1] + y) * dst_row_pitch
                + dst_origin[0];
            let src_row = src
                .get(src_off..src_off + region[0])
                .ok_or_else(|| Error::transfer_failed("source row outside buffer"))?;
            let dst_row = dst
                .get_mut(dst_off..dst_off + region[0])
                .ok_or_else(|| Error::transfer_failed("destination row outside buffer"))?;
            dst_row.copy_from_slice(src_row);
        }
    }
    Ok(())
}
