//! End-to-end transfers against the host-memory reference backend.

use approx::assert_relative_eq;
use opal_core::prelude::*;
use opal_transfer::{MemoryDevice, RectTransfer, read_image_region, write_image_region};

fn bound_image(
    device: &mut MemoryDevice,
    handle: u64,
    width: u32,
    height: u32,
    order: ChannelOrder,
    ty: ChannelType,
) -> ImageDesc {
    let image = ImageDesc::with_canonical_storage(
        ImageHandle::new(handle),
        width,
        height,
        ImageFormat::new(order, ty),
        &device.canonical_format(),
    )
    .unwrap();
    device.bind(&image).unwrap();
    image
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_ne_bytes());
    }
    out
}

fn bytes_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn test_float_rgba_roundtrip() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 4, 3, ChannelOrder::Rgba, ChannelType::Float);

    let values: Vec<f32> = (0..4 * 3 * 4).map(|i| i as f32 * 0.125).collect();
    let host = f32_bytes(&values);
    write_image_region(&mut device, &image, &Region::full(4, 3), None, None, &host).unwrap();

    let mut back = vec![0u8; host.len()];
    read_image_region(&device, &image, &Region::full(4, 3), None, None, &mut back).unwrap();
    assert_eq!(bytes_f32(&back), values);
}

#[test]
fn test_unorm8_rgba_roundtrip() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 3, 2, ChannelOrder::Rgba, ChannelType::UnormInt8);

    let host: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 11) as u8).collect();
    write_image_region(&mut device, &image, &Region::full(3, 2), None, None, &host).unwrap();

    let mut back = vec![0u8; host.len()];
    read_image_region(&device, &image, &Region::full(3, 2), None, None, &mut back).unwrap();
    // Normalize, stage, and re-quantize is exact for 8-bit values.
    assert_eq!(back, host);
}

#[test]
fn test_single_channel_write_expands_on_device() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::R, ChannelType::UnormInt8);

    let host = [0u8, 128, 255, 64];
    write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &host).unwrap();

    let canonical = device.canonical_format();
    let bytes = device.storage_bytes(image.handle).unwrap();
    for (i, &byte) in host.iter().enumerate() {
        let lanes = canonical.load_texel(&bytes[i * 16..(i + 1) * 16]);
        assert_relative_eq!(lanes[0], byte as f32 / 255.0);
        assert_eq!(lanes[1..], [0.0, 0.0, 1.0]);
    }
}

#[test]
fn test_r_write_reads_back_as_rgba() {
    // Write through an R descriptor, read the same storage back through an
    // RGBA descriptor: channel 0 carries the data, alpha reads opaque.
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::R, ChannelType::UnormInt8);

    let host = [0u8, 128, 255, 64];
    write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &host).unwrap();

    let rgba_view = ImageDesc::new(
        image.handle,
        2,
        2,
        ImageFormat::new(ChannelOrder::Rgba, ChannelType::UnormInt8),
        image.size,
    )
    .unwrap();
    let mut back = [0u8; 16];
    read_image_region(&device, &rgba_view, &Region::full(2, 2), None, None, &mut back).unwrap();

    for (pixel, &byte) in back.chunks_exact(4).zip(&host) {
        assert_eq!(pixel[0], byte);
        assert_eq!(pixel[1], 0);
        assert_eq!(pixel[2], 0);
        assert_eq!(pixel[3], 255);
    }
}

#[test]
fn test_read_with_explicit_row_pitch() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::R, ChannelType::UnormInt8);

    let host = [1u8, 2, 3, 4];
    write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &host).unwrap();

    let mut back = [0xaau8; 5];
    read_image_region(&device, &image, &Region::full(2, 2), Some(3), None, &mut back).unwrap();
    assert_eq!(back, [1, 2, 0xaa, 3, 4]);
}

#[test]
fn test_partial_region_write() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::Rgba, ChannelType::Float);

    let values: Vec<f32> = (0..16).map(|i| i as f32).collect();
    let host = f32_bytes(&values);
    // Only the first row of the image is transferred.
    write_image_region(
        &mut device,
        &image,
        &Region::new_2d(0, 0, 2, 1),
        None,
        None,
        &host,
    )
    .unwrap();

    let canonical = device.canonical_format();
    let bytes = device.storage_bytes(image.handle).unwrap();
    assert_eq!(canonical.load_texel(&bytes[..16]), [0.0, 1.0, 2.0, 3.0]);
    assert_eq!(canonical.load_texel(&bytes[16..32]), [4.0, 5.0, 6.0, 7.0]);
    // Second row of device storage never written.
    assert!(bytes[32..].iter().all(|&b| b == 0));
}

#[test]
fn test_zero_volume_region_is_noop() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::Rgba, ChannelType::Float);

    let host = f32_bytes(&vec![9.0; 16]);
    write_image_region(
        &mut device,
        &image,
        &Region::new_2d(0, 0, 0, 2),
        None,
        None,
        &host,
    )
    .unwrap();
    assert!(device
        .storage_bytes(image.handle)
        .unwrap()
        .iter()
        .all(|&b| b == 0));

    let mut back = [0x55u8; 64];
    read_image_region(
        &device,
        &image,
        &Region::new_2d(0, 0, 2, 0),
        None,
        None,
        &mut back,
    )
    .unwrap();
    // Host buffer untouched by a zero-volume read.
    assert!(back.iter().all(|&b| b == 0x55));
}

#[test]
fn test_out_of_bounds_region_rejected_both_paths() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::Rgba, ChannelType::Float);

    let host = f32_bytes(&vec![1.0; 16]);
    let region = Region::new_2d(0, 0, 3, 2);
    let err =
        write_image_region(&mut device, &image, &region, None, None, &host).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(device
        .storage_bytes(image.handle)
        .unwrap()
        .iter()
        .all(|&b| b == 0));

    let mut back = [7u8; 64];
    let err = read_image_region(&device, &image, &region, None, None, &mut back).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(back.iter().all(|&b| b == 7));
}

#[test]
fn test_empty_host_buffer_rejected() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::Rgba, ChannelType::Float);

    let err = write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &[])
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let mut empty: [u8; 0] = [];
    let err = read_image_region(&device, &image, &Region::full(2, 2), None, None, &mut empty)
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_short_host_buffer_rejected() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::Rgba, ChannelType::Float);

    let host = f32_bytes(&vec![1.0; 8]);
    let err = write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &host)
        .unwrap_err();
    assert!(matches!(err, Error::HostBufferTooSmall { required: 64, .. }));
}

#[test]
fn test_unsupported_format_rejected_before_transfer() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::Rgba, ChannelType::UnormInt16);

    let host = [0u8; 2 * 2 * 4 * 2];
    let err = write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &host)
        .unwrap_err();
    assert!(err.is_unsupported_format());
    assert!(device
        .storage_bytes(image.handle)
        .unwrap()
        .iter()
        .all(|&b| b == 0));
}

#[test]
fn test_unbound_image_rejected() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
    let image = ImageDesc::with_canonical_storage(
        ImageHandle::new(404),
        2,
        2,
        ImageFormat::new(ChannelOrder::Rgba, ChannelType::Float),
        &CanonicalFormat::RGBA_F32,
    )
    .unwrap();

    let host = f32_bytes(&vec![0.0; 16]);
    let err = write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &host)
        .unwrap_err();
    assert!(err.is_invalid_object());
}

#[test]
fn test_f16_canonical_device_roundtrip() {
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F16);
    let image = bound_image(&mut device, 1, 2, 2, ChannelOrder::Rgba, ChannelType::Float);
    assert_eq!(image.size, 2 * 2 * 8);

    let values: Vec<f32> = vec![
        0.5, 0.25, 0.125, 1.0, 0.75, 0.375, 0.0625, 1.0, 0.1, 0.2, 0.3, 0.4, 0.9, 0.8, 0.7, 0.6,
    ];
    let host = f32_bytes(&values);
    write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &host).unwrap();

    let mut back = vec![0u8; host.len()];
    read_image_region(&device, &image, &Region::full(2, 2), None, None, &mut back).unwrap();
    for (got, want) in bytes_f32(&back).iter().zip(&values) {
        assert_relative_eq!(*got, *want, max_relative = 1e-3);
    }
}

#[test]
fn test_unorm8_roundtrip_error_within_one_step() {
    // Staging through F16 lanes may cost up to one quantization step.
    let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F16);
    let image = bound_image(&mut device, 1, 4, 1, ChannelOrder::Rgba, ChannelType::UnormInt8);

    let host: Vec<u8> = (0..16).map(|i| (i * 16) as u8).collect();
    write_image_region(&mut device, &image, &Region::full(4, 1), None, None, &host).unwrap();

    let mut back = vec![0u8; host.len()];
    read_image_region(&device, &image, &Region::full(4, 1), None, None, &mut back).unwrap();
    for (got, want) in back.iter().zip(&host) {
        assert!((*got as i16 - *want as i16).abs() <= 1);
    }
}
