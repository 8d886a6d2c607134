//! Host/device image transfers through a staged canonical layout.
//!
//! The runtime stores every image on the device in the canonical layout
//! its transfer backend declares, whatever format the application asked
//! for. This crate is the bridge: it converts host pixel buffers to and
//! from that layout and hands the byte movement to the backend.
//!
//! # Architecture
//!
//! ```text
//! write_image_region / read_image_region (ops)
//!     └── stage (host <-> canonical conversion)
//!             └── RectTransfer trait (backend seam)
//!                     └── MemoryDevice (host-memory reference backend)
//! ```
//!
//! # Example
//!
//! ```rust
//! use opal_core::prelude::*;
//! use opal_transfer::{MemoryDevice, RectTransfer, read_image_region, write_image_region};
//!
//! let mut device = MemoryDevice::new(CanonicalFormat::RGBA_F32);
//! let format = ImageFormat::new(ChannelOrder::Rgba, ChannelType::UnormInt8);
//! let image = ImageDesc::with_canonical_storage(
//!     ImageHandle::new(1), 2, 2, format, &device.canonical_format(),
//! ).unwrap();
//! device.bind(&image).unwrap();
//!
//! let pixels = [255u8; 16];
//! write_image_region(&mut device, &image, &Region::full(2, 2), None, None, &pixels).unwrap();
//!
//! let mut back = [0u8; 16];
//! read_image_region(&device, &image, &Region::full(2, 2), None, None, &mut back).unwrap();
//! assert_eq!(back, pixels);
//! ```

pub mod device;
pub mod ops;
pub mod stage;

pub use device::{MemoryDevice, RectTransfer};
pub use ops::{read_image_region, write_image_region};
pub use opal_core::{Error, Result};
