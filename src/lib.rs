// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! webp-bridge - safe bridge between in-memory pixel buffers and the
//! native libwebp codec.
//!
//! The crate does no compression itself. It marshals data across the
//! libwebp call boundary: copying or mapping input bytes into natively
//! addressable memory, populating libwebp's fixed-layout config and
//! picture structs, dispatching the import routine that matches the
//! caller's pixel layout, and streaming encoded output back through a
//! native-to-Rust write callback so nothing has to be buffered whole.
//!
//! # Decoding
//!
//! ```no_run
//! use webp_bridge::WebpDecoder;
//!
//! # fn main() -> Result<(), webp_bridge::WebpError> {
//! let data: &[u8] = &[]; // your WebP bytes
//! let mut decoder = WebpDecoder::new();
//! decoder.bind_bytes(data)?;
//! if decoder.probe_header()? {
//!     let image = decoder.decode()?;
//!     println!("{}x{}", image.width, image.height);
//! }
//! decoder.dispose();
//! # Ok(())
//! # }
//! ```
//!
//! # Encoding
//!
//! ```no_run
//! use webp_bridge::{OutputSink, SourceImage, WebpEncoder};
//!
//! # fn main() -> Result<(), webp_bridge::WebpError> {
//! let pixels = vec![0u8; 64 * 64 * 3];
//! let image = SourceImage::rgb(&pixels, 64, 64);
//! let mut out = Vec::new();
//! let mut encoder = WebpEncoder::new().with_quality(85.0);
//! encoder.set_output(OutputSink::stream(&mut out));
//! encoder.write(&image)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! Everything is synchronous and single-threaded: native calls block
//! the calling thread and the encoder's write callback runs in-line on
//! that same thread. A decoder or encoder instance must not be shared
//! across threads without external synchronization. Distinct instances
//! on distinct threads rely on libwebp's documented reentrancy for
//! separate state objects.

pub use libwebp_sys as sys;

mod decoder;
mod encoder;
mod error;
mod picture;
mod region;
mod sink;
mod types;

pub use decoder::{WebpDecoder, MIN_CONTAINER_LEN};
pub use encoder::WebpEncoder;
pub use error::{Result, SourceImageIssue, WebpError};
pub use region::NativeRegion;
pub use sink::{OutputSink, SeekWrite};
pub use types::{ColorSpace, DecodedImage, ImageHint, ImportFormat, SourceImage};
