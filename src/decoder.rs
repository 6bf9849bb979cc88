// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! WebP decode pipeline.
//!
//! A [`WebpDecoder`] moves through a one-way state machine: unbound,
//! bound to a compressed source, header read, decoded. Binding is
//! exclusive - a bound decoder rejects further sources until
//! [`dispose`](WebpDecoder::dispose) resets it. Header probing is
//! separated from full decoding so callers can cheaply sniff whether
//! bytes are WebP at all before committing to pixel output.

use std::io::Read;
use std::mem;
use std::os::raw::c_int;
use std::path::Path;

use crate::error::{Result, WebpError};
use crate::region::NativeRegion;
use crate::sys;
use crate::types::DecodedImage;

/// Shortest byte sequence that can carry a complete container header:
/// RIFF chunk header, `WEBP` tag, and one chunk header with payload
/// size. Anything shorter cannot be WebP.
pub const MIN_CONTAINER_LEN: usize = 26;

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WEBP_MAGIC: &[u8; 4] = b"WEBP";

// ============================================================================
// State machine
// ============================================================================

enum DecoderState {
    /// No source bound.
    Unbound,
    /// A compressed source is held but nothing has been parsed.
    Bound { region: NativeRegion },
    /// The container header has been parsed and dimensions are known.
    HeaderRead {
        region: NativeRegion,
        width: u32,
        height: u32,
    },
    /// Pixels have been produced at least once. The source stays bound
    /// so decode can run again.
    Decoded {
        region: NativeRegion,
        width: u32,
        height: u32,
    },
}

/// Decoder for a single WebP still image.
pub struct WebpDecoder {
    state: DecoderState,
}

impl Default for WebpDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebpDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Unbound,
        }
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Bind a compressed image held in memory. The bytes are copied
    /// into a native region owned by the decoder.
    pub fn bind_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.ensure_unbound()?;
        let region = NativeRegion::copy_in(data)?;
        log::debug!("bound {} in-memory bytes", data.len());
        self.state = DecoderState::Bound { region };
        Ok(())
    }

    /// Bind a compressed image on disk by mapping the file, without
    /// copying its contents.
    pub fn bind_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.ensure_unbound()?;
        let region = NativeRegion::map_file(path.as_ref())?;
        let len = region.len()?;
        log::debug!("mapped {} bytes from {}", len, path.as_ref().display());
        self.state = DecoderState::Bound { region };
        Ok(())
    }

    /// Bind a compressed image by draining a reader to the end.
    pub fn bind_reader<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        self.ensure_unbound()?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let region = NativeRegion::copy_in(&data)?;
        log::debug!("bound {} streamed bytes", data.len());
        self.state = DecoderState::Bound { region };
        Ok(())
    }

    fn ensure_unbound(&self) -> Result<()> {
        match self.state {
            DecoderState::Unbound => Ok(()),
            _ => Err(WebpError::AlreadyBound),
        }
    }

    // ------------------------------------------------------------------
    // Header probing
    // ------------------------------------------------------------------

    /// Parse the container header of the bound source.
    ///
    /// Returns `Ok(false)` when the bytes are well-formed input that
    /// simply is not WebP (too short, or wrong container magic) -
    /// suitable for format sniffing. Returns [`WebpError::CorruptHeader`]
    /// when the container magic matches but the native parser rejects
    /// the stream. On success the decoder advances to the header-read
    /// state, ready for [`decode`](Self::decode).
    pub fn probe_header(&mut self) -> Result<bool> {
        let state = mem::replace(&mut self.state, DecoderState::Unbound);
        match state {
            DecoderState::Unbound => Err(WebpError::NotBound),
            DecoderState::Bound { region } => {
                let data = region.as_bytes()?;
                if !container_magic_matches(data) {
                    self.state = DecoderState::Bound { region };
                    return Ok(false);
                }

                let mut width: c_int = 0;
                let mut height: c_int = 0;
                let ok = unsafe {
                    sys::WebPGetInfo(data.as_ptr(), data.len(), &mut width, &mut height)
                };
                if ok != 1 || width <= 0 || height <= 0 {
                    self.state = DecoderState::Bound { region };
                    return Err(WebpError::CorruptHeader);
                }

                log::debug!("header read: {width}x{height}");
                self.state = DecoderState::HeaderRead {
                    region,
                    width: width as u32,
                    height: height as u32,
                };
                Ok(true)
            }
            // Already parsed; re-probing is a no-op.
            done @ (DecoderState::HeaderRead { .. } | DecoderState::Decoded { .. }) => {
                self.state = done;
                Ok(true)
            }
        }
    }

    /// Image width in pixels. Available only after a successful
    /// [`decode`](Self::decode).
    pub fn width(&self) -> Result<u32> {
        match self.state {
            DecoderState::Decoded { width, .. } => Ok(width),
            _ => Err(WebpError::NotBound),
        }
    }

    /// Image height in pixels. Available only after a successful
    /// [`decode`](Self::decode).
    pub fn height(&self) -> Result<u32> {
        match self.state {
            DecoderState::Decoded { height, .. } => Ok(height),
            _ => Err(WebpError::NotBound),
        }
    }

    /// Number of still frames. Animation is out of scope, so a decoded
    /// source always reports one. Gated like the dimension accessors.
    pub fn frame_count(&self) -> Result<u32> {
        self.width().map(|_| 1)
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    /// Decode the bound source into interleaved 4-byte pixels.
    ///
    /// Output channel order is A, B, G, R per pixel. Requires a
    /// successful header probe; decoding again on an already-decoded
    /// source re-runs the native decoder.
    pub fn decode(&mut self) -> Result<DecodedImage> {
        let state = mem::replace(&mut self.state, DecoderState::Unbound);
        let (region, width, height) = match state {
            DecoderState::HeaderRead {
                region,
                width,
                height,
            }
            | DecoderState::Decoded {
                region,
                width,
                height,
            } => (region, width, height),
            other => {
                self.state = other;
                return Err(WebpError::NotBound);
            }
        };

        match decode_into_pixels(&region, width, height) {
            Ok(image) => {
                self.state = DecoderState::Decoded {
                    region,
                    width,
                    height,
                };
                Ok(image)
            }
            // No pixels were produced; the source is merely probed.
            Err(err) => {
                self.state = DecoderState::HeaderRead {
                    region,
                    width,
                    height,
                };
                Err(err)
            }
        }
    }

    /// Release the bound source and reset to the unbound state. Safe
    /// to call repeatedly; a disposed decoder can be bound again.
    pub fn dispose(&mut self) {
        match mem::replace(&mut self.state, DecoderState::Unbound) {
            DecoderState::Unbound => {}
            DecoderState::Bound { mut region }
            | DecoderState::HeaderRead { mut region, .. }
            | DecoderState::Decoded { mut region, .. } => region.release(),
        }
    }
}

fn container_magic_matches(data: &[u8]) -> bool {
    data.len() >= MIN_CONTAINER_LEN
        && &data[0..4] == RIFF_MAGIC
        && &data[8..12] == WEBP_MAGIC
}

fn decode_into_pixels(region: &NativeRegion, width: u32, height: u32) -> Result<DecodedImage> {
    let data = region.as_bytes()?;
    let stride = width as usize * 4;
    let out_size = stride * height as usize;

    let mut native = NativeRegion::allocate(out_size)?;
    let out_ptr = native.as_mut_ptr()?;
    let produced = unsafe {
        sys::WebPDecodeARGBInto(data.as_ptr(), data.len(), out_ptr, out_size, stride as c_int)
    };
    if produced.is_null() {
        return Err(WebpError::NativeCallFailed {
            call: "WebPDecodeARGBInto",
            code: 0,
        });
    }

    let mut pixels = vec![0u8; out_size];
    correct_channel_order(native.as_bytes()?, &mut pixels);
    log::debug!("decoded {width}x{height}, {out_size} output bytes");

    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

/// Reorder the native decoder's A,R,G,B pixel bytes into the A,B,G,R
/// order the output contract promises. Both slices must hold the same
/// whole number of 4-byte pixels.
pub(crate) fn correct_channel_order(native: &[u8], dest: &mut [u8]) {
    debug_assert_eq!(native.len(), dest.len());
    debug_assert_eq!(native.len() % 4, 0);
    for (src, out) in native.chunks_exact(4).zip(dest.chunks_exact_mut(4)) {
        out[0] = src[0];
        out[1] = src[3];
        out[2] = src[2];
        out[3] = src[1];
    }
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
