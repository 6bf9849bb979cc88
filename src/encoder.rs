// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! WebP encode pipeline.
//!
//! [`WebpEncoder`] validates the source image, stages its pixels in a
//! native region, builds the native config and picture descriptors,
//! imports the pixels through the entry point matching the source
//! layout, and drives the native encoder. Bitstream chunks come back
//! through a write callback and are forwarded to the configured
//! [`OutputSink`]; a sink failure aborts the encode and is reported in
//! preference to the native error it provokes.

use std::io;
use std::os::raw::c_int;
use std::panic::{self, AssertUnwindSafe};
use std::slice;

use crate::error::{Result, SourceImageIssue, WebpError};
use crate::picture::{EncoderConfig, Picture};
use crate::region::NativeRegion;
use crate::sink::OutputSink;
use crate::sys;
use crate::types::{ColorSpace, ImageHint, ImportFormat, SourceImage, MAX_DIMENSION};

/// Encoder for a single WebP still image.
pub struct WebpEncoder<'a> {
    quality: f32,
    hint: ImageHint,
    lossless: bool,
    method: i32,
    output: Option<OutputSink<'a>>,
}

impl Default for WebpEncoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> WebpEncoder<'a> {
    pub fn new() -> Self {
        Self {
            quality: 75.0,
            hint: ImageHint::Default,
            lossless: false,
            method: 4,
            output: None,
        }
    }

    /// Compression quality, 0 (smallest) to 100 (best). For lossless
    /// encoding this trades effort for density instead.
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    /// Hint about the nature of the source material.
    pub fn with_hint(mut self, hint: ImageHint) -> Self {
        self.hint = hint;
        self
    }

    pub fn with_lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }

    /// Quality/speed trade-off, 0 (fast) to 6 (slower, better).
    pub fn with_method(mut self, method: i32) -> Self {
        self.method = method;
        self
    }

    /// Attach the destination for the encoded bitstream. Must be set
    /// before [`write`](Self::write).
    pub fn set_output(&mut self, sink: OutputSink<'a>) {
        self.output = Some(sink);
    }

    /// Encode `image` and stream the bitstream to the attached sink.
    pub fn write(&mut self, image: &SourceImage<'_>) -> Result<()> {
        validate_source(image)?;
        let format = ImportFormat::resolve(image.band_offsets, image.has_alpha)?;

        // Resolve the sink before touching native state, so a
        // misconfigured encoder fails without allocating anything.
        let sink = self.output.as_mut().ok_or(WebpError::NotBound)?;

        let stride = image.width as usize * format.bytes_per_pixel();
        let needed = stride * image.height as usize;
        let staged = NativeRegion::copy_in(&image.data[..needed])?;

        let mut config = EncoderConfig::init()?;
        config.set_quality(self.quality);
        config.set_lossless(self.lossless);
        config.set_method(self.method);
        config.set_image_hint(self.hint);
        config.validate()?;

        let mut picture = Picture::init()?;
        picture.set_dimensions(image.width, image.height);
        // The lossless encoder operates on the ARGB plane, so route
        // through it whenever alpha must survive or lossless is on.
        picture.set_use_argb(image.has_alpha || self.lossless);
        picture.alloc()?;
        picture.import(format, &staged, stride)?;

        let mut state = WriteState {
            sink,
            failure: None,
        };
        picture.set_writer(sink_trampoline, (&mut state) as *mut WriteState as *mut _);

        log::debug!(
            "encoding {}x{} {:?}, quality {}, lossless {}",
            image.width,
            image.height,
            format,
            self.quality,
            self.lossless
        );
        let ok = unsafe { sys::WebPEncode(config.as_raw(), picture.as_raw_mut()) };

        if let Some(failure) = state.failure.take() {
            return Err(WebpError::Sink(failure));
        }
        if ok != 1 {
            return Err(WebpError::NativeCallFailed {
                call: "WebPEncode",
                code: picture.error_code(),
            });
        }
        Ok(())
    }
}

fn validate_source(image: &SourceImage<'_>) -> Result<()> {
    let issue = |issue| Err(WebpError::InvalidSourceImage(issue));

    let bands = image.bands();
    if bands != 3 && bands != 4 {
        return issue(SourceImageIssue::BandCount(bands));
    }
    if image.has_alpha && bands != 4 {
        return issue(SourceImageIssue::AlphaBandMismatch { bands });
    }
    if image.color_space != ColorSpace::Rgb {
        return issue(SourceImageIssue::UnsupportedColorSpace(image.color_space));
    }
    if image.width == 0
        || image.height == 0
        || image.width > MAX_DIMENSION
        || image.height > MAX_DIMENSION
    {
        return issue(SourceImageIssue::BadDimensions {
            width: image.width,
            height: image.height,
        });
    }
    let needed = image.width as usize * image.height as usize * bands;
    if image.data.len() < needed {
        return issue(SourceImageIssue::ShortBuffer {
            needed,
            actual: image.data.len(),
        });
    }
    Ok(())
}

/// Shared state between `write` and the native write callback.
struct WriteState<'a, 'b> {
    sink: &'a mut OutputSink<'b>,
    failure: Option<io::Error>,
}

/// Forwards one bitstream chunk to the sink. Returns 1 to continue the
/// encode, 0 to abort it. Must not unwind into the native caller, so
/// sink panics are caught and reported as an aborting failure.
unsafe extern "C" fn sink_trampoline(
    data: *const u8,
    size: usize,
    picture: *const sys::WebPPicture,
) -> c_int {
    let state = unsafe { &mut *((*picture).custom_ptr as *mut WriteState) };
    let chunk = if size == 0 {
        &[][..]
    } else {
        unsafe { slice::from_raw_parts(data, size) }
    };
    match panic::catch_unwind(AssertUnwindSafe(|| state.sink.accept(chunk))) {
        Ok(Ok(())) => 1,
        Ok(Err(err)) => {
            state.failure = Some(err);
            0
        }
        Err(_) => {
            state.failure = Some(io::Error::other("output sink panicked"));
            0
        }
    }
}

#[cfg(test)]
#[path = "encoder_tests.rs"]
mod tests;
