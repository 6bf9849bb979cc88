// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Error types for the bridge.
//!
//! Lifecycle and precondition violations are detected before any native
//! call wherever possible; native status codes are checked after every
//! call and converted immediately, never accumulated. Nothing is retried
//! automatically - native state after a failed call is not guaranteed to
//! be reusable.

use crate::types::ColorSpace;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, WebpError>;

/// Errors surfaced by the bridge.
///
/// A header that simply isn't WebP is not an error: `probe_header()`
/// returns `Ok(false)` so format dispatch can try other decoders.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WebpError {
    /// Container magics matched but the native header parse failed.
    #[error("container magics matched but libwebp could not parse the header")]
    CorruptHeader,

    /// Native memory allocation failed.
    #[error("native allocation of {size} bytes failed")]
    Allocation { size: usize },

    /// An encode-side precondition on the source image was violated.
    #[error("invalid source image: {0}")]
    InvalidSourceImage(SourceImageIssue),

    /// No import format matches the given band layout.
    #[error("no import format for {bands} bands with alpha={has_alpha}")]
    UnsupportedLayout { bands: usize, has_alpha: bool },

    /// A released native region was used again.
    #[error("native region used after release")]
    UseAfterRelease,

    /// Attempted to write through a read-only mapped region.
    #[error("native region is a read-only mapping")]
    ReadOnlyRegion,

    /// A decoder was rebound without an intervening `dispose()`.
    #[error("decoder already has a bound source; call dispose() first")]
    AlreadyBound,

    /// The operation requires a bound source or output that isn't there.
    #[error("no source bound (or header not yet read)")]
    NotBound,

    /// A native entry point returned a non-success status.
    #[error("native call {call} failed with status {code}")]
    NativeCallFailed { call: &'static str, code: i32 },

    /// The output sink rejected a chunk during encoding.
    #[error("output sink write failed: {0}")]
    Sink(#[source] std::io::Error),

    /// I/O failure while binding or draining an input source.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// The specific encode precondition a source image violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SourceImageIssue {
    #[error("band count must be 3 or 4, got {0}")]
    BandCount(usize),

    #[error("alpha flag set but band count is {bands}, expected 4")]
    AlphaBandMismatch { bands: usize },

    #[error("color space {0:?} is not supported, only Rgb")]
    UnsupportedColorSpace(ColorSpace),

    #[error("pixel buffer too small: need {needed} bytes, got {actual}")]
    ShortBuffer { needed: usize, actual: usize },

    #[error("bad dimensions {width}x{height} (must be 1..={max})", max = crate::types::MAX_DIMENSION)]
    BadDimensions { width: u32, height: u32 },
}
