// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Pixel layout, source image, and output types.

use std::os::raw::c_int;

use crate::error::{Result, WebpError};
use crate::sys;

/// libwebp rejects either dimension above this (14-bit format limit).
pub(crate) const MAX_DIMENSION: u32 = 16383;

/// Import routine selector - the closed set of interleaved 8-bit band
/// layouts the native encoder accepts directly. `X` is an ignored
/// padding byte.
///
/// Derived, never stored: always a pure function of a source image's
/// band offsets and alpha flag. Anything outside this set (16-bit
/// channels, planar layouts, exotic orderings) is rejected before any
/// native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Red, green, blue, padding.
    Rgbx,
    /// Blue, green, red.
    Bgr,
    /// Blue, green, red, alpha.
    Bgra,
    /// Blue, green, red, padding.
    Bgrx,
}

impl ImportFormat {
    /// Resolve a band layout to an import format.
    ///
    /// `band_offsets[i]` is the byte index of semantic channel `i`
    /// within one pixel, channels ordered R, G, B, then A or padding.
    pub fn resolve(band_offsets: &[usize], has_alpha: bool) -> Result<Self> {
        match (band_offsets, has_alpha) {
            ([0, 1, 2], false) => Ok(ImportFormat::Rgb),
            ([2, 1, 0], false) => Ok(ImportFormat::Bgr),
            ([0, 1, 2, 3], true) => Ok(ImportFormat::Rgba),
            ([2, 1, 0, 3], true) => Ok(ImportFormat::Bgra),
            ([0, 1, 2, 3], false) => Ok(ImportFormat::Rgbx),
            ([2, 1, 0, 3], false) => Ok(ImportFormat::Bgrx),
            _ => Err(WebpError::UnsupportedLayout {
                bands: band_offsets.len(),
                has_alpha,
            }),
        }
    }

    /// Bytes per pixel of the source layout this format imports.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImportFormat::Rgb | ImportFormat::Bgr => 3,
            ImportFormat::Rgba | ImportFormat::Rgbx | ImportFormat::Bgra | ImportFormat::Bgrx => 4,
        }
    }

    /// The native import entry point for this layout.
    pub(crate) fn import_fn(
        self,
    ) -> unsafe extern "C" fn(*mut sys::WebPPicture, *const u8, c_int) -> c_int {
        match self {
            ImportFormat::Rgb => sys::WebPPictureImportRGB,
            ImportFormat::Rgba => sys::WebPPictureImportRGBA,
            ImportFormat::Rgbx => sys::WebPPictureImportRGBX,
            ImportFormat::Bgr => sys::WebPPictureImportBGR,
            ImportFormat::Bgra => sys::WebPPictureImportBGRA,
            ImportFormat::Bgrx => sys::WebPPictureImportBGRX,
        }
    }

    /// Name of the native import entry point, for diagnostics.
    pub(crate) fn import_name(self) -> &'static str {
        match self {
            ImportFormat::Rgb => "WebPPictureImportRGB",
            ImportFormat::Rgba => "WebPPictureImportRGBA",
            ImportFormat::Rgbx => "WebPPictureImportRGBX",
            ImportFormat::Bgr => "WebPPictureImportBGR",
            ImportFormat::Bgra => "WebPPictureImportBGRA",
            ImportFormat::Bgrx => "WebPPictureImportBGRX",
        }
    }
}

/// Color space of a source image. Only `Rgb` is accepted by the
/// encoder; everything else is rejected, not converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColorSpace {
    /// RGB-family color space (the only supported input).
    Rgb,
    /// Grayscale.
    Gray,
    /// YCbCr.
    YCbCr,
    /// CMYK.
    Cmyk,
}

/// Encoding hint describing the kind of picture being compressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageHint {
    /// Default preset.
    #[default]
    Default,
    /// Digital picture, like portrait, inner shot.
    Picture,
    /// Outdoor photograph, with natural lighting.
    Photo,
    /// Discrete tone image (graph, map-tile etc).
    Graph,
}

impl ImageHint {
    pub(crate) fn to_native(self) -> sys::WebPImageHint {
        match self {
            ImageHint::Default => sys::WebPImageHint::WEBP_HINT_DEFAULT,
            ImageHint::Picture => sys::WebPImageHint::WEBP_HINT_PICTURE,
            ImageHint::Photo => sys::WebPImageHint::WEBP_HINT_PHOTO,
            ImageHint::Graph => sys::WebPImageHint::WEBP_HINT_GRAPH,
        }
    }
}

/// A caller-owned interleaved pixel buffer handed to the encoder.
///
/// One contiguous bank, 3 or 4 bytes per pixel, row-major with no row
/// padding. The bridge never retains it beyond a single `write` call.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Byte index of each semantic channel (R, G, B, then A or padding)
    /// within one pixel.
    pub band_offsets: &'a [usize],
    /// Whether the fourth band carries alpha rather than padding.
    pub has_alpha: bool,
    /// Color space of the pixel data.
    pub color_space: ColorSpace,
    /// The pixel bytes, at least `width * height * band_offsets.len()`.
    pub data: &'a [u8],
}

impl<'a> SourceImage<'a> {
    /// Interleaved R,G,B source.
    pub fn rgb(data: &'a [u8], width: u32, height: u32) -> Self {
        Self::with_layout(data, width, height, &[0, 1, 2], false)
    }

    /// Interleaved R,G,B,A source.
    pub fn rgba(data: &'a [u8], width: u32, height: u32) -> Self {
        Self::with_layout(data, width, height, &[0, 1, 2, 3], true)
    }

    /// Interleaved B,G,R source.
    pub fn bgr(data: &'a [u8], width: u32, height: u32) -> Self {
        Self::with_layout(data, width, height, &[2, 1, 0], false)
    }

    /// Interleaved B,G,R,A source.
    pub fn bgra(data: &'a [u8], width: u32, height: u32) -> Self {
        Self::with_layout(data, width, height, &[2, 1, 0, 3], true)
    }

    /// Source with an explicit band layout.
    pub fn with_layout(
        data: &'a [u8],
        width: u32,
        height: u32,
        band_offsets: &'a [usize],
        has_alpha: bool,
    ) -> Self {
        Self {
            width,
            height,
            band_offsets,
            has_alpha,
            color_space: ColorSpace::Rgb,
            data,
        }
    }

    /// Number of bands per pixel.
    pub fn bands(&self) -> usize {
        self.band_offsets.len()
    }
}

/// Decoded pixels, 4 bytes per pixel in A,B,G,R order.
///
/// The byte order is a contract: the native decoder produces A,R,G,B
/// quads and the decode pipeline applies the fixed permutation
/// `dest[0]=src[0], dest[1]=src[3], dest[2]=src[2], dest[3]=src[1]`.
/// Callers wanting any other layout apply their own permutation.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Interleaved A,B,G,R bytes, `width * height * 4` long.
    pub pixels: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_matches_table() {
        assert_eq!(
            ImportFormat::resolve(&[0, 1, 2], false).unwrap(),
            ImportFormat::Rgb
        );
        assert_eq!(
            ImportFormat::resolve(&[2, 1, 0], false).unwrap(),
            ImportFormat::Bgr
        );
        assert_eq!(
            ImportFormat::resolve(&[0, 1, 2, 3], true).unwrap(),
            ImportFormat::Rgba
        );
        assert_eq!(
            ImportFormat::resolve(&[2, 1, 0, 3], true).unwrap(),
            ImportFormat::Bgra
        );
        assert_eq!(
            ImportFormat::resolve(&[0, 1, 2, 3], false).unwrap(),
            ImportFormat::Rgbx
        );
        assert_eq!(
            ImportFormat::resolve(&[2, 1, 0, 3], false).unwrap(),
            ImportFormat::Bgrx
        );
    }

    #[test]
    fn resolver_rejects_everything_else() {
        // Band count outside {3, 4}.
        assert!(matches!(
            ImportFormat::resolve(&[0, 1], false),
            Err(WebpError::UnsupportedLayout { bands: 2, .. })
        ));
        assert!(matches!(
            ImportFormat::resolve(&[0, 1, 2, 3, 4], false),
            Err(WebpError::UnsupportedLayout { bands: 5, .. })
        ));
        // Alpha with 3 bands.
        assert!(matches!(
            ImportFormat::resolve(&[0, 1, 2], true),
            Err(WebpError::UnsupportedLayout {
                bands: 3,
                has_alpha: true
            })
        ));
        // Unrecognized orderings, alpha-first included.
        assert!(ImportFormat::resolve(&[1, 2, 0], false).is_err());
        assert!(ImportFormat::resolve(&[3, 2, 1, 0], true).is_err());
        assert!(ImportFormat::resolve(&[1, 2, 3, 0], true).is_err());
    }

    #[test]
    fn bytes_per_pixel_by_format() {
        assert_eq!(ImportFormat::Rgb.bytes_per_pixel(), 3);
        assert_eq!(ImportFormat::Bgr.bytes_per_pixel(), 3);
        assert_eq!(ImportFormat::Rgba.bytes_per_pixel(), 4);
        assert_eq!(ImportFormat::Bgrx.bytes_per_pixel(), 4);
    }

    #[test]
    fn source_constructors_set_layouts() {
        let data = [0u8; 12];
        let img = SourceImage::rgb(&data, 2, 2);
        assert_eq!(img.bands(), 3);
        assert!(!img.has_alpha);
        assert_eq!(img.color_space, ColorSpace::Rgb);

        let data = [0u8; 16];
        let img = SourceImage::bgra(&data, 2, 2);
        assert_eq!(img.bands(), 4);
        assert!(img.has_alpha);
        assert_eq!(img.band_offsets, &[2, 1, 0, 3]);
    }
}
