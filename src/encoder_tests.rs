// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::*;

fn rgb_pixels(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 17 % 256) as u8);
            data.push((y * 31 % 256) as u8);
            data.push(((x + y) * 7 % 256) as u8);
        }
    }
    data
}

fn invalid_source_issue(result: Result<()>) -> SourceImageIssue {
    match result {
        Err(WebpError::InvalidSourceImage(issue)) => issue,
        other => panic!("expected invalid source image, got {other:?}"),
    }
}

#[test]
fn write_without_sink_is_not_bound() {
    let data = rgb_pixels(4, 4);
    let image = SourceImage::rgb(&data, 4, 4);
    let mut encoder = WebpEncoder::new();
    assert!(matches!(encoder.write(&image), Err(WebpError::NotBound)));
}

#[test]
fn rejects_band_counts_outside_three_and_four() {
    let data = vec![0u8; 4 * 4 * 2];
    let offsets = [0usize, 1];
    let image = SourceImage::with_layout(&data, 4, 4, &offsets, false);
    let mut out = Vec::new();
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut out));
    assert_eq!(
        invalid_source_issue(encoder.write(&image)),
        SourceImageIssue::BandCount(2)
    );
}

#[test]
fn rejects_alpha_with_three_bands() {
    let data = vec![0u8; 4 * 4 * 3];
    let offsets = [0usize, 1, 2];
    let image = SourceImage::with_layout(&data, 4, 4, &offsets, true);
    let mut out = Vec::new();
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut out));
    assert_eq!(
        invalid_source_issue(encoder.write(&image)),
        SourceImageIssue::AlphaBandMismatch { bands: 3 }
    );
}

#[test]
fn rejects_non_rgb_color_space() {
    let data = vec![0u8; 4 * 4 * 3];
    let mut image = SourceImage::rgb(&data, 4, 4);
    image.color_space = ColorSpace::Gray;
    let mut out = Vec::new();
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut out));
    assert_eq!(
        invalid_source_issue(encoder.write(&image)),
        SourceImageIssue::UnsupportedColorSpace(ColorSpace::Gray)
    );
}

#[test]
fn rejects_short_pixel_buffer() {
    let data = vec![0u8; 4 * 4 * 3 - 1];
    let image = SourceImage::rgb(&data, 4, 4);
    let mut out = Vec::new();
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut out));
    assert_eq!(
        invalid_source_issue(encoder.write(&image)),
        SourceImageIssue::ShortBuffer {
            needed: 48,
            actual: 47
        }
    );
}

#[test]
fn rejects_zero_and_oversize_dimensions() {
    let data = rgb_pixels(4, 4);
    let mut out = Vec::new();

    let image = SourceImage::rgb(&data, 0, 4);
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut out));
    assert_eq!(
        invalid_source_issue(encoder.write(&image)),
        SourceImageIssue::BadDimensions {
            width: 0,
            height: 4
        }
    );

    let image = SourceImage::rgb(&data, 4, 16384);
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut out));
    assert_eq!(
        invalid_source_issue(encoder.write(&image)),
        SourceImageIssue::BadDimensions {
            width: 4,
            height: 16384
        }
    );
}

#[test]
fn unknown_band_layout_is_rejected_before_native_work() {
    let data = vec![0u8; 4 * 4 * 3];
    let offsets = [1usize, 0, 2];
    let image = SourceImage::with_layout(&data, 4, 4, &offsets, false);
    let mut out = Vec::new();
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut out));
    assert!(matches!(
        encoder.write(&image),
        Err(WebpError::UnsupportedLayout {
            bands: 3,
            has_alpha: false
        })
    ));
}

struct FailingWriter;

impl io::Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_failure_aborts_and_wins_over_native_error() {
    let data = rgb_pixels(16, 16);
    let image = SourceImage::rgb(&data, 16, 16);
    let mut writer = FailingWriter;
    let mut encoder = WebpEncoder::new();
    encoder.set_output(OutputSink::stream(&mut writer));
    match encoder.write(&image) {
        Err(WebpError::Sink(err)) => assert_eq!(err.to_string(), "sink closed"),
        other => panic!("expected sink error, got {other:?}"),
    }
}

#[test]
fn encodes_rgb_to_a_valid_container() {
    let data = rgb_pixels(16, 16);
    let image = SourceImage::rgb(&data, 16, 16);
    let mut out = Vec::new();
    let mut encoder = WebpEncoder::new().with_quality(80.0);
    encoder.set_output(OutputSink::stream(&mut out));
    encoder.write(&image).unwrap();

    assert!(out.len() >= crate::decoder::MIN_CONTAINER_LEN);
    assert_eq!(&out[0..4], b"RIFF");
    assert_eq!(&out[8..12], b"WEBP");
}

#[test]
fn encodes_rgba_with_alpha() {
    let mut data = Vec::new();
    for i in 0..(8 * 8) {
        data.extend_from_slice(&[(i % 256) as u8, 64, 128, 200]);
    }
    let image = SourceImage::rgba(&data, 8, 8);
    let mut out = Vec::new();
    let mut encoder = WebpEncoder::new().with_lossless(true);
    encoder.set_output(OutputSink::stream(&mut out));
    encoder.write(&image).unwrap();
    assert_eq!(&out[0..4], b"RIFF");
}
