// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Destinations for encoded bitstream chunks.
//!
//! The encoder's native write callback hands over one chunk at a time
//! and only understands accepted / rejected. [`OutputSink`] narrows the
//! universe of destinations to a closed set of variants so that every
//! chunk takes a known path and a single `io::Result` carries the
//! rejection back through the callback boundary.

use std::fs::File;
use std::io::{self, Seek, Write};

/// A destination that supports both writing and seeking, for staged
/// random-access output.
pub trait SeekWrite: Write + Seek {}

impl<T: Write + Seek> SeekWrite for T {}

/// Where the encoded bitstream goes.
pub enum OutputSink<'a> {
    /// A file handle written to directly, chunk by chunk.
    Channel(&'a mut File),
    /// A forward-only byte stream.
    Stream(&'a mut dyn Write),
    /// A seekable destination; each chunk is staged in an intermediate
    /// buffer before being handed over.
    RandomAccess(&'a mut dyn SeekWrite),
}

impl<'a> OutputSink<'a> {
    /// Sink that writes chunks straight into a file.
    pub fn channel(file: &'a mut File) -> Self {
        OutputSink::Channel(file)
    }

    /// Sink that forwards chunks to any byte stream.
    pub fn stream<W: Write>(writer: &'a mut W) -> Self {
        OutputSink::Stream(writer)
    }

    /// Sink for seekable destinations.
    pub fn random_access<W: SeekWrite>(writer: &'a mut W) -> Self {
        OutputSink::RandomAccess(writer)
    }

    /// Deliver one bitstream chunk. An error here aborts the encode.
    pub(crate) fn accept(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            OutputSink::Channel(file) => file.write_all(chunk),
            OutputSink::Stream(writer) => writer.write_all(chunk),
            OutputSink::RandomAccess(writer) => {
                let staged = chunk.to_vec();
                writer.write_all(&staged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn stream_sink_forwards_chunks_in_order() {
        let mut collected = Vec::new();
        let mut sink = OutputSink::stream(&mut collected);
        sink.accept(b"RIFF").unwrap();
        sink.accept(b"....").unwrap();
        sink.accept(b"WEBP").unwrap();
        assert_eq!(collected, b"RIFF....WEBP");
    }

    #[test]
    fn random_access_sink_stages_each_chunk() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut sink = OutputSink::random_access(&mut cursor);
            sink.accept(&[1, 2, 3]).unwrap();
            sink.accept(&[4, 5]).unwrap();
        }
        assert_eq!(cursor.into_inner(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn channel_sink_writes_to_file() {
        let mut file = tempfile::tempfile().unwrap();
        {
            let mut sink = OutputSink::channel(&mut file);
            sink.accept(b"chunk").unwrap();
        }
        let mut back = Vec::new();
        file.seek(std::io::SeekFrom::Start(0)).unwrap();
        file.read_to_end(&mut back).unwrap();
        assert_eq!(back, b"chunk");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("writer closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_surfaces_through_accept() {
        let mut writer = FailingWriter;
        let mut sink = OutputSink::stream(&mut writer);
        assert!(sink.accept(b"chunk").is_err());
    }
}
