// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Natively addressable byte regions.
//!
//! `NativeRegion` is the one place pixel and container bytes live while
//! a libwebp call is in flight. A region has exactly one owner and is
//! released exactly once: explicitly through [`NativeRegion::release`]
//! or implicitly on drop. Every operation on a released region fails
//! with [`WebpError::UseAfterRelease`] instead of touching freed memory.

use std::alloc::{self, Layout};
use std::fs::File;
use std::path::Path;
use std::ptr::NonNull;

use memmap2::Mmap;

use crate::error::{Result, WebpError};

enum Backing {
    /// Heap allocation owned by this region.
    Owned { ptr: NonNull<u8>, layout: Layout },
    /// Read-only view over a file mapping owned by the `Mmap` handle.
    /// Releasing drops the view; the mapping unmaps itself.
    Mapped(Mmap),
    Released,
}

/// A contiguous byte buffer reachable by the native codec.
pub struct NativeRegion {
    backing: Backing,
    len: usize,
}

// The backing bytes are exclusively owned; moving the owner between
// threads is fine. Not Sync: a region is part of a single pipeline
// instance and shares its threading rules.
unsafe impl Send for NativeRegion {}

impl NativeRegion {
    /// Allocate an uninitialized region of `size` bytes.
    ///
    /// Contents are unspecified until written. Fails with
    /// [`WebpError::Allocation`] if the platform cannot satisfy the
    /// request. A zero-byte region is valid: it holds no storage but
    /// binds and reads back as an empty slice.
    pub fn allocate(size: usize) -> Result<Self> {
        let layout =
            Layout::from_size_align(size, 1).map_err(|_| WebpError::Allocation { size })?;
        if size == 0 {
            // No storage to allocate or free; a dangling pointer is a
            // valid empty-slice base.
            return Ok(Self {
                backing: Backing::Owned {
                    ptr: NonNull::dangling(),
                    layout,
                },
                len: 0,
            });
        }
        // std::alloc reports failure as null rather than aborting,
        // which lets allocation failure surface as an error.
        let ptr = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(ptr).ok_or(WebpError::Allocation { size })?;
        Ok(Self {
            backing: Backing::Owned { ptr, layout },
            len: size,
        })
    }

    /// Allocate a region and copy `bytes` into it.
    pub fn copy_in(bytes: &[u8]) -> Result<Self> {
        let mut region = Self::allocate(bytes.len())?;
        let dst = region.as_mut_ptr()?;
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        }
        Ok(region)
    }

    /// Map a file read-only, zero-copy.
    ///
    /// The region holds only a view; the underlying mapping lives and
    /// dies with the internal handle, never with memory this region
    /// would try to free itself.
    pub fn map_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let map = unsafe { Mmap::map(&file)? };
        let len = map.len();
        Ok(Self {
            backing: Backing::Mapped(map),
            len,
        })
    }

    /// Native address of the first byte.
    pub fn as_ptr(&self) -> Result<*const u8> {
        match &self.backing {
            Backing::Owned { ptr, .. } => Ok(ptr.as_ptr() as *const u8),
            Backing::Mapped(map) => Ok(map.as_ptr()),
            Backing::Released => Err(WebpError::UseAfterRelease),
        }
    }

    /// Mutable native address, for regions the codec writes into.
    pub(crate) fn as_mut_ptr(&mut self) -> Result<*mut u8> {
        match &self.backing {
            Backing::Owned { ptr, .. } => Ok(ptr.as_ptr()),
            Backing::Mapped(_) => Err(WebpError::ReadOnlyRegion),
            Backing::Released => Err(WebpError::UseAfterRelease),
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> Result<usize> {
        match &self.backing {
            Backing::Released => Err(WebpError::UseAfterRelease),
            _ => Ok(self.len),
        }
    }

    /// Borrow the contents as a slice.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        let ptr = self.as_ptr()?;
        Ok(unsafe { std::slice::from_raw_parts(ptr, self.len) })
    }

    /// Copy the contents back into caller-owned memory.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(self.as_bytes()?.to_vec())
    }

    /// Release the region. Idempotent; afterwards every other operation
    /// fails with [`WebpError::UseAfterRelease`].
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.backing, Backing::Released) {
            // Zero-size regions never allocated.
            Backing::Owned { layout, .. } if layout.size() == 0 => {}
            Backing::Owned { ptr, layout } => unsafe {
                alloc::dealloc(ptr.as_ptr(), layout);
            },
            Backing::Mapped(map) => drop(map),
            Backing::Released => {}
        }
        self.len = 0;
    }
}

impl Drop for NativeRegion {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for NativeRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.backing {
            Backing::Owned { .. } => "owned",
            Backing::Mapped(_) => "mapped",
            Backing::Released => "released",
        };
        f.debug_struct("NativeRegion")
            .field("kind", &kind)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn copy_in_round_trips() {
        let region = NativeRegion::copy_in(b"hello webp").unwrap();
        assert_eq!(region.len().unwrap(), 10);
        assert_eq!(region.to_vec().unwrap(), b"hello webp");
    }

    #[test]
    fn zero_size_region_is_valid_and_empty() {
        let mut region = NativeRegion::copy_in(&[]).unwrap();
        assert_eq!(region.len().unwrap(), 0);
        assert_eq!(region.as_bytes().unwrap(), &[] as &[u8]);
        assert_eq!(region.to_vec().unwrap(), Vec::<u8>::new());
        region.release();
        region.release();
        assert!(matches!(region.len(), Err(WebpError::UseAfterRelease)));
    }

    #[test]
    fn release_is_idempotent_and_poisons() {
        let mut region = NativeRegion::copy_in(&[1, 2, 3]).unwrap();
        region.release();
        region.release();
        assert!(matches!(region.as_ptr(), Err(WebpError::UseAfterRelease)));
        assert!(matches!(region.len(), Err(WebpError::UseAfterRelease)));
        assert!(matches!(region.to_vec(), Err(WebpError::UseAfterRelease)));
    }

    #[test]
    fn mapped_region_reads_file_without_copy() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"RIFFxxxxWEBP").unwrap();
        tmp.flush().unwrap();

        let region = NativeRegion::map_file(tmp.path()).unwrap();
        assert_eq!(region.as_bytes().unwrap(), b"RIFFxxxxWEBP");
    }

    #[test]
    fn mapped_region_rejects_writes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"some bytes").unwrap();
        tmp.flush().unwrap();

        let mut region = NativeRegion::map_file(tmp.path()).unwrap();
        assert!(matches!(
            region.as_mut_ptr(),
            Err(WebpError::ReadOnlyRegion)
        ));
    }
}
