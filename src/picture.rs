// Copyright (c) the webp-bridge authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Typed wrappers over libwebp's fixed-layout native structs.
//!
//! `sys::WebPConfig` and `sys::WebPPicture` are `#[repr(C)]` mirrors of
//! the native ABI, so field access is already offset-correct; what these
//! wrappers add is the lifecycle the ABI demands. Both structs have
//! undefined contents until the native init entry point has run, and the
//! init status must be checked - so construction goes through init,
//! every native status is converted to an error immediately, and the
//! picture frees its planes exactly once on drop.

use std::os::raw::{c_int, c_void};

use crate::error::{Result, WebpError};
use crate::region::NativeRegion;
use crate::sys;
use crate::types::{ImageHint, ImportFormat};

/// Encoder configuration overlay. Valid from construction: `init` has
/// run and been checked before any field is set.
pub(crate) struct EncoderConfig {
    raw: sys::WebPConfig,
}

impl EncoderConfig {
    /// Initialize a config through the native init call.
    pub(crate) fn init() -> Result<Self> {
        let raw = sys::WebPConfig::new().map_err(|_| WebpError::NativeCallFailed {
            call: "WebPConfigInit",
            code: 0,
        })?;
        Ok(Self { raw })
    }

    pub(crate) fn set_quality(&mut self, quality: f32) {
        self.raw.quality = quality.clamp(0.0, 100.0);
    }

    pub(crate) fn set_lossless(&mut self, lossless: bool) {
        self.raw.lossless = lossless as c_int;
    }

    /// Quality/speed trade-off, 0 (fast) to 6 (slower, better).
    pub(crate) fn set_method(&mut self, method: i32) {
        self.raw.method = method.clamp(0, 6);
    }

    pub(crate) fn set_image_hint(&mut self, hint: ImageHint) {
        self.raw.image_hint = hint.to_native();
    }

    /// Native cross-field sanity check.
    pub(crate) fn validate(&self) -> Result<()> {
        let ok = unsafe { sys::WebPValidateConfig(&self.raw) };
        if ok != 1 {
            return Err(WebpError::NativeCallFailed {
                call: "WebPValidateConfig",
                code: ok,
            });
        }
        Ok(())
    }

    pub(crate) fn as_raw(&self) -> *const sys::WebPConfig {
        &self.raw
    }
}

/// Picture descriptor overlay. Owns the native-allocated pixel planes
/// between `alloc()` and drop.
pub(crate) struct Picture {
    raw: sys::WebPPicture,
}

impl Picture {
    /// Initialize a picture through the native init call.
    pub(crate) fn init() -> Result<Self> {
        let raw = sys::WebPPicture::new().map_err(|_| WebpError::NativeCallFailed {
            call: "WebPPictureInit",
            code: 0,
        })?;
        Ok(Self { raw })
    }

    pub(crate) fn set_dimensions(&mut self, width: u32, height: u32) {
        self.raw.width = width as c_int;
        self.raw.height = height as c_int;
    }

    /// Whether the encoder works on the ARGB plane (true) or Y'CbCr
    /// planes (false). Lossless encoding requires ARGB.
    pub(crate) fn set_use_argb(&mut self, use_argb: bool) {
        self.raw.use_argb = use_argb as c_int;
    }

    /// Allocate the internal pixel planes. Must run after dimensions
    /// are set; computes row strides from them.
    pub(crate) fn alloc(&mut self) -> Result<()> {
        let ok = unsafe { sys::WebPPictureAlloc(&mut self.raw) };
        if ok != 1 {
            let size = self.raw.width as usize * self.raw.height as usize * 4;
            return Err(WebpError::Allocation { size });
        }
        Ok(())
    }

    /// Import interleaved pixels from `region` through the entry point
    /// matching `format`. `stride` is the source row stride in bytes.
    pub(crate) fn import(
        &mut self,
        format: ImportFormat,
        region: &NativeRegion,
        stride: usize,
    ) -> Result<()> {
        let data = region.as_ptr()?;
        let import = format.import_fn();
        let ok = unsafe { import(&mut self.raw, data, stride as c_int) };
        if ok != 1 {
            return Err(WebpError::NativeCallFailed {
                call: format.import_name(),
                code: self.error_code(),
            });
        }
        Ok(())
    }

    /// Register the write callback and its state pointer. The state
    /// must stay alive and pinned for the duration of the encode call.
    pub(crate) fn set_writer(
        &mut self,
        writer: unsafe extern "C" fn(*const u8, usize, *const sys::WebPPicture) -> c_int,
        state: *mut c_void,
    ) {
        self.raw.writer = Some(writer);
        self.raw.custom_ptr = state;
    }

    /// The picture's last native error code.
    pub(crate) fn error_code(&self) -> i32 {
        self.raw.error_code as i32
    }

    pub(crate) fn as_raw_mut(&mut self) -> *mut sys::WebPPicture {
        &mut self.raw
    }
}

impl Drop for Picture {
    fn drop(&mut self) {
        // Frees the native planes; a no-op if alloc never ran.
        unsafe {
            sys::WebPPictureFree(&mut self.raw);
        }
    }
}
