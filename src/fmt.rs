//! Convenience string helpers layered entirely on the public
//! `chunk`/`engine` API — no engine support is special-cased for them.
//! spec.md calls these "thin wrappers over the core's allocator and a
//! standard formatted-print routine"; Rust has no C varargs, so the
//! `asprintf`/`vasprintf` pair collapses into one function taking a
//! `core::fmt::Arguments` (exactly what `format_args!` produces, and
//! exactly how `alloc::format!` itself is implemented).

use core::fmt::Write as _;
use core::ptr::NonNull;

use alloc::string::String;

use crate::engine;
use crate::error::{Error, Result};

/// Allocates a child of `parent` holding `bytes` plus one trailing NUL
/// byte, and incref's it under `parent`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
unsafe fn dup_bytes(parent: *mut u8, bytes: &[u8]) -> Result<NonNull<u8>> {
    let payload = unsafe { engine::alloc(parent, bytes.len() + 1, 1, 0, None) }?;
    unsafe {
        core::ptr::copy_nonoverlapping(bytes.as_ptr(), payload, bytes.len());
        *payload.add(bytes.len()) = 0;
    }
    Ok(unsafe { NonNull::new_unchecked(payload) })
}

/// Rust equivalent of `sc_strdup`: copies all of `s` as a child of
/// `parent`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn strdup(parent: *mut u8, s: &str) -> Result<*mut u8> {
    unsafe { strndup(parent, s, s.len()) }
}

/// Rust equivalent of `sc_strndup`: copies at most `len` bytes of `s`
/// as a child of `parent`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn strndup(parent: *mut u8, s: &str, len: usize) -> Result<*mut u8> {
    let len = len.min(s.len());
    unsafe { dup_bytes(parent, &s.as_bytes()[..len]) }.map(NonNull::as_ptr)
}

/// Rust equivalent of `sc_asprintf`/`sc_vasprintf`: formats `args` and
/// allocates the result as a child of `parent`. Callers build `args`
/// with `format_args!("...", ...)`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn asprintf(parent: *mut u8, args: core::fmt::Arguments<'_>) -> Result<*mut u8> {
    unsafe { fmt_alloc(parent, args) }.map(NonNull::as_ptr)
}

/// Internal formatting entry point shared with `tag::tag_set_fmt`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub(crate) unsafe fn fmt_alloc(
    parent: *mut u8,
    args: core::fmt::Arguments<'_>,
) -> Result<NonNull<u8>> {
    let mut buf = String::new();
    buf.write_fmt(args).map_err(|_| Error::AllocationFailure)?;
    unsafe { dup_bytes(parent, buf.as_bytes()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{self, ChunkHeader};

    #[test]
    fn strdup_copies_and_nul_terminates() {
        unsafe {
            let top = chunk::allocate(0, 0).unwrap();
            let mem = ChunkHeader::payload(top).as_ptr();
            engine::incref(core::ptr::null_mut(), mem).unwrap();

            let dup = strdup(mem, "hello").unwrap();
            let header = NonNull::new(ChunkHeader::from_payload(dup)).unwrap();
            assert_eq!(header.as_ref().payload_size, 6);
            let slice = core::slice::from_raw_parts(dup, 6);
            assert_eq!(slice, b"hello\0");

            engine::decref(core::ptr::null_mut(), mem);
        }
    }

    #[test]
    fn asprintf_formats_arguments() {
        unsafe {
            let top = chunk::allocate(0, 0).unwrap();
            let mem = ChunkHeader::payload(top).as_ptr();
            engine::incref(core::ptr::null_mut(), mem).unwrap();

            let formatted = asprintf(mem, format_args!("foo {}", "bar")).unwrap();
            let slice = core::slice::from_raw_parts(formatted, 7);
            assert_eq!(slice, b"foo bar");

            engine::decref(core::ptr::null_mut(), mem);
        }
    }
}
