//! Tagging: a per-chunk debug label, either borrowed (a `'static`-ish
//! constant the caller supplied) or owned (a formatted string
//! allocated as a child of the tagged chunk), plus the `ensure_tag`
//! runtime type-check built on top of it.

use core::ptr::NonNull;

use crate::chunk::ChunkHeader;
use crate::engine;
use crate::error::Result;
use crate::fmt as fmt_helpers;

/// The tag slot stored in a chunk's header.
pub(crate) struct TagSlot {
    ptr: NonNull<u8>,
    len: usize,
    /// Set when `ptr` names a child chunk allocated by `tag_set`
    /// (and so must be decref'd when replaced); clear for a borrowed
    /// constant installed by `tag_set_const`.
    owned: bool,
}

impl TagSlot {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        // Safety: `ptr`/`len` describe either a caller-supplied `&str`
        // (borrowed case) or a live child chunk's payload (owned case);
        // both outlive this slot for as long as it is installed.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

/// Replaces `mem`'s tag with a borrowed constant, releasing the
/// previous tag (if it was owned) against `mem`.
///
/// # Safety
/// `mem` must point at a live chunk's payload, or be null.
pub unsafe fn tag_set_const(mem: *mut u8, tag: &str) -> bool {
    let Some(mut header) = NonNull::new(ChunkHeader::from_payload(mem)) else {
        return false;
    };

    unsafe { release_previous_tag(header, mem) };

    unsafe {
        header.as_mut().tag = Some(TagSlot {
            ptr: NonNull::new(tag.as_ptr() as *mut u8).unwrap_or(NonNull::dangling()),
            len: tag.len(),
            owned: false,
        });
    }
    true
}

/// Replaces `mem`'s tag with a freshly formatted string allocated as a
/// child of `mem`, releasing the previous tag (if owned).
///
/// # Safety
/// `mem` must point at a live chunk's payload, or be null.
pub unsafe fn tag_set_fmt(mem: *mut u8, args: core::fmt::Arguments<'_>) -> Result<bool> {
    let Some(mut header) = NonNull::new(ChunkHeader::from_payload(mem)) else {
        return Ok(false);
    };

    let formatted = unsafe { fmt_helpers::fmt_alloc(mem, args) }?;

    unsafe { release_previous_tag(header, mem) };

    // Safety: `formatted` was just allocated as a live child of `mem`.
    let formatted_header =
        unsafe { NonNull::new_unchecked(ChunkHeader::from_payload(formatted.as_ptr())) };
    let len = unsafe { formatted_header.as_ref().payload_size.saturating_sub(1) };

    unsafe {
        header.as_mut().tag = Some(TagSlot {
            ptr: formatted,
            len,
            owned: true,
        });
    }
    Ok(true)
}

/// Returns `mem`'s current tag as bytes, or `None` if it has none (or
/// `mem` does not name a live chunk).
///
/// # Safety
/// `mem` must point at a live chunk's payload, or be null.
pub unsafe fn tag_get(mem: *mut u8) -> Option<&'static [u8]> {
    let header = NonNull::new(ChunkHeader::from_payload(mem))?;
    // Safety: tag bytes outlive the header for as long as it's installed;
    // extending to `'static` here mirrors the original API returning a
    // raw `const char *` with the same caller-managed lifetime contract.
    unsafe {
        header
            .as_ref()
            .tag
            .as_ref()
            .map(|slot| core::mem::transmute::<&[u8], &'static [u8]>(slot.as_bytes()))
    }
}

/// Returns `mem` if it names a live chunk whose tag is byte-equal to
/// `s`, else null.
///
/// # Safety
/// `mem` must point at a live chunk's payload, or be null.
pub unsafe fn ensure_tag(mem: *mut u8, s: &str) -> *mut u8 {
    let Some(header) = NonNull::new(ChunkHeader::from_payload(mem)) else {
        return core::ptr::null_mut();
    };
    if unsafe { header.as_ref().tag_matches(s) } {
        mem
    } else {
        core::ptr::null_mut()
    }
}

/// Releases `header`'s current tag, if any, decref'ing it against
/// `mem` when it was an owned (formatted) tag chunk.
///
/// # Safety
/// `header` must be the live header for payload `mem`.
unsafe fn release_previous_tag(mut header: NonNull<ChunkHeader>, mem: *mut u8) {
    let previous = unsafe { header.as_mut().tag.take() };
    if let Some(slot) = previous {
        if slot.owned {
            unsafe { engine::decref(mem, slot.ptr.as_ptr()) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk;
    use crate::engine;

    #[test]
    fn const_tag_round_trips() {
        unsafe {
            let top = chunk::allocate(0, 0).unwrap();
            let mem = ChunkHeader::payload(top).as_ptr();
            engine::incref(core::ptr::null_mut(), mem).unwrap();

            assert!(tag_set_const(mem, "myStruct"));
            assert_eq!(tag_get(mem), Some(b"myStruct".as_slice()));
            assert_eq!(ensure_tag(mem, "myStruct"), mem);
            assert!(ensure_tag(mem, "other").is_null());

            engine::decref(core::ptr::null_mut(), mem);
        }
    }

    #[test]
    fn fmt_tag_is_owned_and_replaces_const_tag() {
        unsafe {
            let top = chunk::allocate(0, 0).unwrap();
            let mem = ChunkHeader::payload(top).as_ptr();
            engine::incref(core::ptr::null_mut(), mem).unwrap();

            assert!(tag_set_const(mem, "foo"));
            assert_eq!(engine::child_count(mem, None), 0);

            assert!(tag_set_fmt(mem, format_args!("foo {}", "bar")).unwrap());
            assert_eq!(tag_get(mem), Some(b"foo bar".as_slice()));
            assert_eq!(engine::child_count(mem, None), 1);

            assert!(tag_set_const(mem, "baz"));
            assert_eq!(engine::child_count(mem, None), 0);
            assert_eq!(tag_get(mem), Some(b"baz".as_slice()));

            engine::decref(core::ptr::null_mut(), mem);
        }
    }
}
