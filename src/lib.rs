#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

//! `relmem` is a relational memory manager: every allocation is a node
//! in a directed parent/child graph, freed automatically once it
//! becomes unreachable from any externally held root. A block may
//! carry multiple parent edges (one per distinct `incref`), an
//! optional destructor, a debug tag, and may be grouped with sibling
//! blocks that share one joint lifetime.
//!
//! The engine is not thread-safe, not a cycle collector, and never
//! moves live memory except on an explicit resize — see the
//! [`engine`] module for the full contract.

#[cfg(feature = "alloc")]
extern crate alloc;

mod align;
mod chunk;
mod edge;
mod engine;
mod error;
mod fmt;
mod sibling;
mod tag;


pub use crate::engine::Destructor;
pub use crate::error::{Error, Result};

/// Allocates `count` elements of `elem_size` bytes as a child of
/// `parent` (use [`core::ptr::null_mut`] for a root allocation),
/// optionally aligned to a power-of-two `align` (`0` for no special
/// alignment) and tagged with `tag`.
///
/// # Safety
/// `parent` must be null or a payload pointer returned by this crate
/// that still names a live chunk.
pub unsafe fn alloc(
    parent: *mut u8,
    elem_size: usize,
    count: usize,
    align: usize,
    tag: Option<&str>,
) -> Result<*mut u8> {
    unsafe { engine::alloc(parent, elem_size, count, align, tag) }
}

/// As [`alloc`], zeroing the returned payload.
///
/// # Safety
/// Same contract as [`alloc`].
pub unsafe fn alloc_zeroed(
    parent: *mut u8,
    elem_size: usize,
    count: usize,
    align: usize,
    tag: Option<&str>,
) -> Result<*mut u8> {
    unsafe { engine::alloc_zeroed(parent, elem_size, count, align, tag) }
}

/// Resizes `*payload` to `elem_size * count` bytes in place, rewriting
/// `*payload` if the backing storage relocated.
///
/// # Safety
/// `*payload` must point at a live chunk's payload.
pub unsafe fn resize(payload: &mut *mut u8, elem_size: usize, count: usize) -> Result<()> {
    unsafe { engine::resize(payload, elem_size, count, false) }
}

/// As [`resize`], zero-filling any newly grown tail.
///
/// # Safety
/// Same contract as [`resize`].
pub unsafe fn resize_zeroed(payload: &mut *mut u8, elem_size: usize, count: usize) -> Result<()> {
    unsafe { engine::resize_zeroed(payload, elem_size, count) }
}

/// Appends one parent edge `parent -> child`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload; `child`
/// must point at a live chunk's payload.
pub unsafe fn incref(parent: *mut u8, child: *mut u8) -> Result<*mut u8> {
    unsafe { engine::incref(parent, child) }
}

/// Removes one parent edge `parent -> child`, destroying `child`'s
/// whole sibling group if it was the last support keeping it alive.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload; `child`
/// must be null or point at a live chunk's payload.
pub unsafe fn decref(parent: *mut u8, child: *mut u8) {
    unsafe { engine::decref(parent, child) }
}

/// Moves one parent edge of `child` from `old_parent` to `new_parent`.
/// Pass null for `old_parent` to have the engine infer it, which
/// requires `child` to currently have exactly one parent edge.
///
/// # Safety
/// `new_parent` must be null or point at a live chunk's payload;
/// `child` must point at a live chunk's payload; `old_parent`, if
/// non-null, must point at a live chunk's payload.
pub unsafe fn steal(new_parent: *mut u8, child: *mut u8, old_parent: *mut u8) -> Result<*mut u8> {
    unsafe { engine::steal(new_parent, child, old_parent) }
}

/// Installs or replaces `mem`'s destructor.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn destructor_set(mem: *mut u8, destructor: Option<Destructor>) {
    unsafe { engine::destructor_set(mem, destructor) }
}

/// Splices `mem`'s sibling chain in immediately after `cousin`'s
/// position in `cousin`'s own chain; every chunk reachable from either
/// chain afterwards dies together.
///
/// # Safety
/// `cousin`/`mem` must be null or point at a live chunk's payload.
pub unsafe fn group(cousin: *mut u8, mem: *mut u8) {
    unsafe { engine::group(cousin, mem) }
}

/// `mem`'s payload size in bytes, or `0` if `mem` is not live.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn size(mem: *mut u8) -> usize {
    unsafe { engine::size(mem) }
}

/// Number of parent edges on `mem`, optionally filtered by tag.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn parent_count(mem: *mut u8, tag: Option<&str>) -> usize {
    unsafe { engine::parent_count(mem, tag) }
}

/// Number of child edges on `mem`, optionally filtered by tag.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn child_count(mem: *mut u8, tag: Option<&str>) -> usize {
    unsafe { engine::child_count(mem, tag) }
}

/// Replaces `mem`'s tag with a borrowed constant (no allocation).
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn tag_set_const(mem: *mut u8, s: &str) -> bool {
    unsafe { tag::tag_set_const(mem, s) }
}

/// Replaces `mem`'s tag with a freshly formatted string allocated as a
/// child of `mem`. Build `args` with `format_args!("...", ...)`.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn tag_set_fmt(mem: *mut u8, args: core::fmt::Arguments<'_>) -> Result<bool> {
    unsafe { tag::tag_set_fmt(mem, args) }
}

/// `mem`'s current tag bytes, or `None` if it has none.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn tag_get(mem: *mut u8) -> Option<&'static [u8]> {
    unsafe { tag::tag_get(mem) }
}

/// `mem` if it names a live chunk whose tag is byte-equal to `s`, else
/// null.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn ensure_tag(mem: *mut u8, s: &str) -> *mut u8 {
    unsafe { tag::ensure_tag(mem, s) }
}

/// Copies `s` into a freshly allocated child of `parent`, NUL
/// terminated. Out of the engine's scope proper; a thin convenience
/// wrapper over [`alloc`].
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn strdup(parent: *mut u8, s: &str) -> Result<*mut u8> {
    unsafe { fmt::strdup(parent, s) }
}

/// As [`strdup`], copying at most `len` bytes of `s`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn strndup(parent: *mut u8, s: &str, len: usize) -> Result<*mut u8> {
    unsafe { fmt::strndup(parent, s, len) }
}

/// Formats `args` and allocates the result as a child of `parent`.
/// Build `args` with `format_args!("...", ...)`.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn asprintf(parent: *mut u8, args: core::fmt::Arguments<'_>) -> Result<*mut u8> {
    unsafe { fmt::asprintf(parent, args) }
}
