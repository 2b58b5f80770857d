//! The lifetime engine: reference counting over parent edges,
//! cascading destruction across sibling groups, steal, and the public
//! allocate/resize/query surface built on [`chunk`] and [`sibling`].
//!
//! Every function here takes and returns raw payload pointers (`*mut
//! u8`), not [`ChunkHeader`] pointers — this is the boundary where the
//! graph's internal representation meets caller-facing addresses.
//! `null` is tolerated everywhere a payload pointer is accepted: it
//! denotes either "no chunk" (for a pointer that must already name a
//! live chunk) or the explicit root edge (for a parent).

use core::ptr::{self, NonNull};

use alloc::vec::Vec;

use crate::chunk::{self, ChunkHeader};
pub use crate::chunk::Destructor;
use crate::error::{Error, Result};
use crate::sibling;
use crate::tag as tag_mod;

/// Resolves a payload pointer that must already name a live chunk.
fn resolve_required(mem: *mut u8) -> Result<NonNull<ChunkHeader>> {
    NonNull::new(ChunkHeader::from_payload(mem)).ok_or(Error::InvalidArgument)
}

/// Resolves a payload pointer that may legitimately be null (the root
/// edge); a non-null pointer that fails to resolve is malformed.
fn resolve_optional(mem: *mut u8) -> Result<Option<NonNull<ChunkHeader>>> {
    if mem.is_null() {
        return Ok(None);
    }
    NonNull::new(ChunkHeader::from_payload(mem))
        .map(Some)
        .ok_or(Error::InvalidArgument)
}

/// Allocates `elem_size * count` bytes as a new chunk, parented by
/// `parent` (null for a root), optionally aligned and tagged.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn alloc(
    parent: *mut u8,
    elem_size: usize,
    count: usize,
    align: usize,
    tag: Option<&str>,
) -> Result<*mut u8> {
    let payload_size = elem_size.checked_mul(count).ok_or(Error::AllocationFailure)?;
    let header = chunk::allocate(payload_size, align)?;
    let payload = ChunkHeader::payload(header).as_ptr();

    if unsafe { incref(parent, payload) }.is_err() {
        unsafe { chunk::free(header) };
        return Err(Error::AllocationFailure);
    }

    if let Some(tag) = tag {
        unsafe { tag_mod::tag_set_const(payload, tag) };
    }

    Ok(payload)
}

/// As [`alloc`], but zeroes the payload before returning it.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload.
pub unsafe fn alloc_zeroed(
    parent: *mut u8,
    elem_size: usize,
    count: usize,
    align: usize,
    tag: Option<&str>,
) -> Result<*mut u8> {
    let payload = unsafe { alloc(parent, elem_size, count, align, tag) }?;
    // Safety: `alloc` just produced a live chunk at `payload`.
    let header = unsafe { NonNull::new_unchecked(ChunkHeader::from_payload(payload)) };
    unsafe { chunk::zero_payload(header) };
    Ok(payload)
}

/// Resizes `*payload` to `elem_size * count` bytes in place,
/// overwriting `*payload` with the (possibly relocated) new address.
/// The chunk's own alignment — fixed at allocation — is reused as-is.
///
/// # Safety
/// `*payload` must point at a live chunk's payload, and must not be
/// used again except through the slot, since it may be rewritten.
pub unsafe fn resize(
    payload: &mut *mut u8,
    elem_size: usize,
    count: usize,
    zero_growth: bool,
) -> Result<()> {
    let header = resolve_required(*payload)?;
    let new_payload_size = elem_size.checked_mul(count).ok_or(Error::AllocationFailure)?;
    let new_header = unsafe { chunk::resize(header, new_payload_size, zero_growth) }?;
    *payload = ChunkHeader::payload(new_header).as_ptr();
    Ok(())
}

/// As [`resize`], zero-filling any newly grown tail.
///
/// # Safety
/// Same contract as [`resize`].
pub unsafe fn resize_zeroed(payload: &mut *mut u8, elem_size: usize, count: usize) -> Result<()> {
    unsafe { resize(payload, elem_size, count, true) }
}

/// Appends one parent edge `parent -> child`. `parent` may be null
/// (the root edge). Rolls back and fails if `child` is null or either
/// side's edge array cannot grow.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload; `child`
/// must point at a live chunk's payload.
pub unsafe fn incref(parent: *mut u8, child: *mut u8) -> Result<*mut u8> {
    let mut child_header = resolve_required(child)?;
    let parent_header = resolve_optional(parent)?;
    let parent_entry = parent_header.map_or(ptr::null_mut(), NonNull::as_ptr);

    unsafe { child_header.as_mut().parents.push(parent_entry) }?;

    if let Some(mut parent_header) = parent_header {
        if let Err(err) = unsafe { parent_header.as_mut().children.push(child_header.as_ptr()) } {
            unsafe { child_header.as_mut().parents.pop(parent_entry) };
            return Err(err);
        }
    }

    Ok(child)
}

/// Removes one parent edge `parent -> child`, then destroys `child`'s
/// whole sibling group if that edge was its last support. A no-op if
/// `child` is not live, or the edge does not exist.
///
/// # Safety
/// `parent` must be null or point at a live chunk's payload; `child`
/// must be null or point at a live chunk's payload.
pub unsafe fn decref(parent: *mut u8, child: *mut u8) {
    let Ok(mut child_header) = resolve_required(child) else {
        return;
    };
    let Ok(parent_header) = resolve_optional(parent) else {
        return;
    };
    let parent_entry = parent_header.map_or(ptr::null_mut(), NonNull::as_ptr);

    if !unsafe { child_header.as_mut().parents.pop(parent_entry) } {
        return;
    }
    if let Some(mut parent_header) = parent_header {
        unsafe { parent_header.as_mut().children.pop(child_header.as_ptr()) };
    }

    if unsafe { sibling::chain_parent_count(child_header) } == 0 {
        unsafe { destroy_group(child_header) };
    }
}

/// Moves one parent edge of `child` from `old_parent` to `new_parent`.
/// If `old_parent` is null, `child` must have exactly one parent edge,
/// and that edge's source (whatever it is, including the root edge
/// itself) is the one moved.
///
/// # Safety
/// `new_parent` must be null or point at a live chunk's payload;
/// `child` must point at a live chunk's payload; `old_parent`, if
/// non-null, must point at a live chunk's payload.
pub unsafe fn steal(new_parent: *mut u8, child: *mut u8, old_parent: *mut u8) -> Result<*mut u8> {
    let mut child_header = resolve_required(child)?;

    let removed: *mut ChunkHeader = if old_parent.is_null() {
        if unsafe { child_header.as_ref().parents.used() } != 1 {
            return Err(Error::InvalidArgument);
        }
        let only = unsafe { child_header.as_ref().parents.iter().next() }
            .expect("used() == 1 guarantees one entry");
        let popped = unsafe { child_header.as_mut().parents.pop(only) };
        debug_assert!(popped);
        only
    } else {
        let explicit = resolve_required(old_parent)?;
        if !unsafe { child_header.as_mut().parents.pop(explicit.as_ptr()) } {
            return Err(Error::InvalidArgument);
        }
        explicit.as_ptr()
    };

    if !removed.is_null() {
        unsafe { (*removed).children.pop(child_header.as_ptr()) };
    }

    match unsafe { incref(new_parent, child) } {
        Ok(child) => Ok(child),
        Err(err) => {
            let _ = unsafe { child_header.as_mut().parents.push(removed) };
            if !removed.is_null() {
                let _ = unsafe { (*removed).children.push(child_header.as_ptr()) };
            }
            Err(err)
        }
    }
}

/// Installs or replaces `mem`'s destructor. A no-op if `mem` is not
/// live.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn destructor_set(mem: *mut u8, destructor: Option<Destructor>) {
    if let Some(mut header) = NonNull::new(ChunkHeader::from_payload(mem)) {
        unsafe { header.as_mut().destructor = destructor };
    }
}

/// Splices `mem`'s sibling chain in after `cousin`'s; see
/// [`sibling::group`].
///
/// # Safety
/// `cousin`/`mem` must be null or point at a live chunk's payload.
pub unsafe fn group(cousin: *mut u8, mem: *mut u8) {
    unsafe {
        sibling::group(
            ChunkHeader::from_payload(cousin),
            ChunkHeader::from_payload(mem),
        )
    };
}

/// `mem`'s payload size in bytes, or `0` if `mem` is not live.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn size(mem: *mut u8) -> usize {
    NonNull::new(ChunkHeader::from_payload(mem))
        .map(|header| unsafe { header.as_ref().payload_size })
        .unwrap_or(0)
}

/// Number of parent edges on `mem`, optionally filtered to only those
/// whose source carries `tag`. `0` if `mem` is not live.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn parent_count(mem: *mut u8, tag: Option<&str>) -> usize {
    NonNull::new(ChunkHeader::from_payload(mem))
        .map(|header| unsafe { header.as_ref().parents.count_matching(tag) })
        .unwrap_or(0)
}

/// Number of child edges on `mem`, optionally filtered to only those
/// whose target carries `tag`. `0` if `mem` is not live.
///
/// # Safety
/// `mem` must be null or point at a live chunk's payload.
pub unsafe fn child_count(mem: *mut u8, tag: Option<&str>) -> usize {
    NonNull::new(ChunkHeader::from_payload(mem))
        .map(|header| unsafe { header.as_ref().children.count_matching(tag) })
        .unwrap_or(0)
}

/// Runs the two-phase cascade on `start`'s whole sibling chain: every
/// member's destructor first, then every member's teardown. The chain
/// is captured into an owned buffer up front so walking it in the
/// second phase never dereferences a chunk already freed in this pass.
///
/// # Safety
/// `start` must point at a live chunk whose whole sibling chain has
/// zero total parent edges.
unsafe fn destroy_group(start: NonNull<ChunkHeader>) {
    let members: Vec<NonNull<ChunkHeader>> = unsafe { sibling::iter_chain(start).collect() };

    for &member in &members {
        if let Some(destructor) = unsafe { member.as_ref().destructor } {
            let payload = ChunkHeader::payload(member).as_ptr();
            unsafe { destructor(payload) };
        }
    }

    for &member in &members {
        unsafe { teardown_member(member) };
    }
}

/// Recursively decrefs every child of `member` (last index first, so
/// each child's own swap-remove never invalidates the next index to
/// visit), then frees `member` itself.
///
/// # Safety
/// `member` must point at a live chunk already removed from its
/// sibling group's liveness (i.e. mid-cascade).
unsafe fn teardown_member(member: NonNull<ChunkHeader>) {
    let parent_payload = ChunkHeader::payload(member).as_ptr();
    let children: Vec<*mut ChunkHeader> = unsafe { member.as_ref().children.iter_rev().collect() };

    for child in children {
        if !child.is_null() {
            let child_payload = ChunkHeader::payload(unsafe { NonNull::new_unchecked(child) }).as_ptr();
            unsafe { decref(parent_payload, child_payload) };
        }
    }

    unsafe { chunk::free(member) };
}
