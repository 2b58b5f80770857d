//! The sibling group: a doubly-linked "cousin" chain of chunks that
//! share one joint lifetime — the lifetime engine destroys every
//! member of a chain together, once the whole chain's parent edges
//! have dropped to zero. A freshly allocated chunk starts in a
//! singleton chain containing only itself (`prev == next == None`).

use core::ptr::NonNull;

use crate::chunk::ChunkHeader;

/// Splices `mem`'s entire chain in immediately after `cousin`'s
/// position in `cousin`'s own chain.
///
/// No-op if either pointer is null (does not name a live chunk).
///
/// # Safety
/// Both pointers, if non-null, must point at live chunks.
pub(crate) unsafe fn group(cousin: *mut ChunkHeader, mem: *mut ChunkHeader) {
    let (Some(cousin), Some(mem)) = (NonNull::new(cousin), NonNull::new(mem)) else {
        return;
    };

    let mut head = mem;
    while let Some(prev) = unsafe { head.as_ref().prev } {
        head = prev;
    }
    let mut tail = mem;
    while let Some(next) = unsafe { tail.as_ref().next } {
        tail = next;
    }

    let cousin_next = unsafe { cousin.as_ref().next };
    if let Some(mut cousin_next) = cousin_next {
        unsafe { cousin_next.as_mut().prev = Some(tail) };
    }
    unsafe {
        (*tail.as_ptr()).next = cousin_next;
        (*cousin.as_ptr()).next = Some(head);
        (*head.as_ptr()).prev = Some(cousin);
    }
}

/// Sums `parents.used()` across every member of `chunk`'s sibling
/// chain — the group is alive iff this sum is nonzero.
///
/// # Safety
/// `chunk` must point at a live chunk.
pub(crate) unsafe fn chain_parent_count(chunk: NonNull<ChunkHeader>) -> usize {
    let mut total = 0usize;
    for member in iter_chain(chunk) {
        total += unsafe { member.as_ref().parents.used() as usize };
    }
    total
}

/// Iterates every member of `chunk`'s sibling chain, starting from
/// the chain's head so destruction order is deterministic
/// (left-to-right, matching spec.md §5's "chain order" note).
///
/// # Safety
/// `chunk` must point at a live chunk.
pub(crate) unsafe fn iter_chain(chunk: NonNull<ChunkHeader>) -> ChainIter {
    let mut head = chunk;
    while let Some(prev) = unsafe { head.as_ref().prev } {
        head = prev;
    }
    ChainIter { next: Some(head) }
}

pub(crate) struct ChainIter {
    next: Option<NonNull<ChunkHeader>>,
}

impl Iterator for ChainIter {
    type Item = NonNull<ChunkHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = unsafe { current.as_ref().next };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk;

    unsafe fn chain_addrs(start: NonNull<ChunkHeader>) -> std::vec::Vec<*mut ChunkHeader> {
        unsafe { iter_chain(start).map(|p| p.as_ptr()).collect() }
    }

    #[test]
    fn group_splices_chain_after_cousin() {
        unsafe {
            let a = chunk::allocate(0, 0).unwrap();
            let b = chunk::allocate(0, 0).unwrap();
            let c = chunk::allocate(0, 0).unwrap();

            group(a.as_ptr(), b.as_ptr());
            group(b.as_ptr(), c.as_ptr());

            let chain = chain_addrs(a);
            assert_eq!(chain, std::vec![a.as_ptr(), b.as_ptr(), c.as_ptr()]);

            // Symmetry: every a.next == b implies b.prev == a.
            let mut node = chain[0];
            for &next in &chain[1..] {
                assert_eq!((*node).next, NonNull::new(next));
                assert_eq!((*next).prev, NonNull::new(node));
                node = next;
            }

            chunk::free(a);
            chunk::free(b);
            chunk::free(c);
        }
    }

    #[test]
    fn group_is_noop_for_null_pointers() {
        unsafe {
            let a = chunk::allocate(0, 0).unwrap();
            group(core::ptr::null_mut(), a.as_ptr());
            group(a.as_ptr(), core::ptr::null_mut());
            assert_eq!(chain_addrs(a), std::vec![a.as_ptr()]);
            chunk::free(a);
        }
    }

    #[test]
    fn chain_parent_count_sums_whole_group() {
        unsafe {
            let a = chunk::allocate(0, 0).unwrap();
            let b = chunk::allocate(0, 0).unwrap();
            a.as_ptr().as_mut().unwrap().parents.push(core::ptr::null_mut()).unwrap();
            b.as_ptr().as_mut().unwrap().parents.push(core::ptr::null_mut()).unwrap();
            group(a.as_ptr(), b.as_ptr());
            assert_eq!(chain_parent_count(a), 2);
            a.as_ptr().as_mut().unwrap().parents.pop(core::ptr::null_mut());
            assert_eq!(chain_parent_count(b), 1);
            chunk::free(a);
            chunk::free(b);
        }
    }
}
