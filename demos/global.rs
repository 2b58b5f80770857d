//! Walks through the lifetime engine's core scenarios: a tagged root,
//! an array child grown in place, and a sibling group that survives
//! until its last member is released.

use core::ptr;

unsafe fn on_drop(_payload: *mut u8) {
    println!("document destroyed");
}

fn main() {
    unsafe {
        let document = relmem::alloc(ptr::null_mut(), 1, 1, 0, Some("Document")).unwrap();
        relmem::destructor_set(document, Some(on_drop));

        let mut paragraphs = relmem::alloc(document, size_of_usize(), 4, 0, None).unwrap();
        println!(
            "document has {} child, paragraphs array is {} bytes",
            relmem::child_count(document, None),
            relmem::size(paragraphs)
        );

        relmem::resize(&mut paragraphs, size_of_usize(), 6).unwrap();
        println!("grew paragraphs array to {} bytes", relmem::size(paragraphs));

        assert_eq!(relmem::ensure_tag(document, "Document"), document);
        relmem::tag_set_fmt(document, format_args!("Document#{}", 42)).unwrap();
        println!(
            "retagged document as {:?}",
            core::str::from_utf8(relmem::tag_get(document).unwrap()).unwrap()
        );

        let a = relmem::alloc(ptr::null_mut(), 1, 1, 0, None).unwrap();
        let b = relmem::alloc(ptr::null_mut(), 1, 1, 0, None).unwrap();
        relmem::group(a, b);
        println!("grouped two independent roots into one joint lifetime");

        relmem::decref(ptr::null_mut(), a);
        println!("dropped root a; b (grouped with it) is still alive until b drops too");
        relmem::decref(ptr::null_mut(), b);

        relmem::decref(document, paragraphs);
        relmem::decref(ptr::null_mut(), document);
    }
}

fn size_of_usize() -> usize {
    core::mem::size_of::<usize>()
}
