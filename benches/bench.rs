use core::ptr;

use criterion::*;

const SIZES: [usize; 3] = [127, 1752, 45213];

fn bench_alloc_and_decref(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc-decref");

    for size in SIZES {
        group.bench_function(format!("root children x {size}"), |b| {
            b.iter(|| unsafe {
                let root = relmem::alloc(ptr::null_mut(), 1, 1, 0, None).unwrap();
                for _ in 0..size {
                    let child = relmem::alloc(root, 4, 1, 0, None).unwrap();
                    black_box(child);
                }
                relmem::decref(ptr::null_mut(), root);
            })
        });
    }

    group.finish();
}

fn bench_incref_decref_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("incref-decref-churn");

    for size in SIZES {
        group.bench_function(format!("balanced pairs x {size}"), |b| {
            b.iter(|| unsafe {
                let p = relmem::alloc(ptr::null_mut(), 1, 1, 0, None).unwrap();
                let c = relmem::alloc(ptr::null_mut(), 1, 1, 0, None).unwrap();
                for _ in 0..size {
                    black_box(relmem::incref(p, c).unwrap());
                    relmem::decref(p, c);
                }
                relmem::decref(ptr::null_mut(), p);
                relmem::decref(ptr::null_mut(), c);
            })
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");

    for size in SIZES {
        group.bench_function(format!("plain grow x {size}"), |b| {
            b.iter(|| unsafe {
                let mut payload = relmem::alloc(ptr::null_mut(), 4, 1, 0, None).unwrap();
                for n in 1..size {
                    relmem::resize(&mut payload, 4, n).unwrap();
                }
                relmem::decref(ptr::null_mut(), payload);
            })
        });

        group.bench_function(format!("aligned grow x {size}"), |b| {
            b.iter(|| unsafe {
                let mut payload = relmem::alloc(ptr::null_mut(), 64, 1, 64, None).unwrap();
                for n in 1..size.min(256) {
                    relmem::resize(&mut payload, 64, n).unwrap();
                }
                relmem::decref(ptr::null_mut(), payload);
            })
        });
    }

    group.finish();
}

fn bench_sibling_group_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("group-cascade");

    for size in SIZES {
        group.bench_function(format!("chain of {size} roots"), |b| {
            b.iter(|| unsafe {
                let mut roots = Vec::with_capacity(size);
                for _ in 0..size {
                    roots.push(relmem::alloc(ptr::null_mut(), 1, 1, 0, None).unwrap());
                }
                for window in roots.windows(2) {
                    relmem::group(window[0], window[1]);
                }
                for &root in &roots {
                    relmem::decref(ptr::null_mut(), root);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_alloc_and_decref,
    bench_incref_decref_churn,
    bench_resize,
    bench_sibling_group_cascade
);
criterion_main!(benches);
