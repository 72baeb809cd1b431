use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

use sf_design::MotifRules;
use sf_structure::MotifTree;
use sf_treealign::align;

pub fn motif_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("MotifAlignment");

    let target = MotifTree::build(
        "((((((...((((........)))).((((.........)))).....((((.......))))...))))))....",
        &"N".repeat(76),
    ).unwrap();
    let design = MotifTree::build(
        "(((((....((((......))))..((((...........))))...((((...)))).((...))..)))))...",
        "GCGCGAAAAGCGCAAAAAAGCGCAAGCGCAAAAAAAAAAAGCGCAAAGCGCAAAGCGCAGCAAAGCAAGCGCGAAA",
    ).unwrap();
    let rules = MotifRules::default();

    group.bench_function("Align design against target.", |b| {
        b.iter(|| align(design.tree(), target.tree(), &rules));
    });

    group.bench_function("Build motif tree.", |b| {
        b.iter(|| MotifTree::build(
            "((((((...((((........)))).((((.........)))).....((((.......))))...))))))....",
            "GGGGGGAAAGGGGAAAAAAAACCCCAGGGGAAAAAAAAACCCCAAAAAGGGGAAAAAAACCCCAAACCCCCCAAAA",
        ));
    });
    group.finish();
}

criterion_group!(benches, motif_alignment);
criterion_main!(benches);
