use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use harmonic_space::basis::PrimeBasis;
use harmonic_space::cps::CombinationProductSet;
use harmonic_space::lattice::LatticeBuilder;
use harmonic_space::walk::RandomWalker;

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice_build");
    for &(limit, r) in &[(5u64, 8u32), (7, 4), (11, 3), (13, 2)] {
        let basis = PrimeBasis::limit(limit).unwrap();
        group.bench_with_input(
            BenchmarkId::new(format!("{limit}-limit"), r),
            &r,
            |b, &r| b.iter(|| black_box(LatticeBuilder::new(&basis, r).build().unwrap())),
        );
    }
    group.finish();
}

fn bench_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors");
    for &r in &[1u32, 3, 6] {
        let lattice = LatticeBuilder::new(&PrimeBasis::limit(11).unwrap(), r)
            .build()
            .unwrap();
        group.bench_with_input(BenchmarkId::new("11-limit", r), &lattice, |b, lattice| {
            b.iter(|| {
                let mut total = 0;
                for node in lattice.nodes().iter().step_by(97) {
                    total += lattice.neighbors(node.id).len();
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

fn bench_walk(c: &mut Criterion) {
    let lattice = LatticeBuilder::new(&PrimeBasis::limit(7).unwrap(), 4)
        .build()
        .unwrap();
    let origin = lattice.origin();
    c.bench_function("walk_1000_steps", |b| {
        b.iter(|| {
            let mut walker = RandomWalker::seeded(&lattice, 17);
            black_box(walker.walk_from(origin, 1000).unwrap())
        })
    });
}

fn bench_cps(c: &mut Criterion) {
    let factors: Vec<u64> = vec![1, 3, 5, 7, 9, 11, 13, 15, 17, 19];
    c.bench_function("cps_10_choose_5", |b| {
        b.iter(|| black_box(CombinationProductSet::new(&factors, 5).unwrap()))
    });
}

criterion_group!(benches, bench_build, bench_neighbors, bench_walk, bench_cps);
criterion_main!(benches);
