use criterion::{Criterion, black_box, criterion_group, criterion_main};
use janma_houses::{Ayanamsa, HouseInputs, HouseSystem, MCHemisphere, compute};

fn inputs(lat: f64) -> HouseInputs {
    HouseInputs {
        local_sidereal_time_deg: 100.2296641,
        latitude_deg: lat,
        obliquity_deg: 23.4431825,
    }
}

fn solver_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("houses");
    for system in HouseSystem::ALL {
        group.bench_function(system.as_str(), |b| {
            let i = inputs(40.0);
            b.iter(|| compute(black_box(&i), system, MCHemisphere::Auto))
        });
    }
    group.bench_function("placidus_high_latitude", |b| {
        let i = inputs(65.0);
        b.iter(|| compute(black_box(&i), HouseSystem::Placidus, MCHemisphere::Auto))
    });
    group.finish();
}

fn ayanamsa_bench(c: &mut Criterion) {
    c.bench_function("fagan_bradley_sidereal_shift", |b| {
        let r = compute(&inputs(0.0), HouseSystem::Placidus, MCHemisphere::North);
        b.iter(|| {
            r.as_ref().map(|r| {
                r.to_sidereal(Ayanamsa::FaganBradley.deg_at_jd(black_box(2_440_587.5)))
            })
        })
    });
}

criterion_group!(benches, solver_bench, ayanamsa_bench);
criterion_main!(benches);
