use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tessera_geometry::{GeometryPool, GeometrySettings, create_indices};
use tessera_tiles::{Profile, TileKey};

fn bench_create_indices(c: &mut Criterion) {
    let settings = GeometrySettings {
        tile_size: 33,
        skirt_ratio: 0.05,
        morphing: false,
    };
    c.bench_function("create_indices_33_skirt", |b| {
        b.iter(|| create_indices(black_box(&settings)))
    });
}

fn bench_build_geometry(c: &mut Criterion) {
    let profile = Profile::global_geodetic();
    let pool = GeometryPool::new(&profile);
    pool.set_enabled(false);
    let key = TileKey::new(6, 17, 20, profile);

    let mut group = c.benchmark_group("build_geometry");
    for tile_size in [17, 33, 65] {
        let settings = GeometrySettings {
            tile_size,
            skirt_ratio: 0.05,
            morphing: true,
        };
        group.bench_function(format!("tile_size_{tile_size}"), |b| {
            b.iter(|| pool.create_geometry(black_box(&key), &settings, None))
        });
    }
    group.finish();
}

fn bench_pool_hit(c: &mut Criterion) {
    let profile = Profile::global_geodetic();
    let pool = GeometryPool::new(&profile);
    let settings = GeometrySettings::default();
    let key = TileKey::new(6, 17, 20, profile);
    let _warm = pool.get_pooled_geometry(&key, &settings, None);

    c.bench_function("pool_hit", |b| {
        b.iter(|| pool.get_pooled_geometry(black_box(&key), &settings, None))
    });
}

criterion_group!(
    benches,
    bench_create_indices,
    bench_build_geometry,
    bench_pool_hit
);
criterion_main!(benches);
