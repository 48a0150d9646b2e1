use std::sync::{Arc, Mutex};

use tessera_geometry::{
    DeviceContext, GeometryKey, GeometryPool, GeometrySettings, SharedGeometry, marker,
};
use tessera_tiles::{Profile, TileKey};

#[derive(Default)]
struct RecordingDevice {
    disposed: Mutex<Vec<GeometryKey>>,
}

impl DeviceContext for RecordingDevice {
    fn dispose(&self, geometry: Arc<SharedGeometry>) {
        self.disposed.lock().unwrap().push(geometry.key());
    }
}

#[test]
fn test_level_one_globe_from_well_known_profile() {
    let profile = Profile::from_well_known_name("global-geodetic");
    let pool = GeometryPool::new(&profile);
    let settings = GeometrySettings {
        tile_size: 9,
        skirt_ratio: 0.05,
        morphing: true,
    };

    let keys = profile.all_keys_at_lod(1);
    assert_eq!(keys.len(), 8);

    let geometries: Vec<_> = keys
        .iter()
        .map(|k| pool.get_pooled_geometry(k, &settings, None).unwrap())
        .collect();

    // two rows at level one
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.build_count(), 2);

    for (key, geometry) in keys.iter().zip(&geometries) {
        assert_eq!(geometry.key().tile_y, key.y);
        assert_eq!(geometry.vertices().len(), 81 + 64);
        assert_eq!(geometry.morph_vertices().map(<[_]>::len), Some(81 + 64));
        assert_eq!(geometry.indices().len(), 8 * 8 * 6 + 8 * 4 * 6);
        let skirts = geometry
            .vertices()
            .iter()
            .filter(|v| v.markers() & marker::SKIRT != 0)
            .count();
        assert_eq!(skirts, 64);
    }
}

#[test]
fn test_parallel_requests_across_the_level() {
    let profile = Profile::global_geodetic();
    let pool = Arc::new(GeometryPool::new(&profile));
    let settings = GeometrySettings {
        tile_size: 5,
        ..Default::default()
    };
    let keys = profile.all_keys_at_lod(3);

    let handles: Vec<_> = keys
        .chunks(8)
        .map(|chunk| {
            let pool = Arc::clone(&pool);
            let chunk = chunk.to_vec();
            std::thread::spawn(move || {
                chunk
                    .iter()
                    .map(|k| pool.get_pooled_geometry(k, &settings, None).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let held: Vec<Arc<SharedGeometry>> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let (_, rows) = profile.num_tiles(3);
    assert_eq!(pool.len(), rows as usize);
    assert_eq!(pool.build_count(), u64::from(rows));

    let device = RecordingDevice::default();
    assert_eq!(pool.sweep(&device), 0);
    drop(held);
    assert_eq!(pool.sweep(&device), rows as usize);
    assert!(pool.is_empty());

    let mut disposed = device.disposed.lock().unwrap().clone();
    disposed.sort();
    disposed.dedup();
    assert_eq!(disposed.len(), rows as usize);
}

#[test]
fn test_profile_round_trip_keeps_cache_keys() {
    let profile = Profile::global_geodetic();
    let restored = Profile::from_json(&profile.to_json().unwrap()).unwrap();
    let pool = GeometryPool::new(&profile);
    let settings = GeometrySettings::default();

    let a = pool
        .get_pooled_geometry(&TileKey::new(4, 2, 5, profile), &settings, None)
        .unwrap();
    let b = pool
        .get_pooled_geometry(&TileKey::new(4, 9, 5, restored), &settings, None)
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_tiles_placed_side_by_side() {
    let profile = Profile::global_geodetic();
    let pool = GeometryPool::new(&profile);
    let settings = GeometrySettings {
        tile_size: 5,
        ..Default::default()
    };
    let west = TileKey::new(2, 3, 1, profile.clone());
    let east = west.create_neighbor_key(1, 0);

    let gw = pool.get_pooled_geometry(&west, &settings, None).unwrap();
    let ge = pool.get_pooled_geometry(&east, &settings, None).unwrap();
    assert!(Arc::ptr_eq(&gw, &ge));

    let mw = pool.tile_to_world_matrix(&west).unwrap();
    let me = pool.tile_to_world_matrix(&east).unwrap();

    // east edge of the west tile meets the west edge of the east tile
    for row in 0..5 {
        let a = mw.transform_point3(gw.vertices()[row * 5 + 4].position().as_dvec3());
        let b = me.transform_point3(ge.vertices()[row * 5].position().as_dvec3());
        assert!((a - b).length() < 2.0, "row {row}: {a:?} vs {b:?}");
    }
}
