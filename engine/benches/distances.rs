use std::sync::Arc;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geo::point;
use geo::prelude::*;

use geofence_engine::{distance_meters, load_zones, Coordinate, GeofenceEngine, PositionSample};

fn setup() -> (Coordinate, Coordinate) {
    (
        Coordinate::new(48.573174, 2.319671),
        Coordinate::new(48.566757, 2.303015),
    )
}

fn self_haversines(c: &mut Criterion) {
    let (point1, point2) = setup();

    c.bench_function("self::haversines", move |b| {
        b.iter(|| {
            black_box(distance_meters(&point1, black_box(&point2)));
        })
    });
}

fn geo_haversines(c: &mut Criterion) {
    let (point1, point2) = setup();

    let p1 = point!(x: point1.lon, y: point1.lat);
    let p2 = point!(x: point2.lon, y: point2.lat);

    c.bench_function("geo::haversines", |b| {
        b.iter(|| {
            black_box(p1.haversine_distance(&p2));
        })
    });
}

fn engine_evaluate(c: &mut Criterion) {
    let registry = Arc::new(load_zones(None).unwrap());
    let mut engine = GeofenceEngine::new(registry);

    let inside = PositionSample::new(Coordinate::new(40.7589, -73.9851), Utc::now());
    let outside = PositionSample::new(Coordinate::new(40.7700, -73.9851), Utc::now());

    c.bench_function("engine::evaluate", |b| {
        b.iter(|| {
            black_box(engine.evaluate(black_box(&inside)));
            black_box(engine.evaluate(black_box(&outside)));
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = self_haversines, geo_haversines, engine_evaluate
}

criterion_main!(benches);
