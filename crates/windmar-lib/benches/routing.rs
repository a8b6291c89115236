use chrono::{DateTime, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use std::hint::black_box;
use windmar_lib::{
    GeoPosition, ParetoConfig, ParetoOptimizer, RouteConstraints, RouteRequest, Router,
    SyntheticWeather, VesselModel, WeatherSource,
};

static DEPARTURE: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
static BISCAY_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::new(
        GeoPosition::new(48.5, -5.5).expect("valid start"),
        GeoPosition::new(43.5, -9.5).expect("valid end"),
        *DEPARTURE,
    )
});

fn router(weather: WeatherSource, resolution: f64) -> Router {
    let constraints = RouteConstraints {
        grid_resolution_deg: resolution,
        ..RouteConstraints::default()
    };
    Router::new(VesselModel::default(), weather, constraints).expect("valid router")
}

fn benchmark_routing(c: &mut Criterion) {
    let request = &*BISCAY_REQUEST;

    c.bench_function("great_circle_biscay", |b| {
        let router = router(WeatherSource::Absent, 0.5);
        b.iter(|| {
            let route = router.plan(request).expect("route exists");
            black_box(route.total_fuel_mt)
        });
    });

    c.bench_function("astar_synthetic_biscay_0_5deg", |b| {
        let router = router(WeatherSource::Synthetic(SyntheticWeather::default()), 0.5);
        b.iter(|| {
            let route = router.plan(request).expect("route exists");
            black_box((route.total_fuel_mt, route.expansions))
        });
    });

    c.bench_function("astar_synthetic_biscay_0_25deg", |b| {
        let router = router(WeatherSource::Synthetic(SyntheticWeather::default()), 0.25);
        b.iter(|| {
            let route = router.plan(request).expect("route exists");
            black_box((route.total_fuel_mt, route.expansions))
        });
    });

    c.bench_function("pareto_synthetic_biscay", |b| {
        let optimizer = ParetoOptimizer::new(
            VesselModel::default(),
            WeatherSource::Synthetic(SyntheticWeather::default()),
            RouteConstraints::default(),
            ParetoConfig::default(),
        )
        .expect("valid optimizer");
        b.iter(|| {
            let front = optimizer.run(request).expect("front exists");
            black_box(front.len())
        });
    });
}

criterion_group!(benches, benchmark_routing);
criterion_main!(benches);
