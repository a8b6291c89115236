mod common;

use common::{departure, position, uniform, StormAfter, StormBox};
use windmar_lib::error::ErrorKind;
use windmar_lib::pareto::evenly_spaced_lambdas;
use windmar_lib::{
    pareto_filter, ParetoConfig, ParetoOptimizer, ParetoSolution, RouteConstraints, RouteRequest,
    VesselModel, WeatherSample, WeatherSource,
};

fn optimizer(weather: WeatherSource, config: ParetoConfig) -> ParetoOptimizer {
    ParetoOptimizer::new(
        VesselModel::default(),
        weather,
        RouteConstraints::default(),
        config,
    )
    .expect("valid optimizer")
}

fn request() -> RouteRequest {
    RouteRequest::new(position(0.0, 0.0), position(1.0, 3.0), departure())
}

fn assert_is_front(front: &[ParetoSolution]) {
    for a in front {
        for b in front {
            assert!(!a.dominates(b), "{a:?} dominates {b:?}");
        }
    }
    for pair in front.windows(2) {
        assert!(pair[0].fuel_mt <= pair[1].fuel_mt);
    }
}

#[test]
fn sweep_without_weather_trades_fuel_for_time() {
    let config = ParetoConfig {
        time_weight: 10.0,
        ..ParetoConfig::default()
    };
    let front = optimizer(WeatherSource::Absent, config)
        .run(&request())
        .expect("front");

    assert!(!front.is_empty());
    assert_is_front(&front);
    assert_eq!(front.iter().filter(|s| s.is_selected).count(), 1);

    // Sorted by fuel, so time must fall along the front.
    for pair in front.windows(2) {
        assert!(pair[0].time_hours >= pair[1].time_hours);
    }
}

#[test]
fn lambda_increases_never_raise_time_on_a_static_field() {
    let config = ParetoConfig {
        time_weight: 8.0,
        speed_factors: vec![0.85, 1.0],
        ..ParetoConfig::default()
    };
    let optimizer = optimizer(uniform(WeatherSample::calm()), config);

    let mut previous: Option<ParetoSolution> = None;
    for lambda in [0.0, 0.5, 1.0] {
        let front = optimizer.sweep(&request(), &[lambda]).expect("single point");
        let point = front.into_iter().next().expect("one solution");
        if let Some(prev) = &previous {
            assert!(point.time_hours <= prev.time_hours + 1e-9);
            assert!(point.fuel_mt >= prev.fuel_mt - 1e-9);
        }
        previous = Some(point);
    }
}

#[test]
fn failing_points_surface_the_first_error() {
    let wall = StormBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: 1.2,
        max_lon: 1.8,
        wind_speed_ms: 40.0,
    };
    let err = optimizer(wall.into_source(), ParetoConfig::default())
        .sweep(&request(), &[0.0, 1.0])
        .expect_err("every point is unreachable");
    assert_eq!(err.kind(), ErrorKind::RouteUnreachable);
}

#[test]
fn failed_points_are_dropped_from_the_front() {
    // Slow routes arrive after the weather turns; only the time-weighted point
    // finishes in calm water.
    let weather = StormAfter {
        calm_hours: 8.8,
        wind_speed_ms: 40.0,
    };
    let constraints = RouteConstraints {
        grid_resolution_deg: 0.25,
        ..RouteConstraints::default()
    };
    let config = ParetoConfig {
        time_weight: 10.0,
        speed_factors: vec![0.85, 1.0],
        ..ParetoConfig::default()
    };
    let optimizer = ParetoOptimizer::new(
        VesselModel::default(),
        weather.into_source(),
        constraints,
        config,
    )
    .expect("valid optimizer");
    let request = RouteRequest::new(position(0.0, 0.0), position(0.0, 2.0), departure());

    let front = optimizer
        .sweep(&request, &[0.0, 1.0])
        .expect("one point survives");
    assert_eq!(front.len(), 1);
    assert_eq!(front[0].lambda_value, 1.0);
    assert!(front[0].is_selected);
    assert!(front[0].time_hours < 8.8);
}

#[test]
fn dedicated_workers_give_the_same_front() {
    let shared = optimizer(WeatherSource::Absent, ParetoConfig::default())
        .run(&request())
        .expect("front");
    let pooled = optimizer(
        WeatherSource::Absent,
        ParetoConfig {
            workers: 2,
            ..ParetoConfig::default()
        },
    )
    .run(&request())
    .expect("front");
    assert_eq!(shared, pooled);
}

#[test]
fn filter_properties_hold_for_a_mixed_set() {
    let lambdas = evenly_spaced_lambdas(6);
    let points = [
        (30.0, 50.0),
        (32.0, 45.0),
        (31.0, 52.0),
        (40.0, 40.0),
        (35.0, 46.0),
        (30.0, 50.0),
    ];
    let input: Vec<ParetoSolution> = points
        .iter()
        .zip(&lambdas)
        .map(|(&(fuel, time), &lambda)| {
            ParetoSolution::new(lambda, fuel, time, 100.0, vec![], vec![12.0])
        })
        .collect();

    let front = pareto_filter(input.clone());
    assert_is_front(&front);
    for candidate in &input {
        let kept = front.contains(candidate);
        let dominated = front.iter().any(|f| f.dominates(candidate));
        assert!(kept || dominated, "{candidate:?} was dropped without cause");
    }
}
