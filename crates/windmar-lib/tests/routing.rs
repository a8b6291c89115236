mod common;

use common::{departure, position, uniform, StormBox};
use windmar_lib::error::{Error, ErrorKind};
use windmar_lib::geo::{great_circle_nm, midpoint};
use windmar_lib::{
    CostWeighting, RouteConstraints, RouteMethod, RouteRequest, Router, VesselModel,
    WeatherSample, WeatherSource,
};

fn router(weather: WeatherSource) -> Router {
    Router::new(VesselModel::default(), weather, RouteConstraints::default())
        .expect("default constraints are valid")
}

#[test]
fn no_weather_matches_great_circle() {
    let start = position(51.0, 1.5);
    let end = position(40.7, -74.0);
    let route = router(WeatherSource::Absent)
        .find_optimal_route(start, end, departure(), true, None)
        .expect("direct route");

    let direct = great_circle_nm(&start, &end);
    assert_eq!(route.method, RouteMethod::GreatCircle);
    assert_eq!(route.waypoints.len(), 2);
    assert!((route.total_distance_nm - direct).abs() / direct < 1e-3);
    assert!(route.arrival_time > route.departure_time);
}

#[test]
fn start_equal_to_end_is_empty() {
    let here = position(10.0, 20.0);
    for weather in [WeatherSource::Absent, uniform(WeatherSample::calm())] {
        let route = router(weather)
            .find_optimal_route(here, here, departure(), true, None)
            .expect("zero-length route");
        assert_eq!(route.total_distance_nm, 0.0);
        assert_eq!(route.total_fuel_mt, 0.0);
        assert_eq!(route.arrival_time, route.departure_time);
    }
}

#[test]
fn calm_grid_route_stays_close_to_direct() {
    let start = position(0.0, 0.0);
    let end = position(0.0, 5.0);
    let route = router(uniform(WeatherSample::calm()))
        .find_optimal_route(start, end, departure(), true, None)
        .expect("calm grid route");

    assert_eq!(route.method, RouteMethod::WeatherAStar);
    assert_eq!(route.waypoints.first(), Some(&start));
    assert_eq!(route.waypoints.last(), Some(&end));
    let direct = great_circle_nm(&start, &end);
    assert!(route.total_distance_nm >= direct - 1e-6);
    assert!(route.total_distance_nm < direct * 1.01);
    assert_eq!(route.speed_profile_kts.len(), route.leg_count());
}

#[test]
fn storm_forces_a_detour() {
    let storm = StormBox {
        min_lat: -0.75,
        max_lat: 0.75,
        min_lon: 1.5,
        max_lon: 4.5,
        wind_speed_ms: 30.0,
    };
    let start = position(0.0, 0.0);
    let end = position(0.0, 6.0);
    let route = router(storm.into_source())
        .find_optimal_route(start, end, departure(), true, None)
        .expect("detour exists");

    let direct = great_circle_nm(&start, &end);
    assert!(route.total_distance_nm > direct * 1.01);
    for pair in route.waypoints.windows(2) {
        let centre = midpoint(&pair[0], &pair[1]);
        assert!(!storm.contains(&centre), "leg {pair:?} crosses the storm");
    }
}

#[test]
fn impassable_wall_is_unreachable() {
    let wall = StormBox {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: 2.2,
        max_lon: 3.8,
        wind_speed_ms: 35.0,
    };
    let err = router(wall.into_source())
        .find_optimal_route(position(0.0, 0.0), position(0.0, 6.0), departure(), true, None)
        .expect_err("no edge crosses the wall");
    assert_eq!(err.kind(), ErrorKind::RouteUnreachable);
}

#[test]
fn head_wind_costs_more_fuel() {
    let start = position(0.0, 0.0);
    let end = position(0.0, 4.0);
    // Eastbound leg into an easterly wind.
    let windy = uniform(WeatherSample::calm().with_wind(15.0, 90.0));

    let calm = router(uniform(WeatherSample::calm()))
        .find_optimal_route(start, end, departure(), true, Some(14.0))
        .expect("calm route");
    let head = router(windy)
        .find_optimal_route(start, end, departure(), true, Some(14.0))
        .expect("head wind route");
    assert!(head.total_fuel_mt > calm.total_fuel_mt);
}

#[test]
fn required_weather_is_surfaced() {
    let constraints = RouteConstraints {
        require_weather: true,
        ..RouteConstraints::default()
    };
    let router = Router::new(VesselModel::default(), WeatherSource::Absent, constraints)
        .expect("valid constraints");
    let err = router
        .find_optimal_route(position(0.0, 0.0), position(1.0, 1.0), departure(), true, None)
        .expect_err("weather is required");
    assert_eq!(err.kind(), ErrorKind::WeatherUnavailable);
}

#[test]
fn expansion_cap_is_reported() {
    let constraints = RouteConstraints {
        max_expansions: 3,
        ..RouteConstraints::default()
    };
    let router = Router::new(
        VesselModel::default(),
        uniform(WeatherSample::calm()),
        constraints,
    )
    .expect("valid constraints");
    let err = router
        .find_optimal_route(position(0.0, 0.0), position(0.0, 8.0), departure(), true, None)
        .expect_err("budget too small");
    assert_eq!(err.kind(), ErrorKind::SearchBudgetExceeded);
}

#[test]
fn deadline_is_checked_during_search() {
    let constraints = RouteConstraints {
        grid_resolution_deg: 0.1,
        deadline_ms: Some(0),
        ..RouteConstraints::default()
    };
    let router = Router::new(
        VesselModel::default(),
        uniform(WeatherSample::calm()),
        constraints,
    )
    .expect("valid constraints");
    let err = router
        .find_optimal_route(position(0.0, 0.0), position(0.0, 20.0), departure(), true, None)
        .expect_err("deadline already passed");
    assert!(matches!(err, Error::SearchDeadlineExceeded { expansions: 64, .. }), "{err:?}");
    assert_eq!(err.kind(), ErrorKind::SearchBudgetExceeded);
}

#[test]
fn vanishing_target_speed_is_an_input_error() {
    for weather in [WeatherSource::Absent, uniform(WeatherSample::calm())] {
        let err = router(weather)
            .find_optimal_route(
                position(0.0, 0.0),
                position(5.0, 5.0),
                departure(),
                true,
                Some(1e-9),
            )
            .expect_err("arrival time out of range");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

#[test]
fn polar_endpoints_are_rejected_for_the_grid_search() {
    let start = position(88.0, 0.0);
    let end = position(88.0, 20.0);
    let err = router(uniform(WeatherSample::calm()))
        .find_optimal_route(start, end, departure(), true, None)
        .expect_err("beyond the grid latitude limit");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let direct = router(WeatherSource::Absent)
        .find_optimal_route(start, end, departure(), true, None)
        .expect("direct route needs no grid");
    assert_eq!(direct.method, RouteMethod::GreatCircle);
}

#[test]
fn invalid_coordinates_are_rejected_before_search() {
    let request = RouteRequest {
        start: windmar_lib::GeoPosition { lat: 91.0, lon: 0.0 },
        ..RouteRequest::new(position(0.0, 0.0), position(1.0, 1.0), departure())
    };
    let err = router(WeatherSource::Absent)
        .plan(&request)
        .expect_err("latitude out of range");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn time_weighting_never_slows_the_direct_route() {
    let constraints = RouteConstraints {
        speed_factors: vec![0.8, 0.9, 1.0],
        ..RouteConstraints::default()
    };
    let base = Router::new(VesselModel::default(), WeatherSource::Absent, constraints)
        .expect("valid constraints");
    let start = position(35.0, -10.0);
    let end = position(38.0, -20.0);

    let mut previous: Option<(f64, f64)> = None;
    for lambda in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let router = base
            .clone()
            .with_weighting(CostWeighting::new(lambda, 6.0).expect("valid weighting"))
            .expect("valid weighting");
        let route = router
            .find_optimal_route(start, end, departure(), true, None)
            .expect("direct route");
        if let Some((fuel, time)) = previous {
            assert!(route.total_fuel_mt >= fuel - 1e-9);
            assert!(route.total_time_hours <= time + 1e-9);
        }
        previous = Some((route.total_fuel_mt, route.total_time_hours));
    }
}
