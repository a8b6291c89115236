use windmar_lib::error::ErrorKind;
use windmar_lib::vessel::{ConsumptionModel, VesselProfile};
use windmar_lib::{
    fuel_scenarios, CalibrationFactors, LegConditions, VesselModel, VesselSpecs, WeatherSample,
};

#[test]
fn calm_day_at_service_speed() {
    let model = VesselModel::new(VesselSpecs::default()).expect("default specs");
    let leg = model.fuel_for(14.5, true, None, 348.0).expect("valid leg");

    assert!((leg.time_hours - 24.0).abs() < 1e-9);
    assert!(leg.fuel_mt > 15.0 && leg.fuel_mt < 45.0, "fuel {}", leg.fuel_mt);
    assert!(leg.engine_load > 0.3 && leg.engine_load < 1.2);
    assert_eq!(leg.fuel_breakdown.wind, 0.0);
    assert_eq!(leg.fuel_breakdown.wave, 0.0);
}

#[test]
fn head_wind_scenario_costs_more() {
    let model = VesselModel::default();
    let head_wind = LegConditions::new(0.0, WeatherSample::calm().with_wind(10.0, 0.0));
    let calm = model.fuel_for(14.5, true, None, 348.0).unwrap();
    let windy = model.fuel_for(14.5, true, Some(&head_wind), 348.0).unwrap();

    assert!(windy.fuel_mt > calm.fuel_mt);
    let parts = windy.fuel_breakdown;
    assert!((parts.calm + parts.wind + parts.wave - windy.fuel_mt).abs() < 1e-9);
}

#[test]
fn identical_inputs_are_deterministic() {
    let model = VesselModel::default()
        .with_calibration(CalibrationFactors::new(1.1, 0.9, 1.2))
        .unwrap();
    let conditions = LegConditions::new(
        45.0,
        WeatherSample::calm()
            .with_wind(9.0, 20.0)
            .with_waves(2.5, Some(8.0), 30.0),
    );
    let a = model.fuel_for(13.0, false, Some(&conditions), 250.0).unwrap();
    let b = model.fuel_for(13.0, false, Some(&conditions), 250.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn non_positive_speed_is_invalid_input() {
    let model = VesselModel::default();
    for speed in [0.0, -3.0, f64::NAN] {
        let err = model.fuel_for(speed, true, None, 100.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
    let err = model.fuel_for(12.0, true, None, -1.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn quadratic_curve_is_an_alternative_profile() {
    let profile = VesselProfile {
        consumption: ConsumptionModel::QuadraticSfoc {
            optimum_load: 0.8,
            curvature: 0.35,
        },
        ..VesselProfile::default()
    };
    let model = profile.model().expect("valid profile");
    assert_eq!(model.curve_name(), "quadratic_sfoc");

    let slow = model.fuel_for(10.0, true, None, 240.0).unwrap();
    let fast = model.fuel_for(15.0, true, None, 360.0).unwrap();
    assert!(fast.fuel_mt > slow.fuel_mt);
}

#[test]
fn scenarios_follow_the_model() {
    let scenarios = fuel_scenarios(&VesselModel::default()).expect("scenarios");
    let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Calm Weather (Laden)",
            "Head Wind 20 kts (Laden)",
            "Rough Seas (Laden)",
            "Calm Weather (Ballast)",
        ]
    );
    assert!(scenarios.iter().all(|s| s.fuel_mt > 0.0 && s.power_kw > 0.0));
}
