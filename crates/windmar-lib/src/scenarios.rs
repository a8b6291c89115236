//! Pre-calculated fuel scenarios for comparing weather and loading effects.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::vessel::{LegConditions, VesselModel};
use crate::weather::WeatherSample;

/// One day's steaming at service speed in fixed conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelScenario {
    pub name: String,
    pub fuel_mt: f64,
    pub power_kw: f64,
    pub conditions: String,
}

struct ScenarioSpec {
    name: &'static str,
    speed_kts: f64,
    is_laden: bool,
    distance_nm: f64,
    conditions: Option<LegConditions>,
    description: &'static str,
}

fn scenario_specs() -> [ScenarioSpec; 4] {
    [
        ScenarioSpec {
            name: "Calm Weather (Laden)",
            speed_kts: 14.5,
            is_laden: true,
            distance_nm: 348.0,
            conditions: None,
            description: "14.5 kts, no wind/waves",
        },
        ScenarioSpec {
            name: "Head Wind 20 kts (Laden)",
            speed_kts: 14.5,
            is_laden: true,
            distance_nm: 348.0,
            conditions: Some(LegConditions::new(
                0.0,
                WeatherSample::calm().with_wind(10.0, 0.0),
            )),
            description: "14.5 kts, 20 kt head wind",
        },
        ScenarioSpec {
            name: "Rough Seas (Laden)",
            speed_kts: 14.5,
            is_laden: true,
            distance_nm: 348.0,
            conditions: Some(LegConditions::new(
                0.0,
                WeatherSample::calm()
                    .with_wind(12.5, 0.0)
                    .with_waves(3.0, None, 0.0),
            )),
            description: "14.5 kts, 25 kt wind + 3m waves",
        },
        ScenarioSpec {
            name: "Calm Weather (Ballast)",
            speed_kts: 15.0,
            is_laden: false,
            distance_nm: 360.0,
            conditions: None,
            description: "15.0 kts, no wind/waves",
        },
    ]
}

/// Evaluate the standard comparison scenarios against `model`.
pub fn fuel_scenarios(model: &VesselModel) -> Result<Vec<FuelScenario>> {
    scenario_specs()
        .into_iter()
        .map(|spec| {
            let estimate = model.fuel_for(
                spec.speed_kts,
                spec.is_laden,
                spec.conditions.as_ref(),
                spec.distance_nm,
            )?;
            Ok(FuelScenario {
                name: spec.name.to_string(),
                fuel_mt: estimate.fuel_mt,
                power_kw: estimate.power_kw,
                conditions: spec.description.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_scenarios_cost_more_than_calm() {
        let scenarios = fuel_scenarios(&VesselModel::default()).unwrap();
        assert_eq!(scenarios.len(), 4);

        let calm = &scenarios[0];
        let head_wind = &scenarios[1];
        let rough = &scenarios[2];
        assert!(head_wind.fuel_mt > calm.fuel_mt);
        assert!(rough.fuel_mt > head_wind.fuel_mt);
        assert!(rough.power_kw > calm.power_kw);
    }

    #[test]
    fn ballast_scenario_is_lighter_per_mile() {
        let scenarios = fuel_scenarios(&VesselModel::default()).unwrap();
        let laden = &scenarios[0];
        let ballast = &scenarios[3];
        assert!(ballast.fuel_mt / 360.0 < laden.fuel_mt / 348.0 * 1.2);
        assert_eq!(ballast.name, "Calm Weather (Ballast)");
    }
}
