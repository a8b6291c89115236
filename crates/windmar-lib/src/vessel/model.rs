//! Resistance, power and fuel for a single leg.
//!
//! Total resistance is the sum of three calibrated terms:
//!
//! - calm water: ITTC-57 friction with a form factor plus a Froude-scaled residuary term
//! - wind: relative-wind drag on the transverse windage area
//! - waves: Kreitner's added resistance, scaled by encounter angle and wave period
//!
//! A following wind may reduce resistance by at most [`MAX_WIND_ASSIST`] of the calm
//! term and a current may change speed over ground by at most [`MAX_CURRENT_FRACTION`].
//! Both limits make [`VesselModel::min_fuel_per_nm`] a true floor on fuel per mile.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::weather::WeatherSample;

use super::constants::{
    AIR_DENSITY, FORM_FACTOR, GRAVITY, KINEMATIC_VISCOSITY, KNOTS_TO_MS, MAX_CURRENT_FRACTION,
    MAX_WIND_ASSIST, PROPULSIVE_EFFICIENCY, REFERENCE_FROUDE, RESIDUARY_COEFFICIENT,
    RESIDUARY_EXPONENT, SEAWATER_DENSITY, WAVE_RESISTANCE_COEFFICIENT, WIND_DRAG_COEFFICIENT,
};
use super::consumption::{ConsumptionCurve, LinearLoadCurve};
use super::specs::{CalibrationFactors, VesselSpecs};

/// Heading and weather for a leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegConditions {
    /// Course steered, degrees true.
    pub heading_deg: f64,
    pub weather: WeatherSample,
}

impl LegConditions {
    pub fn new(heading_deg: f64, weather: WeatherSample) -> Self {
        Self {
            heading_deg,
            weather,
        }
    }
}

/// Resistance terms in kN after calibration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResistanceBreakdown {
    pub calm_water: f64,
    pub wind: f64,
    pub waves: f64,
    pub total: f64,
}

/// Leg fuel attributed to each resistance term. Sums to the leg total.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FuelBreakdown {
    pub calm: f64,
    pub wind: f64,
    pub wave: f64,
}

/// Result of a fuel calculation for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuelEstimate {
    /// Fuel burned over the leg (t).
    pub fuel_mt: f64,
    /// Required brake power (kW).
    pub power_kw: f64,
    /// Time on the leg (h).
    pub time_hours: f64,
    /// Speed made good after current (kn).
    pub speed_over_ground_kts: f64,
    /// Brake power as a fraction of MCR.
    pub engine_load: f64,
    pub fuel_breakdown: FuelBreakdown,
    pub resistance_breakdown_kn: ResistanceBreakdown,
}

/// Fuel model for one vessel.
///
/// Cheap to clone; the consumption curve is shared.
#[derive(Clone)]
pub struct VesselModel {
    specs: VesselSpecs,
    factors: CalibrationFactors,
    curve: Arc<dyn ConsumptionCurve>,
}

impl fmt::Debug for VesselModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VesselModel")
            .field("specs", &self.specs)
            .field("factors", &self.factors)
            .field("curve", &self.curve.name())
            .finish()
    }
}

impl Default for VesselModel {
    fn default() -> Self {
        Self {
            specs: VesselSpecs::default(),
            factors: CalibrationFactors::default(),
            curve: Arc::new(LinearLoadCurve),
        }
    }
}

impl VesselModel {
    /// Build a model with unit calibration and the linear consumption curve.
    pub fn new(specs: VesselSpecs) -> Result<Self> {
        specs.validate()?;
        Ok(Self {
            specs,
            ..Self::default()
        })
    }

    pub fn with_calibration(mut self, factors: CalibrationFactors) -> Result<Self> {
        factors.validate()?;
        self.factors = factors;
        Ok(self)
    }

    pub fn with_curve(mut self, curve: Arc<dyn ConsumptionCurve>) -> Self {
        self.curve = curve;
        self
    }

    pub fn specs(&self) -> &VesselSpecs {
        &self.specs
    }

    pub fn factors(&self) -> CalibrationFactors {
        self.factors
    }

    pub fn curve_name(&self) -> &'static str {
        self.curve.name()
    }

    /// Calibrated resistance terms at `speed_kts` through the water.
    pub fn resistance_kn(
        &self,
        speed_kts: f64,
        is_laden: bool,
        conditions: Option<&LegConditions>,
    ) -> Result<ResistanceBreakdown> {
        validate_speed(speed_kts)?;
        if let Some(conditions) = conditions {
            validate_conditions(conditions)?;
        }
        Ok(self.resistance_unchecked(speed_kts, is_laden, conditions))
    }

    /// Fuel, power and time for a leg of `distance_nm` at `speed_kts` through the water.
    ///
    /// `conditions` of `None` means calm water and no current.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] when speed is not positive, distance is negative, or a
    /// value is not finite.
    ///
    /// # Examples
    /// ```
    /// use windmar_lib::vessel::VesselModel;
    ///
    /// let model = VesselModel::default();
    /// let leg = model.fuel_for(14.5, true, None, 348.0).unwrap();
    /// assert!((leg.time_hours - 24.0).abs() < 1e-9);
    /// assert!(leg.fuel_mt > 15.0 && leg.fuel_mt < 45.0);
    /// ```
    pub fn fuel_for(
        &self,
        speed_kts: f64,
        is_laden: bool,
        conditions: Option<&LegConditions>,
        distance_nm: f64,
    ) -> Result<FuelEstimate> {
        validate_speed(speed_kts)?;
        if !distance_nm.is_finite() || distance_nm < 0.0 {
            return Err(Error::invalid(format!(
                "distance_nm must be finite and non-negative, got {distance_nm}"
            )));
        }
        if let Some(conditions) = conditions {
            validate_conditions(conditions)?;
        }

        let resistance = self.resistance_unchecked(speed_kts, is_laden, conditions);
        let power_kw = resistance.total * speed_kts * KNOTS_TO_MS / PROPULSIVE_EFFICIENCY;
        let burn_rate = self.curve.burn_rate_t_per_h(power_kw, &self.specs);

        let sog = speed_over_ground(speed_kts, conditions);
        let time_hours = distance_nm / sog;
        let fuel_mt = burn_rate * time_hours;

        let share = |term: f64| {
            if resistance.total > 0.0 {
                fuel_mt * term / resistance.total
            } else {
                0.0
            }
        };
        let calm = share(resistance.calm_water);
        let wind = share(resistance.wind);
        // Remainder keeps the breakdown summing exactly.
        let wave = if resistance.waves > 0.0 {
            fuel_mt - calm - wind
        } else {
            0.0
        };

        Ok(FuelEstimate {
            fuel_mt,
            power_kw,
            time_hours,
            speed_over_ground_kts: sog,
            engine_load: power_kw / self.specs.mcr_kw,
            fuel_breakdown: FuelBreakdown { calm, wind, wave },
            resistance_breakdown_kn: resistance,
        })
    }

    /// Lowest fuel per nautical mile any weather could produce at `speed_kts`.
    ///
    /// Uses the strongest permitted wind assist, no waves and the strongest permitted
    /// favourable current.
    pub fn min_fuel_per_nm(&self, speed_kts: f64, is_laden: bool) -> Result<f64> {
        validate_speed(speed_kts)?;
        let calm = self.calm_water_kn(speed_kts, is_laden) * self.factors.calm_water;
        let floor_resistance = calm * (1.0 - MAX_WIND_ASSIST);
        let power_kw = floor_resistance * speed_kts * KNOTS_TO_MS / PROPULSIVE_EFFICIENCY;
        let burn_rate = self.curve.burn_rate_t_per_h(power_kw, &self.specs);
        Ok(burn_rate / (speed_kts * (1.0 + MAX_CURRENT_FRACTION)))
    }

    fn resistance_unchecked(
        &self,
        speed_kts: f64,
        is_laden: bool,
        conditions: Option<&LegConditions>,
    ) -> ResistanceBreakdown {
        let calm = self.calm_water_kn(speed_kts, is_laden) * self.factors.calm_water;
        let (wind, wave) = match conditions {
            Some(conditions) => (
                self.wind_kn(speed_kts, is_laden, conditions) * self.factors.wind,
                self.wave_kn(is_laden, conditions) * self.factors.waves,
            ),
            None => (0.0, 0.0),
        };
        let wind = wind.max(-MAX_WIND_ASSIST * calm);

        ResistanceBreakdown {
            calm_water: calm,
            wind,
            waves: wave,
            total: calm + wind + wave,
        }
    }

    fn calm_water_kn(&self, speed_kts: f64, is_laden: bool) -> f64 {
        let hull = self.specs.hull(is_laden);
        let v = speed_kts * KNOTS_TO_MS;
        let length = self.specs.loa;

        let reynolds = (v * length / KINEMATIC_VISCOSITY).max(1.0e5);
        let friction = 0.075 / (reynolds.log10() - 2.0).powi(2);
        let froude = v / (GRAVITY * length).sqrt();
        let residuary = RESIDUARY_COEFFICIENT * (froude / REFERENCE_FROUDE).powf(RESIDUARY_EXPONENT);

        let coefficient = friction * (1.0 + FORM_FACTOR) + residuary;
        0.5 * SEAWATER_DENSITY * hull.wetted_surface_m2 * v * v * coefficient / 1000.0
    }

    fn wind_kn(&self, speed_kts: f64, is_laden: bool, conditions: &LegConditions) -> f64 {
        let weather = &conditions.weather;
        if weather.wind_speed_ms <= 0.0 {
            return 0.0;
        }
        let hull = self.specs.hull(is_laden);
        let ship = speed_kts * KNOTS_TO_MS;
        let relative = (weather.wind_dir_deg - conditions.heading_deg).to_radians();

        let along = ship + weather.wind_speed_ms * relative.cos();
        let across = weather.wind_speed_ms * relative.sin();
        let apparent = along.hypot(across);

        // Drag from apparent wind less the still-air drag already in the calm term.
        0.5 * AIR_DENSITY
            * WIND_DRAG_COEFFICIENT
            * hull.windage_area_m2
            * (apparent * along - ship * ship)
            / 1000.0
    }

    fn wave_kn(&self, is_laden: bool, conditions: &LegConditions) -> f64 {
        let weather = &conditions.weather;
        let height = weather.wave_height_m;
        if height <= 0.0 {
            return 0.0;
        }
        let hull = self.specs.hull(is_laden);
        let encounter = (weather.wave_dir_deg - conditions.heading_deg).to_radians();
        let direction_factor = (1.0 + encounter.cos()) / 2.0;
        let period_factor = match weather.wave_period_s {
            Some(period) => {
                let wavelength = GRAVITY * period * period / (2.0 * PI);
                let ratio = (wavelength / self.specs.loa).ln();
                0.5 + 0.5 * (-ratio * ratio).exp()
            }
            None => 1.0,
        };

        WAVE_RESISTANCE_COEFFICIENT
            * SEAWATER_DENSITY
            * GRAVITY
            * height
            * height
            * self.specs.beam
            * self.specs.beam
            * hull.block_coefficient
            / self.specs.loa
            * direction_factor
            * period_factor
            / 1000.0
    }
}

/// Speed over ground after the along-track current component.
fn speed_over_ground(speed_kts: f64, conditions: Option<&LegConditions>) -> f64 {
    let Some(conditions) = conditions else {
        return speed_kts;
    };
    let Some(current) = conditions.weather.current else {
        return speed_kts;
    };
    let angle = (current.dir_deg - conditions.heading_deg).to_radians();
    let along_kts = current.speed_ms * angle.cos() / KNOTS_TO_MS;
    let limit = MAX_CURRENT_FRACTION * speed_kts;
    speed_kts + along_kts.clamp(-limit, limit)
}

fn validate_speed(speed_kts: f64) -> Result<()> {
    if !speed_kts.is_finite() || speed_kts <= 0.0 {
        return Err(Error::invalid(format!(
            "speed must be finite and positive, got {speed_kts}"
        )));
    }
    Ok(())
}

fn validate_conditions(conditions: &LegConditions) -> Result<()> {
    if !conditions.heading_deg.is_finite() {
        return Err(Error::invalid("heading must be finite"));
    }
    conditions.weather.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn head_on(weather: WeatherSample) -> LegConditions {
        LegConditions::new(0.0, weather)
    }

    #[test]
    fn calm_laden_service_speed_is_plausible() {
        let model = VesselModel::default();
        let leg = model.fuel_for(14.5, true, None, 348.0).expect("valid leg");
        assert!((leg.time_hours - 24.0).abs() < 1e-9);
        assert!(leg.power_kw > 4_000.0 && leg.power_kw < 8_840.0, "{}", leg.power_kw);
        assert!(leg.fuel_mt > 20.0 && leg.fuel_mt < 35.0, "{}", leg.fuel_mt);
        assert_eq!(leg.resistance_breakdown_kn.wind, 0.0);
        assert_eq!(leg.resistance_breakdown_kn.waves, 0.0);
    }

    #[test]
    fn zero_distance_burns_nothing() {
        let leg = VesselModel::default()
            .fuel_for(12.0, false, None, 0.0)
            .expect("zero distance is valid");
        assert_eq!(leg.fuel_mt, 0.0);
        assert_eq!(leg.time_hours, 0.0);
    }

    #[test]
    fn rejects_bad_speed_and_distance() {
        let model = VesselModel::default();
        let err = model.fuel_for(0.0, true, None, 10.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(model.fuel_for(-3.0, true, None, 10.0).is_err());
        assert!(model.fuel_for(12.0, true, None, -1.0).is_err());
        assert!(model.fuel_for(f64::NAN, true, None, 1.0).is_err());
    }

    #[test]
    fn head_wind_costs_more_than_calm() {
        let model = VesselModel::default();
        let calm = model.fuel_for(14.5, true, None, 348.0).expect("calm");
        let windy = head_on(WeatherSample::calm().with_wind(10.0, 0.0));
        let head = model
            .fuel_for(14.5, true, Some(&windy), 348.0)
            .expect("head wind");
        assert!(head.fuel_mt > calm.fuel_mt);
        assert!(head.resistance_breakdown_kn.wind > 0.0);
    }

    #[test]
    fn following_wind_assist_is_bounded() {
        let model = VesselModel::default();
        let gale_astern = head_on(WeatherSample::calm().with_wind(40.0, 180.0));
        let resistance = model
            .resistance_kn(14.5, true, Some(&gale_astern))
            .expect("valid");
        assert!(resistance.wind < 0.0);
        assert!(resistance.wind >= -MAX_WIND_ASSIST * resistance.calm_water - 1e-9);
        assert!(resistance.total > 0.0);
    }

    #[test]
    fn fuel_rises_with_speed() {
        let model = VesselModel::default();
        let mut previous = 0.0;
        for speed in [8.0, 10.0, 12.0, 14.0, 16.0] {
            let leg = model.fuel_for(speed, true, None, 100.0).expect("valid");
            assert!(leg.fuel_mt > previous);
            previous = leg.fuel_mt;
        }
    }

    #[test]
    fn breakdown_sums_to_total() {
        let model = VesselModel::default();
        let rough = head_on(
            WeatherSample::calm()
                .with_wind(12.5, 20.0)
                .with_waves(3.0, Some(8.0), 10.0),
        );
        let leg = model.fuel_for(13.0, true, Some(&rough), 200.0).expect("valid");
        let parts = leg.fuel_breakdown;
        assert!((parts.calm + parts.wind + parts.wave - leg.fuel_mt).abs() < 1e-9);
        assert!(parts.wave > 0.0);
    }

    #[test]
    fn beam_seas_add_less_than_head_seas() {
        let model = VesselModel::default();
        let head = head_on(WeatherSample::calm().with_waves(3.0, None, 0.0));
        let beam = head_on(WeatherSample::calm().with_waves(3.0, None, 90.0));
        let following = head_on(WeatherSample::calm().with_waves(3.0, None, 180.0));
        let r = |c: &LegConditions| model.resistance_kn(14.0, true, Some(c)).expect("valid").waves;
        assert!(r(&head) > r(&beam));
        assert!(r(&beam) > r(&following));
        assert!(r(&following).abs() < 1e-9);
    }

    #[test]
    fn current_changes_time_not_power() {
        let model = VesselModel::default();
        let fair = head_on(WeatherSample::calm().with_current(1.0, 0.0));
        let foul = head_on(WeatherSample::calm().with_current(1.0, 180.0));
        let calm = model.fuel_for(12.0, true, None, 120.0).expect("calm");
        let with_fair = model.fuel_for(12.0, true, Some(&fair), 120.0).expect("fair");
        let with_foul = model.fuel_for(12.0, true, Some(&foul), 120.0).expect("foul");
        assert_eq!(with_fair.power_kw, calm.power_kw);
        assert!(with_fair.time_hours < calm.time_hours);
        assert!(with_foul.time_hours > calm.time_hours);
    }

    #[test]
    fn current_is_clamped() {
        let model = VesselModel::default();
        let torrent = head_on(WeatherSample::calm().with_current(20.0, 0.0));
        let leg = model.fuel_for(10.0, true, Some(&torrent), 100.0).expect("valid");
        assert!((leg.speed_over_ground_kts - 12.5).abs() < 1e-9);
    }

    #[test]
    fn min_fuel_per_nm_is_a_floor() {
        let model = VesselModel::default();
        let floor = model.min_fuel_per_nm(14.5, true).expect("valid");
        let conditions = [
            WeatherSample::calm(),
            WeatherSample::calm().with_wind(40.0, 180.0).with_current(10.0, 0.0),
            WeatherSample::calm().with_wind(15.0, 90.0),
            WeatherSample::calm().with_waves(4.0, Some(9.0), 30.0),
        ];
        for weather in conditions {
            let leg = model
                .fuel_for(14.5, true, Some(&head_on(weather)), 10.0)
                .expect("valid");
            assert!(leg.fuel_mt / 10.0 >= floor - 1e-12);
        }
    }

    #[test]
    fn calibration_scales_terms() {
        let model = VesselModel::default()
            .with_calibration(CalibrationFactors::new(1.2, 1.0, 1.0))
            .expect("valid factors");
        let base = VesselModel::default()
            .resistance_kn(14.0, true, None)
            .expect("valid");
        let scaled = model.resistance_kn(14.0, true, None).expect("valid");
        assert!((scaled.calm_water - 1.2 * base.calm_water).abs() < 1e-9);
    }
}
