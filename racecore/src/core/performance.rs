use crate::core::car::{Car, Customizations, Suspension, Tires};
use crate::core::error::SimError;
use crate::core::route::Route;
use crate::core::weather::WeatherSnapshot;
use serde::Serialize;

/// Vehicle capability on a given route, independent of the weather. Larger is better for all
/// four figures.
/// * `acceleration` - hp/kg based launch capability
/// * `top_speed` - (km/h) Reachable top speed
/// * `handling` - Cornering capability on the technical sections of the route
/// * `braking` - Braking capability over the braking zones of the route
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceProfile {
    pub acceleration: f64,
    pub top_speed: f64,
    pub handling: f64,
    pub braking: f64,
}

/// Per-axis multipliers resulting from the fitted customizations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modifiers {
    pub acceleration: f64,
    pub top_speed: f64,
    pub handling: f64,
    pub braking: f64,
}

impl Modifiers {
    const NEUTRAL: Modifiers = Modifiers {
        acceleration: 1.0,
        top_speed: 1.0,
        handling: 1.0,
        braking: 1.0,
    };

    /// for_customizations collects the multipliers of all fitted parts. Each part contributes
    /// once and the product does not depend on the order in which parts are looked at.
    pub fn for_customizations(c: &Customizations) -> Modifiers {
        let mut m = Modifiers::NEUTRAL;

        if c.turbo {
            m.acceleration *= 1.15;
            m.top_speed *= 1.1;
        }
        if c.suspension == Suspension::Racing {
            m.handling *= 1.2;
        }
        if c.tires == Tires::Racing {
            m.acceleration *= 1.1;
            m.braking *= 1.15;
        }

        m
    }
}

impl PerformanceProfile {
    fn scaled(self, m: &Modifiers) -> PerformanceProfile {
        PerformanceProfile {
            acceleration: self.acceleration * m.acceleration,
            top_speed: self.top_speed * m.top_speed,
            handling: self.handling * m.handling,
            braking: self.braking * m.braking,
        }
    }

    /// in_conditions folds the weather into the profile: grip scales launch, cornering and
    /// braking, visibility limits the usable top speed.
    pub fn in_conditions(&self, weather: &WeatherSnapshot) -> PerformanceProfile {
        PerformanceProfile {
            acceleration: self.acceleration * weather.grip,
            top_speed: self.top_speed * (0.5 + 0.5 * weather.visibility),
            handling: self.handling * weather.grip,
            braking: self.braking * weather.grip,
        }
    }
}

/// base_performance returns the profile of the car without any customizations.
pub fn base_performance(car: &Car, route: &Route) -> Result<PerformanceProfile, SimError> {
    let hp = car.horsepower();
    let weight = car.weight();
    if hp <= 0.0 || weight <= 0.0 {
        return Err(SimError::InvalidCar(format!(
            "car {} has non-positive horsepower or weight",
            car.id
        )));
    }

    Ok(PerformanceProfile {
        acceleration: hp / weight * 10.0,
        top_speed: hp.sqrt() * 15.0,
        handling: (weight / hp) * route.technical_rating,
        braking: weight / 1000.0 * route.braking_zones as f64,
    })
}

/// compute_performance returns the capability of the car on the route including its
/// customizations.
pub fn compute_performance(car: &Car, route: &Route) -> Result<PerformanceProfile, SimError> {
    let base = base_performance(car, route)?;
    Ok(base.scaled(&Modifiers::for_customizations(&car.customizations)))
}
