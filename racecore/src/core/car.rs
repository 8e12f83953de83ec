use crate::core::class::{classify, CarClass};
use crate::core::error::SimError;
use crate::core::race::Race;
use serde::{Deserialize, Serialize};

pub type CarId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suspension {
    #[default]
    Stock,
    Sport,
    Racing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tires {
    #[default]
    Street,
    Sport,
    Racing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aero {
    #[default]
    Stock,
    Spoiler,
    Racing,
}

/// Fitted customizations. Every axis is a closed set, a fresh car is fully stock.
/// * `turbo` - Turbocharger fitted
/// * `nitrous` - Nitrous kit fitted (one boost per race)
/// * `suspension` - Suspension setup
/// * `tires` - Tire compound
/// * `aero` - Aero package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Customizations {
    pub turbo: bool,
    pub nitrous: bool,
    pub suspension: Suspension,
    pub tires: Tires,
    pub aero: Aero,
}

/// Cumulative race statistics of a car.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarStats {
    pub wins: u32,
    pub losses: u32,
    pub best_time: Option<f64>,
    pub total_races: u32,
}

impl CarStats {
    /// record applies the result of a finished race to the statistics of car `car_id`. Races
    /// the car did not take part in are ignored and false is returned.
    pub fn record(&mut self, race: &Race, car_id: CarId) -> bool {
        let time = match race.time_of(car_id) {
            Some(t) => t,
            None => return false,
        };

        self.total_races += 1;
        if race.winner() == car_id {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.best_time = Some(match self.best_time {
            Some(best) if best <= time => best,
            _ => time,
        });

        true
    }
}

/// * `id` - Car id, unique within the registry
/// * `make` - Manufacturer, e.g. Subaru
/// * `model` - Model, e.g. Impreza WRX STI
/// * `year` - Model year
/// * `horsepower` - (hp) Engine power
/// * `torque` - (Nm) Engine torque
/// * `weight` - (kg) Curb weight
/// * `customizations` - Fitted customizations (stock if omitted)
/// * `skill_rating` - Skill rating of the driver/car combination, used for matchmaking only
/// * `stats` - Cumulative statistics (zero if omitted)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CarPars {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub horsepower: f64,
    pub torque: f64,
    pub weight: f64,
    #[serde(default)]
    pub customizations: Customizations,
    #[serde(default = "default_skill_rating")]
    pub skill_rating: f64,
    #[serde(default)]
    pub stats: CarStats,
}

fn default_skill_rating() -> f64 {
    1000.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: u16,
    horsepower: f64,
    pub torque: f64,
    weight: f64,
    class: CarClass,
    pub customizations: Customizations,
    pub skill_rating: f64,
    pub stats: CarStats,
}

impl Car {
    pub fn new(car_pars: &CarPars) -> Result<Car, SimError> {
        check_power(car_pars.horsepower)?;
        let class = classify(car_pars.horsepower, car_pars.weight)?;

        Ok(Car {
            id: car_pars.id,
            make: car_pars.make.to_owned(),
            model: car_pars.model.to_owned(),
            year: car_pars.year,
            horsepower: car_pars.horsepower,
            torque: car_pars.torque,
            weight: car_pars.weight,
            class,
            customizations: car_pars.customizations,
            skill_rating: car_pars.skill_rating,
            stats: car_pars.stats.to_owned(),
        })
    }

    pub fn horsepower(&self) -> f64 {
        self.horsepower
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn class(&self) -> CarClass {
        self.class
    }

    /// retune changes power and weight of the car. The class is derived again from the new
    /// values; on error the car is left untouched.
    pub fn retune(&mut self, horsepower: f64, weight: f64) -> Result<(), SimError> {
        check_power(horsepower)?;
        self.class = classify(horsepower, weight)?;
        self.horsepower = horsepower;
        self.weight = weight;
        Ok(())
    }
}

fn check_power(horsepower: f64) -> Result<(), SimError> {
    if horsepower.is_finite() && horsepower > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidCar(format!(
            "horsepower must be positive, got {}",
            horsepower
        )))
    }
}
