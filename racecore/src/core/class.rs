use crate::core::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Competitive tier of a car, ordered from slowest (D) to fastest (S+).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CarClass {
    D,
    C,
    B,
    A,
    S,
    #[serde(rename = "S+")]
    SPlus,
}

impl CarClass {
    pub const ALL: [CarClass; 6] = [
        CarClass::D,
        CarClass::C,
        CarClass::B,
        CarClass::A,
        CarClass::S,
        CarClass::SPlus,
    ];

    /// rank returns the position of the class in the ordering, D being 0.
    pub fn rank(self) -> u32 {
        self as u32
    }

    /// Power-to-weight ratio (hp per tonne) that sits well inside the class band. Used to
    /// synthesize representative cars.
    pub fn typical_power_to_weight(self) -> f64 {
        match self {
            CarClass::D => 80.0,
            CarClass::C => 125.0,
            CarClass::B => 175.0,
            CarClass::A => 225.0,
            CarClass::S => 275.0,
            CarClass::SPlus => 350.0,
        }
    }
}

impl fmt::Display for CarClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CarClass::D => "D",
            CarClass::C => "C",
            CarClass::B => "B",
            CarClass::A => "A",
            CarClass::S => "S",
            CarClass::SPlus => "S+",
        };
        write!(f, "{}", s)
    }
}

/// power_to_weight returns horsepower per tonne.
pub fn power_to_weight(horsepower: f64, weight: f64) -> Result<f64, SimError> {
    if !horsepower.is_finite() || !weight.is_finite() {
        return Err(SimError::InvalidCar(format!(
            "horsepower ({}) and weight ({}) must be finite",
            horsepower, weight
        )));
    }
    if weight <= 0.0 {
        return Err(SimError::InvalidCar(format!(
            "weight must be positive, got {}",
            weight
        )));
    }

    Ok(horsepower / (weight / 1000.0))
}

/// classify derives the competitive class from the power-to-weight ratio. Thresholds are
/// exclusive and checked from the top, i.e. exactly 300 hp/t is S and not S+.
pub fn classify(horsepower: f64, weight: f64) -> Result<CarClass, SimError> {
    let r = power_to_weight(horsepower, weight)?;

    let class = if r > 300.0 {
        CarClass::SPlus
    } else if r > 250.0 {
        CarClass::S
    } else if r > 200.0 {
        CarClass::A
    } else if r > 150.0 {
        CarClass::B
    } else if r > 100.0 {
        CarClass::C
    } else {
        CarClass::D
    };

    Ok(class)
}
