use crate::core::car::{Car, CarId, CarPars};
use crate::core::matchmaking::Garage;
use crate::core::race::SimConstants;
use crate::core::route::{Route, RoutePars};
use anyhow::Context;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::path::Path;

/// Scenario is used to store everything a simulation run needs besides the constants.
/// * `player_car` - Id of the car racing against the matched opponents
/// * `cars` - All registered cars, the player car included
/// * `pool` - Ids of the cars available as opponents (all registered cars if empty)
/// * `routes` - Routes, in the order of the season rotation
/// * `seed` - Seed of the random number generator (overridden by the command line)
#[derive(Debug, Deserialize, Clone)]
pub struct Scenario {
    pub player_car: CarId,
    pub cars: Vec<CarPars>,
    #[serde(default)]
    pub pool: Vec<CarId>,
    pub routes: Vec<RoutePars>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn read_json_file<T: DeserializeOwned>(filepath: &Path, file_kind: &str) -> anyhow::Result<T> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open {} file {}!",
            file_kind,
            filepath.display()
        ))?;
    let pars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse {} file {}!",
        file_kind,
        filepath.display()
    ))?;
    Ok(pars)
}

/// read_scenario reads the JSON file and decodes it into the scenario struct.
pub fn read_scenario(filepath: &Path) -> anyhow::Result<Scenario> {
    read_json_file(filepath, "scenario")
}

/// read_sim_constants reads race time coefficients, event probabilities, matchmaking
/// parameters and the points table. Missing entries keep their default values.
pub fn read_sim_constants(filepath: &Path) -> anyhow::Result<SimConstants> {
    let sim_consts: SimConstants = read_json_file(filepath, "simulation constants")?;
    check_sim_constants(&sim_consts).context(format!(
        "Invalid simulation constants in {}!",
        filepath.display()
    ))?;
    Ok(sim_consts)
}

/// check_sim_constants rejects coefficients that would break the race time model. The time
/// floor must stay below the cruise time, otherwise it swallows checkpoint bonuses.
pub fn check_sim_constants(sim_consts: &SimConstants) -> anyhow::Result<()> {
    if !(0.0..1.0).contains(&sim_consts.min_time_fraction) {
        anyhow::bail!(
            "min_time_fraction must be in [0, 1), got {}",
            sim_consts.min_time_fraction
        );
    }
    for (name, value) in [
        ("launch_coeff", sim_consts.launch_coeff),
        ("corner_coeff", sim_consts.corner_coeff),
        ("brake_coeff", sim_consts.brake_coeff),
        ("nitrous_bonus", sim_consts.nitrous_bonus),
    ] {
        if !value.is_finite() || value < 0.0 {
            anyhow::bail!("{} must be non-negative, got {}", name, value);
        }
    }
    Ok(())
}

impl Scenario {
    /// build_garages returns the registry of all cars and the garage serving as matchmaking
    /// pool.
    pub fn build_garages(&self) -> anyhow::Result<(Garage, Garage)> {
        let mut seen = BTreeSet::new();
        let mut cars = Vec::with_capacity(self.cars.len());

        for car_pars in self.cars.iter() {
            if !seen.insert(car_pars.id) {
                anyhow::bail!("Car id {} is used more than once!", car_pars.id);
            }
            let car = Car::new(car_pars).context(format!(
                "Invalid parameters for car {} ({} {})!",
                car_pars.id, car_pars.make, car_pars.model
            ))?;
            cars.push(car);
        }

        if !seen.contains(&self.player_car) {
            anyhow::bail!("Player car {} is not part of the scenario cars!", self.player_car);
        }
        if let Some(id) = self.pool.iter().find(|id| !seen.contains(id)) {
            anyhow::bail!("Pool car {} is not part of the scenario cars!", id);
        }

        let pool: Vec<Car> = if self.pool.is_empty() {
            cars.to_owned()
        } else {
            cars.iter()
                .filter(|car| self.pool.contains(&car.id))
                .cloned()
                .collect()
        };

        Ok((Garage::new(cars), Garage::new(pool)))
    }

    /// build_routes generates every route of the scenario, in file order.
    pub fn build_routes<R: Rng + ?Sized>(&self, rng: &mut R) -> anyhow::Result<Vec<Route>> {
        if self.routes.is_empty() {
            anyhow::bail!("Scenario does not contain any route!");
        }
        let mut seen = BTreeSet::new();
        if let Some(route_pars) = self.routes.iter().find(|r| !seen.insert(r.id)) {
            anyhow::bail!("Route id {} is used more than once!", route_pars.id);
        }

        self.routes
            .iter()
            .map(|route_pars| {
                Route::new(route_pars, rng)
                    .context(format!("Invalid parameters for route {}!", route_pars.name))
            })
            .collect()
    }
}
