use crate::core::car::{Car, CarId, CarPars, CarStats, Customizations};
use crate::core::class::CarClass;
use crate::core::error::SimError;
use crate::core::route::Route;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Synthesized AI opponents use ids counting down from here, one per class.
pub const AI_ID_BASE: CarId = u32::MAX;

const AI_WEIGHT: f64 = 1300.0;

/// * `max_skill_gap` - Candidates must be strictly closer than this in skill rating
/// * `allow_ai_opponents` - Synthesize an AI opponent if no candidate qualifies
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MatchmakingPars {
    pub max_skill_gap: f64,
    pub allow_ai_opponents: bool,
}

impl Default for MatchmakingPars {
    fn default() -> Self {
        MatchmakingPars {
            max_skill_gap: 200.0,
            allow_ai_opponents: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Opponent {
    /// A car from the matchmaking pool.
    Driver(Car),
    /// A synthesized opponent of the requested class.
    Ai(Car),
}

impl Opponent {
    pub fn car(&self) -> &Car {
        match self {
            Opponent::Driver(car) | Opponent::Ai(car) => car,
        }
    }

    pub fn into_car(self) -> Car {
        match self {
            Opponent::Driver(car) | Opponent::Ai(car) => car,
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Opponent::Ai(_))
    }
}

/// Lookup of cars by id, e.g. the garages of all registered drivers.
pub trait CarRegistry {
    fn get_car(&self, id: CarId) -> Option<&Car>;
}

/// Provides the candidate opponents for a class on a route.
pub trait PoolProvider {
    fn pool(&self, class: CarClass, route: &Route) -> Vec<Car>;
}

/// Simple in-memory registry holding every known car. Its pool is every car of the requested
/// class, independent of the route.
#[derive(Debug, Clone, Default)]
pub struct Garage {
    cars: Vec<Car>,
}

impl Garage {
    pub fn new(cars: Vec<Car>) -> Garage {
        Garage { cars }
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn get_car_mut(&mut self, id: CarId) -> Option<&mut Car> {
        self.cars.iter_mut().find(|car| car.id == id)
    }
}

impl CarRegistry for Garage {
    fn get_car(&self, id: CarId) -> Option<&Car> {
        self.cars.iter().find(|car| car.id == id)
    }
}

impl PoolProvider for Garage {
    fn pool(&self, class: CarClass, _route: &Route) -> Vec<Car> {
        self.cars
            .iter()
            .filter(|car| car.class() == class)
            .cloned()
            .collect()
    }
}

/// ai_opponent returns the AI opponent of a class. The same class always yields the same car.
pub fn ai_opponent(class: CarClass) -> Result<Car, SimError> {
    let rank = class.rank();
    let pars = CarPars {
        id: AI_ID_BASE - rank,
        make: "AI".to_owned(),
        model: format!("Street Phantom {}", class),
        year: 2024,
        horsepower: class.typical_power_to_weight() * AI_WEIGHT / 1000.0,
        torque: class.typical_power_to_weight() * AI_WEIGHT / 1000.0 * 1.2,
        weight: AI_WEIGHT,
        customizations: Customizations::default(),
        skill_rating: 1000.0 + 150.0 * rank as f64,
        stats: CarStats::default(),
    };

    Car::new(&pars)
}

/// find_match selects the opponent for `car` from `pool`. Only cars of the same class whose
/// skill rating is closer than the configured gap qualify; the closest one wins, ties going
/// to the lowest id. Without a qualifying candidate an AI opponent of the class is returned,
/// or `ExhaustedPool` if AI opponents are disabled.
pub fn find_match(
    car: &Car,
    route: &Route,
    pool: &[Car],
    mm_pars: &MatchmakingPars,
) -> Result<Opponent, SimError> {
    let skill_gap = |other: &Car| (other.skill_rating - car.skill_rating).abs();

    let best = pool
        .iter()
        .filter(|other| {
            other.id != car.id
                && other.class() == car.class()
                && skill_gap(*other) < mm_pars.max_skill_gap
        })
        .min_by(|a, b| {
            skill_gap(*a)
                .total_cmp(&skill_gap(*b))
                .then_with(|| a.id.cmp(&b.id))
        });

    match best {
        Some(opponent) => {
            debug!(
                car = car.id,
                opponent = opponent.id,
                route = %route.name,
                skill_gap = skill_gap(opponent),
                "matched pool opponent"
            );
            Ok(Opponent::Driver(opponent.to_owned()))
        }
        None if mm_pars.allow_ai_opponents => {
            debug!(car = car.id, class = %car.class(), route = %route.name, "no pool opponent, using AI");
            Ok(Opponent::Ai(ai_opponent(car.class())?))
        }
        None => Err(SimError::ExhaustedPool {
            car_id: car.id,
            class: car.class(),
        }),
    }
}

/// find_match_by_id resolves the car through the registry and its pool through the provider
/// before matching.
pub fn find_match_by_id<G, P>(
    registry: &G,
    provider: &P,
    car_id: CarId,
    route: &Route,
    mm_pars: &MatchmakingPars,
) -> Result<Opponent, SimError>
where
    G: CarRegistry + ?Sized,
    P: PoolProvider + ?Sized,
{
    let car = registry
        .get_car(car_id)
        .ok_or_else(|| SimError::unknown("car", car_id))?;
    let pool = provider.pool(car.class(), route);
    find_match(car, route, &pool, mm_pars)
}
