use crate::core::error::SimError;
use crate::core::weather::{WeatherKind, WeatherSnapshot};
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

pub type RouteId = u32;

/// Distance (km) covered by one checkpoint segment.
pub const CHECKPOINT_SPACING: f64 = 2.0;

/// Upper bound (exclusive) of the bonus time (s) a checkpoint can award.
pub const MAX_CHECKPOINT_BONUS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    fn technical_base(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 2.0,
            Difficulty::Hard => 3.0,
            Difficulty::Extreme => 4.0,
        }
    }

    /// Expected number of hazards per km.
    fn hazard_rate(self) -> f64 {
        match self {
            Difficulty::Easy => 0.15,
            Difficulty::Medium => 0.3,
            Difficulty::Hard => 0.5,
            Difficulty::Extreme => 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Urban,
    Highway,
    Mountain,
    Industrial,
}

impl Terrain {
    fn technical_factor(self) -> f64 {
        match self {
            Terrain::Highway => 0.8,
            Terrain::Urban => 1.0,
            Terrain::Industrial => 1.1,
            Terrain::Mountain => 1.4,
        }
    }

    fn hazard_factor(self) -> f64 {
        match self {
            Terrain::Highway => 0.7,
            Terrain::Urban => 1.2,
            Terrain::Industrial => 1.0,
            Terrain::Mountain => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    #[default]
    Asphalt,
    Concrete,
    Gravel,
    Cobblestone,
}

impl Surface {
    fn technical_factor(self) -> f64 {
        match self {
            Surface::Asphalt => 1.0,
            Surface::Concrete => 1.05,
            Surface::Cobblestone => 1.2,
            Surface::Gravel => 1.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    Checkpoint,
    Finish,
}

/// * `id` - 1-based index along the route
/// * `distance` - (km) Position from the start
/// * `bonus_time` - (s) Time a car can gain by hitting the checkpoint cleanly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    pub distance: f64,
    pub kind: CheckpointKind,
    pub bonus_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Pothole,
    Traffic,
    Roadworks,
    Debris,
    PoliceCheckpoint,
    Flooding,
}

impl HazardKind {
    pub const ALL: [HazardKind; 6] = [
        HazardKind::Pothole,
        HazardKind::Traffic,
        HazardKind::Roadworks,
        HazardKind::Debris,
        HazardKind::PoliceCheckpoint,
        HazardKind::Flooding,
    ];

    /// (s) Range [min, max) of the time penalty for running into the hazard.
    pub fn penalty_range(self) -> (f64, f64) {
        match self {
            HazardKind::Pothole => (0.5, 1.5),
            HazardKind::Traffic => (1.0, 4.0),
            HazardKind::Roadworks => (2.0, 5.0),
            HazardKind::Debris => (0.5, 2.0),
            HazardKind::PoliceCheckpoint => (3.0, 6.0),
            HazardKind::Flooding => (2.0, 4.5),
        }
    }
}

/// * `id` - 1-based index along the route
/// * `distance` - (km) Position from the start
/// * `penalty` - (s) Time lost when a car runs into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub distance: f64,
    pub kind: HazardKind,
    pub penalty: f64,
}

/// * `id` - Route id
/// * `name` - Route name, e.g. Uhuru Highway Sprint
/// * `distance` - (km) Route length, must be positive
/// * `max_speed` - (km/h) Highest speed reachable on the route
/// * `difficulty` - Difficulty rating, drives technical rating and hazard density
/// * `terrain` - Terrain type
/// * `braking_zones` - Number of heavy braking zones
/// * `elevation` - (m) Elevation change over the route
/// * `surface` - Road surface
/// * `weather` - Pinned weather; if absent a fresh draw is made for every race
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutePars {
    pub id: RouteId,
    pub name: String,
    pub distance: f64,
    pub max_speed: f64,
    pub difficulty: Difficulty,
    pub terrain: Terrain,
    #[serde(default = "default_braking_zones")]
    pub braking_zones: u32,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub weather: Option<WeatherKind>,
}

fn default_braking_zones() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub distance: f64,
    pub max_speed: f64,
    pub difficulty: Difficulty,
    pub terrain: Terrain,
    pub technical_rating: f64,
    pub braking_zones: u32,
    pub elevation: f64,
    pub surface: Surface,
    pub weather: Option<WeatherSnapshot>,
    pub checkpoints: Vec<Checkpoint>,
    pub hazards: Vec<Hazard>,
}

impl Route {
    /// new builds the route and generates its checkpoints and hazards.
    pub fn new<R: Rng + ?Sized>(route_pars: &RoutePars, rng: &mut R) -> Result<Route, SimError> {
        if !route_pars.distance.is_finite() || route_pars.distance <= 0.0 {
            return Err(SimError::InvalidRoute(format!(
                "route {} must have a positive distance, got {}",
                route_pars.id, route_pars.distance
            )));
        }
        if !route_pars.max_speed.is_finite() || route_pars.max_speed <= 0.0 {
            return Err(SimError::InvalidRoute(format!(
                "route {} must have a positive max speed, got {}",
                route_pars.id, route_pars.max_speed
            )));
        }

        let checkpoints = generate_checkpoints(route_pars.distance, rng);
        let hazards = generate_hazards(route_pars, rng)?;

        Ok(Route {
            id: route_pars.id,
            name: route_pars.name.to_owned(),
            distance: route_pars.distance,
            max_speed: route_pars.max_speed,
            difficulty: route_pars.difficulty,
            terrain: route_pars.terrain,
            technical_rating: calc_technical_rating(route_pars),
            braking_zones: route_pars.braking_zones,
            elevation: route_pars.elevation,
            surface: route_pars.surface,
            weather: route_pars.weather.map(WeatherKind::snapshot),
            checkpoints,
            hazards,
        })
    }

    pub fn finish(&self) -> Option<&Checkpoint> {
        self.checkpoints
            .last()
            .filter(|cp| cp.kind == CheckpointKind::Finish)
    }
}

/// calc_technical_rating rates how demanding the route is to drive:
///
/// difficulty base * terrain factor + |elevation| / 500 + 0.1 * braking zones, scaled by the
/// surface factor. The result is never negative.
pub fn calc_technical_rating(route_pars: &RoutePars) -> f64 {
    let rating = route_pars.difficulty.technical_base() * route_pars.terrain.technical_factor()
        + route_pars.elevation.abs() / 500.0
        + 0.1 * route_pars.braking_zones as f64;

    (rating * route_pars.surface.technical_factor()).max(0.0)
}

/// generate_checkpoints splits the route into floor(distance / 2) equal segments. The last
/// checkpoint is the finish. Routes shorter than one segment get no checkpoints at all.
pub fn generate_checkpoints<R: Rng + ?Sized>(distance: f64, rng: &mut R) -> Vec<Checkpoint> {
    let no_checkpoints = (distance / CHECKPOINT_SPACING).floor() as u32;
    let segment = distance / no_checkpoints.max(1) as f64;

    (0..no_checkpoints)
        .map(|i| Checkpoint {
            id: i + 1,
            distance: (i + 1) as f64 * segment,
            kind: if i == no_checkpoints - 1 {
                CheckpointKind::Finish
            } else {
                CheckpointKind::Checkpoint
            },
            bonus_time: rng.gen_range(0.0..MAX_CHECKPOINT_BONUS),
        })
        .collect()
}

/// generate_hazards scatters hazards over the route. The number of hazards is Poisson
/// distributed with a mean that grows with distance, difficulty and terrain.
pub fn generate_hazards<R: Rng + ?Sized>(
    route_pars: &RoutePars,
    rng: &mut R,
) -> Result<Vec<Hazard>, SimError> {
    let lambda = route_pars.distance
        * route_pars.difficulty.hazard_rate()
        * route_pars.terrain.hazard_factor();
    let poisson = Poisson::new(lambda).map_err(|e| {
        SimError::InvalidRoute(format!(
            "cannot generate hazards for route {}: {}",
            route_pars.id, e
        ))
    })?;
    let no_hazards = poisson.sample(rng) as usize;

    let mut hazards: Vec<Hazard> = (0..no_hazards)
        .map(|_| {
            let kind = HazardKind::ALL[rng.gen_range(0..HazardKind::ALL.len())];
            let (p_min, p_max) = kind.penalty_range();
            Hazard {
                id: 0,
                distance: rng.gen_range(0.0..route_pars.distance),
                kind,
                penalty: rng.gen_range(p_min..p_max),
            }
        })
        .collect();

    hazards.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    for (i, hazard) in hazards.iter_mut().enumerate() {
        hazard.id = i as u32 + 1;
    }

    Ok(hazards)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn route_pars(id: RouteId, distance: f64) -> RoutePars {
        RoutePars {
            id,
            name: format!("Route {}", id),
            distance,
            max_speed: 220.0,
            difficulty: Difficulty::Medium,
            terrain: Terrain::Urban,
            braking_zones: 5,
            elevation: 0.0,
            surface: Surface::Asphalt,
            weather: None,
        }
    }

    pub(crate) fn test_route(id: RouteId, distance: f64) -> Route {
        let mut rng = StdRng::seed_from_u64(id as u64);
        Route::new(&route_pars(id, distance), &mut rng).unwrap()
    }

    #[test]
    fn checkpoints_split_distance() {
        let mut rng = StdRng::seed_from_u64(1);
        let cps = generate_checkpoints(10.0, &mut rng);

        assert_eq!(cps.len(), 5);
        for (i, cp) in cps.iter().enumerate() {
            assert_eq!(cp.id, i as u32 + 1);
            assert_relative_eq!(cp.distance, 2.0 * (i + 1) as f64);
            assert!(cp.bonus_time >= 0.0 && cp.bonus_time < MAX_CHECKPOINT_BONUS);
        }
        assert!(cps[..4].iter().all(|cp| cp.kind == CheckpointKind::Checkpoint));
        assert_eq!(cps[4].kind, CheckpointKind::Finish);
    }

    #[test]
    fn checkpoints_on_uneven_distance() {
        let mut rng = StdRng::seed_from_u64(1);
        let cps = generate_checkpoints(5.0, &mut rng);

        assert_eq!(cps.len(), 2);
        assert_relative_eq!(cps[0].distance, 2.5);
        assert_relative_eq!(cps[1].distance, 5.0);
        assert_eq!(cps[1].kind, CheckpointKind::Finish);
    }

    #[test]
    fn short_route_has_no_checkpoints() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_checkpoints(1.9, &mut rng).is_empty());

        let route = Route::new(&route_pars(3, 1.5), &mut rng).unwrap();
        assert!(route.checkpoints.is_empty());
        assert!(route.finish().is_none());
    }

    #[test]
    fn rejects_non_positive_distance() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            Route::new(&route_pars(1, 0.0), &mut rng),
            Err(SimError::InvalidRoute(_))
        ));
        assert!(matches!(
            Route::new(&route_pars(1, -3.0), &mut rng),
            Err(SimError::InvalidRoute(_))
        ));
    }

    #[test]
    fn technical_rating() {
        let mut pars = route_pars(1, 10.0);
        // medium (2) * urban (1.0) + 0 + 0.5
        assert_relative_eq!(calc_technical_rating(&pars), 2.5);

        pars.difficulty = Difficulty::Extreme;
        pars.terrain = Terrain::Mountain;
        pars.elevation = -250.0;
        pars.surface = Surface::Gravel;
        assert_relative_eq!(calc_technical_rating(&pars), (4.0 * 1.4 + 0.5 + 0.5) * 1.3);
    }

    #[test]
    fn hazards_are_sorted_and_in_range() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut pars = route_pars(1, 40.0);
        pars.difficulty = Difficulty::Extreme;
        let hazards = generate_hazards(&pars, &mut rng).unwrap();

        assert!(!hazards.is_empty());
        for (i, h) in hazards.iter().enumerate() {
            assert_eq!(h.id, i as u32 + 1);
            assert!(h.distance >= 0.0 && h.distance < 40.0);
            let (p_min, p_max) = h.kind.penalty_range();
            assert!(h.penalty >= p_min && h.penalty < p_max);
        }
        assert!(hazards.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn hazard_count_scales_with_difficulty() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut easy = route_pars(1, 20.0);
        easy.difficulty = Difficulty::Easy;
        easy.terrain = Terrain::Highway;
        let mut extreme = route_pars(2, 20.0);
        extreme.difficulty = Difficulty::Extreme;
        extreme.terrain = Terrain::Mountain;

        let mut n_easy = 0;
        let mut n_extreme = 0;
        for _ in 0..200 {
            n_easy += generate_hazards(&easy, &mut rng).unwrap().len();
            n_extreme += generate_hazards(&extreme, &mut rng).unwrap().len();
        }

        // means are 2.1 and 20.8 hazards per route
        assert!(n_extreme > 5 * n_easy);
    }

    #[test]
    fn pinned_weather_is_kept() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pars = route_pars(1, 8.0);
        pars.weather = Some(WeatherKind::Fog);
        let route = Route::new(&pars, &mut rng).unwrap();
        assert_eq!(route.weather, Some(WeatherKind::Fog.snapshot()));
    }

    #[test]
    fn pars_defaults() {
        let json = r#"{
            "id": 4, "name": "Thika Road Night Run", "distance": 12.0, "max_speed": 240,
            "difficulty": "hard", "terrain": "highway"
        }"#;
        let pars: RoutePars = serde_json::from_str(json).unwrap();
        assert_eq!(pars.braking_zones, 5);
        assert_eq!(pars.surface, Surface::Asphalt);
        assert_eq!(pars.elevation, 0.0);
        assert!(pars.weather.is_none());
    }
}
