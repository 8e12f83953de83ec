use chrono::{TimeZone, Utc};
use racecore::core::car::{Car, CarPars, CarStats, Customizations};
use racecore::core::championship::{ChampionshipStatus, ScoringTable};
use racecore::core::class::{classify, CarClass};
use racecore::core::handle_race::{handle_race, handle_season};
use racecore::core::matchmaking::{find_match, Garage, MatchmakingPars, Opponent};
use racecore::core::race::{simulate_race, SimConstants};
use racecore::core::route::{Difficulty, Route, RoutePars, Surface, Terrain};
use racecore::pre::read_sim_pars::Scenario;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn car(id: u32, horsepower: f64, weight: f64, skill_rating: f64) -> Car {
    Car::new(&CarPars {
        id,
        make: "Nissan".to_owned(),
        model: format!("Skyline {}", id),
        year: 1999,
        horsepower,
        torque: horsepower * 1.2,
        weight,
        customizations: Customizations::default(),
        skill_rating,
        stats: CarStats::default(),
    })
    .unwrap()
}

fn route(id: u32, terrain: Terrain) -> Route {
    let pars = RoutePars {
        id,
        name: format!("Route {}", id),
        distance: 9.0,
        max_speed: 200.0,
        difficulty: Difficulty::Hard,
        terrain,
        braking_zones: 6,
        elevation: 120.0,
        surface: Surface::Asphalt,
        weather: None,
    };
    Route::new(&pars, &mut StdRng::seed_from_u64(id as u64)).unwrap()
}

#[test]
fn match_then_race() {
    let player = car(1, 230.0, 1000.0, 1500.0);
    let pool = vec![car(2, 240.0, 1000.0, 1650.0), car(3, 215.0, 1000.0, 1450.0)];
    let route = route(1, Terrain::Urban);

    assert_eq!(classify(230.0, 1000.0).unwrap(), CarClass::A);

    let opponent = find_match(&player, &route, &pool, &MatchmakingPars::default()).unwrap();
    assert_eq!(opponent, Opponent::Driver(pool[1].clone()));

    let start = Utc.with_ymd_and_hms(2026, 10, 17, 20, 0, 0).unwrap();
    let consts = SimConstants::default();
    let r1 = simulate_race(
        &player,
        opponent.car(),
        &route,
        start,
        &consts,
        &mut StdRng::seed_from_u64(99),
    )
    .unwrap();
    let r2 = simulate_race(
        opponent.car(),
        &player,
        &route,
        start,
        &consts,
        &mut StdRng::seed_from_u64(99),
    )
    .unwrap();

    assert_eq!(r1.winner(), r2.winner());
    let (t_w, t_l) = (r1.time_of(r1.winner()).unwrap(), r1.time_of(r1.loser()).unwrap());
    assert!(t_w < t_l || (t_w == t_l && r1.winner() < r1.loser()));
}

#[test]
fn season_from_scenario() {
    let scenario: Scenario = serde_json::from_str(
        r#"{
            "player_car": 10,
            "seed": 3,
            "cars": [
                {"id": 10, "make": "Subaru", "model": "Impreza", "year": 2006,
                 "horsepower": 280, "torque": 380, "weight": 1350, "skill_rating": 1300},
                {"id": 11, "make": "Mitsubishi", "model": "Evo IX", "year": 2006,
                 "horsepower": 286, "torque": 392, "weight": 1400, "skill_rating": 1250,
                 "customizations": {"nitrous": true, "tires": "racing"}}
            ],
            "routes": [
                {"id": 1, "name": "Uhuru Highway", "distance": 8.5, "max_speed": 210,
                 "difficulty": "medium", "terrain": "highway"},
                {"id": 2, "name": "Ngong Hills", "distance": 14.0, "max_speed": 160,
                 "difficulty": "extreme", "terrain": "mountain", "surface": "gravel",
                 "weather": "fog"}
            ]
        }"#,
    )
    .unwrap();

    let (mut garage, pool) = scenario.build_garages().unwrap();
    let mut rng = StdRng::seed_from_u64(scenario.seed.unwrap());
    let routes = scenario.build_routes(&mut rng).unwrap();
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap();
    let consts = SimConstants::default();

    let season = handle_season(
        &mut garage,
        &pool,
        scenario.player_car,
        &routes,
        "Nairobi Street Kings Championship",
        8,
        now,
        &consts,
        &mut rng,
    )
    .unwrap();

    let champ = &season.championship;
    assert_eq!(champ.status(), ChampionshipStatus::Completed);
    assert_eq!(champ.rounds().len(), 8);
    assert_eq!(season.race_results.len(), 8);
    assert!(season.race_results.iter().all(|r| !r.opponent_is_ai()));

    // pinned fog on the second route
    for (round, result) in champ.rounds().iter().zip(season.race_results.iter()) {
        assert_eq!(round.route.id, result.race.route_id());
        assert_eq!(result.race.started_at(), round.date);
        if round.route.id == 2 {
            assert_eq!(result.race.weather().kind.to_string(), "fog");
        }
    }

    let table = &consts.points_table;
    let per_round = table.points_for_placement(1) + table.points_for_placement(2);
    let total: u32 = champ.standings().values().sum();
    assert_eq!(total, per_round * (4 + 2 * 4));

    let leader = champ.leaderboard()[0].0;
    assert_eq!(champ.prize_for(leader), Some(champ.prizes.first));

    let player = garage.cars().iter().find(|c| c.id == 10).unwrap();
    assert_eq!(player.stats.total_races, 8);
    assert_eq!(player.stats.wins + player.stats.losses, 8);
}

#[test]
fn lone_car_races_ai() {
    let garage = Garage::new(vec![car(1, 400.0, 1000.0, 2000.0)]);
    let route = route(4, Terrain::Industrial);
    let start = Utc.with_ymd_and_hms(2026, 10, 17, 20, 0, 0).unwrap();

    let result = handle_race(
        &garage,
        &garage,
        1,
        &route,
        start,
        &SimConstants::default(),
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap();

    assert!(result.opponent_is_ai());
    assert_eq!(result.entrants[1].class, CarClass::SPlus);
}

#[test]
fn bundled_input_files_load() {
    use racecore::pre::read_sim_pars::{read_scenario, read_sim_constants};
    use std::path::Path;

    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../input/parameters");
    let scenario = read_scenario(&dir.join("scenario_nairobi.json")).unwrap();
    let consts = read_sim_constants(&dir.join("sim_constants.json")).unwrap();

    assert_eq!(consts, SimConstants::default());
    let (registry, pool) = scenario.build_garages().unwrap();
    assert_eq!(registry.cars().len(), 5);
    assert_eq!(pool.cars().len(), 4);
    let routes = scenario
        .build_routes(&mut StdRng::seed_from_u64(scenario.seed.unwrap()))
        .unwrap();
    assert_eq!(routes.len(), 4);
    assert!(routes.iter().all(|r| r.finish().is_some()));
}
