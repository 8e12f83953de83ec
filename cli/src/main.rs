use chrono::Utc;
use clap::Parser;
use racecore::core::car::CarId;
use racecore::core::handle_race::{apply_stats, handle_race, handle_season};
use racecore::core::matchmaking::{CarRegistry, Garage};
use racecore::core::race::SimConstants;
use racecore::post::race_result::{
    entrant_labels, print_standings, print_win_rates, write_race_results_csv,
    write_standings_csv,
};
use racecore::pre::read_sim_pars::{read_scenario, read_sim_constants};
use racecore::pre::sim_opts::SimOpts;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CHAMPIONSHIP_NAME: &str = "Nairobi Street Kings Championship";

fn init_logging(sim_opts: &SimOpts) {
    // per race logging drowns batch runs
    let default_filter = if sim_opts.debug {
        "debug"
    } else if !sim_opts.season && sim_opts.no_sim_runs > 1 {
        "info,racecore=warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn log_player_stats(garage: &Garage, player_car: CarId) {
    if let Some(player) = garage.get_car(player_car) {
        info!(
            wins = player.stats.wins,
            losses = player.stats.losses,
            races = player.stats.total_races,
            best_time = ?player.stats.best_time,
            "Player car statistics"
        );
    }
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    init_logging(&sim_opts);

    // get scenario and simulation constants
    info!("Reading scenario from {}", sim_opts.parfile_path.display());
    let scenario = read_scenario(&sim_opts.parfile_path)?;
    let sim_consts = match &sim_opts.constants_path {
        Some(constants_path) => {
            info!("Reading simulation constants from {}", constants_path.display());
            read_sim_constants(constants_path)?
        }
        None => SimConstants::default(),
    };

    // command line seed wins over the scenario seed, a random one is logged for reruns
    let seed = sim_opts
        .seed
        .or(scenario.seed)
        .unwrap_or_else(rand::random::<u64>);
    info!(seed, "Seeding random number generators");

    let (mut garage, pool) = scenario.build_garages()?;
    let routes = scenario.build_routes(&mut StdRng::seed_from_u64(seed))?;
    let now = Utc::now();

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();

    if sim_opts.season {
        info!(
            "Simulating a {} round season on {} routes",
            sim_opts.rounds,
            routes.len()
        );
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        let season = handle_season(
            &mut garage,
            &pool,
            scenario.player_car,
            &routes,
            CHAMPIONSHIP_NAME,
            sim_opts.rounds,
            now,
            &sim_consts,
            &mut rng,
        )?;
        info!("Execution time: {}ms", t_start.elapsed().as_millis());

        // POST-PROCESSING -------------------------------------------------------------------------
        for race_result in season.race_results.iter() {
            race_result.print_race_result();
        }
        let labels = entrant_labels(&season.race_results);
        print_standings(&season.championship, &labels);

        log_player_stats(&garage, scenario.player_car);
        if let Some(output) = &sim_opts.output {
            write_standings_csv(&season.championship, &labels, output)?;
            info!("Standings written to {}", output.display());
        }
    } else {
        if sim_opts.no_sim_runs == 0 {
            anyhow::bail!("Number of simulation runs must be at least 1!");
        }
        info!(
            "Simulating {} race(s) for car {}",
            sim_opts.no_sim_runs, scenario.player_car
        );

        // every run gets its own generator, the routes are raced in turn
        let race_results = (0..sim_opts.no_sim_runs)
            .into_par_iter()
            .map(|run| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1 + run as u64));
                let route = &routes[run as usize % routes.len()];
                handle_race(
                    &garage,
                    &pool,
                    scenario.player_car,
                    route,
                    now,
                    &sim_consts,
                    &mut rng,
                )
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        info!("Execution time: {}ms", t_start.elapsed().as_millis());

        // POST-PROCESSING -------------------------------------------------------------------------
        for race_result in race_results.iter() {
            apply_stats(&mut garage, race_result);
        }
        if race_results.len() == 1 {
            race_results[0].print_race_result();
        } else {
            print_win_rates(&race_results);
        }
        log_player_stats(&garage, scenario.player_car);

        if let Some(output) = &sim_opts.output {
            write_race_results_csv(&race_results, output)?;
            info!("Race results written to {}", output.display());
        }
    }

    Ok(())
}
