use crate::core::car::CarId;
use crate::core::error::SimError;
use crate::core::race::Race;
use crate::core::route::{Route, RouteId};
use chrono::{DateTime, Utc};
use helpers::general::{add_days, next_saturday, season_label};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

pub const DEFAULT_ROUND_COUNT: u32 = 8;

/// Days between two rounds.
pub const ROUND_INTERVAL_DAYS: i64 = 14;

/// Maps a finishing position (1-based) to championship points.
pub trait ScoringTable {
    fn points_for_placement(&self, placement: usize) -> u32;
}

/// Points per finishing position, first entry for the winner. Positions beyond the table
/// score nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointsTable(pub Vec<u32>);

impl Default for PointsTable {
    fn default() -> Self {
        PointsTable(vec![25, 18, 15, 12, 10, 8, 6, 4, 2, 1])
    }
}

impl ScoringTable for PointsTable {
    fn points_for_placement(&self, placement: usize) -> u32 {
        placement
            .checked_sub(1)
            .and_then(|idx| self.0.get(idx))
            .copied()
            .unwrap_or(0)
    }
}

/// Prize money paid out on the final standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTable {
    pub first: u64,
    pub second: u64,
    pub third: u64,
    pub participation: u64,
}

impl Default for PrizeTable {
    fn default() -> Self {
        PrizeTable {
            first: 1_000_000,
            second: 500_000,
            third: 250_000,
            participation: 50_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChampionshipStatus {
    Upcoming,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRef {
    pub id: RouteId,
    pub name: String,
}

/// * `number` - Round number, starting at 1
/// * `route` - Route raced in this round
/// * `date` - Scheduled start
/// * `multiplier` - Points multiplier (2 for the final rounds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionshipRound {
    pub number: u32,
    pub route: RouteRef,
    pub date: DateTime<Utc>,
    pub multiplier: u32,
    completed: bool,
}

impl ChampionshipRound {
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Championship {
    pub id: u32,
    pub name: String,
    pub season: String,
    pub prizes: PrizeTable,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    rounds: Vec<ChampionshipRound>,
    standings: BTreeMap<CarId, u32>,
    status: ChampionshipStatus,
}

/// round_multiplier returns the points multiplier of round `idx` (0-based). The second half
/// of the season, rounded down, scores double: rounds 4 to 7 of an 8 round season.
pub fn round_multiplier(idx: u32, round_count: u32) -> u32 {
    let first_double = round_count - round_count / 2;
    if idx >= first_double {
        2
    } else {
        1
    }
}

/// build_season schedules `round_count` rounds, assigning the routes of the rotation in turn.
/// The first round takes place on the next Saturday after `now`, the following ones every
/// two weeks.
pub fn build_season(
    id: u32,
    name: &str,
    route_rotation: &[Route],
    round_count: u32,
    now: DateTime<Utc>,
) -> Result<Championship, SimError> {
    if route_rotation.is_empty() {
        return Err(SimError::InvalidSeason(
            "route rotation must contain at least one route".to_owned(),
        ));
    }
    if round_count == 0 {
        return Err(SimError::InvalidSeason(
            "a season needs at least one round".to_owned(),
        ));
    }

    let first_date = next_saturday(now);
    let rounds: Vec<ChampionshipRound> = (0..round_count)
        .map(|i| {
            let route = &route_rotation[i as usize % route_rotation.len()];
            ChampionshipRound {
                number: i + 1,
                route: RouteRef {
                    id: route.id,
                    name: route.name.to_owned(),
                },
                date: add_days(first_date, i as i64 * ROUND_INTERVAL_DAYS),
                multiplier: round_multiplier(i, round_count),
                completed: false,
            }
        })
        .collect();

    let end_date = rounds.last().map_or(first_date, |round| round.date);

    Ok(Championship {
        id,
        name: name.to_owned(),
        season: season_label(now),
        prizes: PrizeTable::default(),
        start_date: first_date,
        end_date,
        rounds,
        standings: BTreeMap::new(),
        status: ChampionshipStatus::Upcoming,
    })
}

impl Championship {
    pub fn rounds(&self) -> &[ChampionshipRound] {
        &self.rounds
    }

    pub fn standings(&self) -> &BTreeMap<CarId, u32> {
        &self.standings
    }

    pub fn points_of(&self, car_id: CarId) -> u32 {
        self.standings.get(&car_id).copied().unwrap_or(0)
    }

    pub fn status(&self) -> ChampionshipStatus {
        self.status
    }

    /// next_round returns index and round of the first round not yet completed.
    pub fn next_round(&self) -> Option<(usize, &ChampionshipRound)> {
        self.rounds.iter().enumerate().find(|(_, r)| !r.completed)
    }

    /// record_placements completes round `idx` with the given finishing order (winner first).
    /// Every round can be completed exactly once and every car placed at most once; otherwise
    /// the standings stay untouched. Points saturate at `u32::MAX`.
    pub fn record_placements<S: ScoringTable + ?Sized>(
        &mut self,
        idx: usize,
        placements: &[CarId],
        scoring: &S,
    ) -> Result<(), SimError> {
        let round = self
            .rounds
            .get_mut(idx)
            .ok_or_else(|| SimError::unknown("round", idx))?;
        if round.completed {
            return Err(SimError::RoundAlreadyCompleted(round.number));
        }
        let mut seen = BTreeSet::new();
        if let Some(car_id) = placements.iter().find(|car_id| !seen.insert(**car_id)) {
            return Err(SimError::InvalidSeason(format!(
                "car {} is placed more than once in round {}",
                car_id, round.number
            )));
        }

        for (pos, car_id) in placements.iter().enumerate() {
            let points = round
                .multiplier
                .saturating_mul(scoring.points_for_placement(pos + 1));
            let total = self.standings.entry(*car_id).or_insert(0);
            *total = total.saturating_add(points);
        }
        round.completed = true;

        info!(
            championship = self.id,
            round = round.number,
            multiplier = round.multiplier,
            "round completed"
        );

        self.status = if self.rounds.iter().all(|r| r.completed) {
            ChampionshipStatus::Completed
        } else {
            ChampionshipStatus::Active
        };

        Ok(())
    }

    /// complete_round scores a simulated race for round `idx`. The race must have been run on
    /// the route of the round.
    pub fn complete_round<S: ScoringTable + ?Sized>(
        &mut self,
        idx: usize,
        race: &Race,
        scoring: &S,
    ) -> Result<(), SimError> {
        let round = self
            .rounds
            .get(idx)
            .ok_or_else(|| SimError::unknown("round", idx))?;
        if race.route_id() != round.route.id {
            return Err(SimError::InvalidSeason(format!(
                "round {} is held on route {}, but the race was run on route {}",
                round.number,
                round.route.id,
                race.route_id()
            )));
        }

        self.record_placements(idx, &race.placements(), scoring)
    }

    /// leaderboard returns the standings ordered by points, equal points ordered by car id.
    pub fn leaderboard(&self) -> Vec<(CarId, u32)> {
        let mut board: Vec<(CarId, u32)> = self.standings.iter().map(|(&id, &p)| (id, p)).collect();
        board.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        board
    }

    /// prize_for returns the prize money of a car once the season is completed. Every car in
    /// the standings outside the top three receives the participation prize.
    pub fn prize_for(&self, car_id: CarId) -> Option<u64> {
        if self.status != ChampionshipStatus::Completed {
            return None;
        }

        let pos = self.leaderboard().iter().position(|(id, _)| *id == car_id)?;
        Some(match pos {
            0 => self.prizes.first,
            1 => self.prizes.second,
            2 => self.prizes.third,
            _ => self.prizes.participation,
        })
    }
}
