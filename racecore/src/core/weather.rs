use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Clear,
    Cloudy,
    LightRain,
    HeavyRain,
    Fog,
    NightClear,
    NightRain,
}

/// Weather conditions of a single race instance.
/// * `grip` - Multiplier on available tire grip (1.0 = dry)
/// * `visibility` - Multiplier on visibility (1.0 = clear daylight)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub kind: WeatherKind,
    pub grip: f64,
    pub visibility: f64,
}

impl WeatherKind {
    pub const ALL: [WeatherKind; 7] = [
        WeatherKind::Clear,
        WeatherKind::Cloudy,
        WeatherKind::LightRain,
        WeatherKind::HeavyRain,
        WeatherKind::Fog,
        WeatherKind::NightClear,
        WeatherKind::NightRain,
    ];

    /// snapshot returns the fixed grip and visibility values of the weather kind.
    pub fn snapshot(self) -> WeatherSnapshot {
        let (grip, visibility) = match self {
            WeatherKind::Clear => (1.0, 1.0),
            WeatherKind::Cloudy => (1.0, 0.95),
            WeatherKind::LightRain => (0.85, 0.8),
            WeatherKind::HeavyRain => (0.7, 0.6),
            WeatherKind::Fog => (0.95, 0.5),
            WeatherKind::NightClear => (0.95, 0.7),
            WeatherKind::NightRain => (0.65, 0.4),
        };

        WeatherSnapshot {
            kind: self,
            grip,
            visibility,
        }
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            WeatherKind::Clear => "clear",
            WeatherKind::Cloudy => "cloudy",
            WeatherKind::LightRain => "light rain",
            WeatherKind::HeavyRain => "heavy rain",
            WeatherKind::Fog => "fog",
            WeatherKind::NightClear => "clear night",
            WeatherKind::NightRain => "rainy night",
        };
        write!(f, "{}", s)
    }
}

/// draw_weather draws one entry of the weather table, all entries being equally likely.
pub fn draw_weather<R: Rng + ?Sized>(rng: &mut R) -> WeatherSnapshot {
    let idx = rng.gen_range(0..WeatherKind::ALL.len());
    WeatherKind::ALL[idx].snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn table_values() {
        let s = WeatherKind::HeavyRain.snapshot();
        assert_eq!((s.grip, s.visibility), (0.7, 0.6));
        let s = WeatherKind::NightRain.snapshot();
        assert_eq!((s.grip, s.visibility), (0.65, 0.4));

        for kind in WeatherKind::ALL {
            let s = kind.snapshot();
            assert!(s.grip > 0.0 && s.grip <= 1.0);
            assert!(s.visibility > 0.0 && s.visibility <= 1.0);
        }
    }

    #[test]
    fn draw_is_reproducible() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(draw_weather(&mut rng1), draw_weather(&mut rng2));
        }
    }

    #[test]
    fn draw_covers_whole_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<WeatherKind, u32> = HashMap::new();
        for _ in 0..7000 {
            *counts.entry(draw_weather(&mut rng).kind).or_insert(0) += 1;
        }

        assert_eq!(counts.len(), 7);
        for count in counts.values() {
            // expected 1000 per kind
            assert!(*count > 800 && *count < 1200, "count {}", count);
        }
    }
}
