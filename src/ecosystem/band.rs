/// Population and presentation of a level, keyed by how far it sits from the
/// player: `offset = player_level - index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandProfile {
    pub max_population: usize,
    pub speed_modifier: f64,
    pub alpha: f64,
    /// Background blur strength for the renderer. `None` renders sharp.
    pub blur: Option<f64>,
}

/// Lowest populated offset: three levels above the player.
pub const LOWEST_OFFSET: i64 = -3;
/// Highest populated offset: the player's prey.
pub const HIGHEST_OFFSET: i64 = 1;

const fn band(max_population: usize, speed_modifier: f64, alpha: f64, blur: Option<f64>) -> BandProfile {
    BandProfile {
        max_population,
        speed_modifier,
        alpha,
        blur,
    }
}

const BANDS: [BandProfile; 5] = [
    band(1, 0.3, 0.5, Some(4.0)),
    band(3, 0.6, 0.8, Some(2.0)),
    band(10, 1.0, 1.0, None),
    band(5, 1.0, 1.0, None),
    band(20, 1.0, 1.0, None),
];

pub fn band_offset(player_level: u32, index: u32) -> i64 {
    player_level as i64 - index as i64
}

impl BandProfile {
    /// Profile for `offset`, or `None` when the level should not exist.
    pub fn for_offset(offset: i64) -> Option<Self> {
        if !(LOWEST_OFFSET..=HIGHEST_OFFSET).contains(&offset) {
            return None;
        }
        BANDS.get((offset - LOWEST_OFFSET) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table() {
        let far = BandProfile::for_offset(-3).unwrap();
        assert_eq!(far.max_population, 1);
        assert_eq!(far.speed_modifier, 0.3);
        assert_eq!(far.alpha, 0.5);
        assert_eq!(far.blur, Some(4.0));

        assert_eq!(BandProfile::for_offset(-2).unwrap().max_population, 3);
        assert_eq!(BandProfile::for_offset(-1).unwrap().max_population, 10);
        assert_eq!(BandProfile::for_offset(0).unwrap().max_population, 5);
        let prey = BandProfile::for_offset(1).unwrap();
        assert_eq!(prey.max_population, 20);
        assert_eq!(prey.blur, None);
    }

    #[test]
    fn outside_band() {
        assert!(BandProfile::for_offset(2).is_none());
        assert!(BandProfile::for_offset(-4).is_none());
        assert_eq!(band_offset(1, 4), -3);
        assert_eq!(band_offset(5, 4), 1);
    }
}
