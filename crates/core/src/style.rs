use serde::{Deserialize, Serialize};

/// Play style inferred from the request text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Aggressive,
    Defensive,
    Combo,
    LoreRace,
    #[default]
    Balanced,
}

const AGGRESSIVE_WORDS: &[&str] = &[
    "aggro", "aggressive", "rush", "fast", "tempo", "challenge", "attack", "damage", "banish",
];
const DEFENSIVE_WORDS: &[&str] = &[
    "control", "defensive", "defense", "bodyguard", "ward", "resist", "heal", "removal", "slow",
];
const COMBO_WORDS: &[&str] = &[
    "combo", "engine", "synergy", "song", "songs", "sing", "draw", "shift", "loop",
];
const LORE_WORDS: &[&str] = &["lore", "quest", "questing", "race", "racing", "support", "location"];

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Aggressive,
        Style::Defensive,
        Style::Combo,
        Style::LoreRace,
        Style::Balanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Defensive => "defensive",
            Self::Combo => "combo",
            Self::LoreRace => "lore_race",
            Self::Balanced => "balanced",
        }
    }

    fn bucket(self) -> &'static [&'static str] {
        match self {
            Self::Aggressive => AGGRESSIVE_WORDS,
            Self::Defensive => DEFENSIVE_WORDS,
            Self::Combo => COMBO_WORDS,
            Self::LoreRace => LORE_WORDS,
            Self::Balanced => &[],
        }
    }

    /// Picks the bucket with the most word hits. Ties go to the earlier
    /// bucket; no hits means balanced.
    pub fn detect(request: &str) -> Self {
        let words: Vec<String> = request
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| word.to_lowercase())
            .collect();
        let mut best = (Self::Balanced, 0usize);
        for style in Self::ALL {
            let hits = words
                .iter()
                .filter(|word| style.bucket().contains(&word.as_str()))
                .count();
            if hits > best.1 {
                best = (style, hits);
            }
        }
        best.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_dominant_bucket() {
        assert_eq!(Style::detect("Fast aggro Ruby rush deck"), Style::Aggressive);
        assert_eq!(Style::detect("control deck with bodyguard"), Style::Defensive);
        assert_eq!(Style::detect("quest for lore, race to 20"), Style::LoreRace);
        assert_eq!(Style::detect("song engine"), Style::Combo);
    }

    #[test]
    fn defaults_to_balanced() {
        assert_eq!(Style::detect("pirates and princesses"), Style::Balanced);
        assert_eq!(Style::detect(""), Style::Balanced);
    }

    #[test]
    fn ties_prefer_earlier_bucket() {
        assert_eq!(Style::detect("rush control"), Style::Aggressive);
    }
}
