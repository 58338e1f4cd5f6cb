use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const DEFAULT_MAX_COPIES: u32 = 4;

/// Deck color. Declaration order is the canonical order used for every
/// tie-break.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ink {
    Amber,
    Amethyst,
    Emerald,
    Ruby,
    Sapphire,
    Steel,
}

impl Ink {
    pub const ALL: [Ink; 6] = [
        Ink::Amber,
        Ink::Amethyst,
        Ink::Emerald,
        Ink::Ruby,
        Ink::Sapphire,
        Ink::Steel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Amber => "Amber",
            Self::Amethyst => "Amethyst",
            Self::Emerald => "Emerald",
            Self::Ruby => "Ruby",
            Self::Sapphire => "Sapphire",
            Self::Steel => "Steel",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|ink| ink.name().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for Ink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The 1-2 inks a deck is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(Vec<Ink>);

impl Identity {
    /// Builds an identity from up to two inks, deduplicated and kept in
    /// canonical order. Returns `None` for an empty list.
    pub fn new(inks: impl IntoIterator<Item = Ink>) -> Option<Self> {
        let unique: BTreeSet<Ink> = inks.into_iter().collect();
        let inks: Vec<Ink> = unique.into_iter().take(2).collect();
        if inks.is_empty() {
            None
        } else {
            Some(Self(inks))
        }
    }

    pub fn inks(&self) -> &[Ink] {
        &self.0
    }

    pub fn contains(&self, ink: Ink) -> bool {
        self.0.contains(&ink)
    }

    pub fn allows(&self, card: &CardCandidate) -> bool {
        !card.inks.is_empty() && card.inks.iter().all(|ink| self.contains(*ink))
    }

    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|ink| ink.name())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Core,
    Infinity,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Infinity => "infinity",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "core" | "standard" => Some(Self::Core),
            "infinity" | "eternal" => Some(Self::Infinity),
            _ => None,
        }
    }
}

/// Date-bounded legality of a card in one format. A missing bound is
/// unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatWindow {
    pub format: Format,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub until: Option<NaiveDate>,
}

impl FormatWindow {
    pub fn unbounded(format: Format) -> Self {
        Self {
            format,
            from: None,
            until: None,
        }
    }

    pub fn covers(&self, format: Format, on: NaiveDate) -> bool {
        self.format == format
            && self.from.map_or(true, |from| from <= on)
            && self.until.map_or(true, |until| on <= until)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCandidate {
    pub name: String,
    #[serde(default)]
    pub cost: Option<u32>,
    pub inks: BTreeSet<Ink>,
    #[serde(default)]
    pub inkable: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub subtypes: BTreeSet<String>,
    #[serde(default = "default_max_copies")]
    pub max_copies: u32,
    #[serde(default)]
    pub link: Option<String>,
    /// `None` means no legality data, so the search-side format filter is
    /// trusted as is. `Some` with no covering window means not legal.
    #[serde(default)]
    pub legality: Option<Vec<FormatWindow>>,
}

fn default_max_copies() -> u32 {
    DEFAULT_MAX_COPIES
}

impl CardCandidate {
    pub fn new(name: impl Into<String>, cost: Option<u32>, inks: &[Ink]) -> Self {
        Self {
            name: name.into(),
            cost,
            inks: inks.iter().copied().collect(),
            inkable: false,
            text: String::new(),
            subtypes: BTreeSet::new(),
            max_copies: DEFAULT_MAX_COPIES,
            link: None,
            legality: None,
        }
    }

    pub fn with_inkable(mut self, inkable: bool) -> Self {
        self.inkable = inkable;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes = subtypes.iter().map(|value| value.to_string()).collect();
        self
    }

    pub fn with_max_copies(mut self, max_copies: u32) -> Self {
        self.max_copies = max_copies.max(1);
        self
    }

    /// Uncosted cards sort and bucket as cost 0.
    pub fn effective_cost(&self) -> u32 {
        self.cost.unwrap_or(0)
    }

    pub fn is_legal_in(&self, format: Format, on: NaiveDate) -> bool {
        match &self.legality {
            None => true,
            Some(windows) => windows.iter().any(|window| window.covers(format, on)),
        }
    }

    pub fn ink_label(&self) -> String {
        self.inks
            .iter()
            .map(|ink| ink.name())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Keeps the first occurrence of every name, preserving order.
pub fn dedupe_by_name(cards: impl IntoIterator<Item = CardCandidate>) -> Vec<CardCandidate> {
    let mut seen = std::collections::HashSet::new();
    cards
        .into_iter()
        .filter(|card| seen.insert(card.name.clone()))
        .collect()
}

/// Cards allowed by the identity and legal in the format on the given date.
pub fn filter_legal(
    pool: &[CardCandidate],
    identity: &Identity,
    format: Format,
    on: NaiveDate,
) -> Vec<CardCandidate> {
    pool.iter()
        .filter(|card| identity.allows(card) && card.is_legal_in(format, on))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn ink_names_parse_case_insensitively() {
        assert_eq!(Ink::from_name(" ruby "), Some(Ink::Ruby));
        assert_eq!(Ink::from_name("STEEL"), Some(Ink::Steel));
        assert_eq!(Ink::from_name("purple"), None);
    }

    #[test]
    fn identity_keeps_two_canonical_inks() {
        let identity = Identity::new([Ink::Steel, Ink::Amber, Ink::Ruby]).expect("identity");
        assert_eq!(identity.inks(), &[Ink::Amber, Ink::Ruby]);
        assert!(Identity::new([]).is_none());
    }

    #[test]
    fn identity_rejects_cards_outside_it() {
        let identity = Identity::new([Ink::Ruby, Ink::Steel]).expect("identity");
        let dual = CardCandidate::new("Dual", Some(3), &[Ink::Ruby, Ink::Steel]);
        let split = CardCandidate::new("Split", Some(3), &[Ink::Ruby, Ink::Amber]);
        let colorless = CardCandidate::new("Colorless", Some(3), &[]);
        assert!(identity.allows(&dual));
        assert!(!identity.allows(&split));
        assert!(!identity.allows(&colorless));
    }

    #[test]
    fn legality_windows_treat_missing_bounds_as_open() {
        let mut card = CardCandidate::new("Rotating", Some(2), &[Ink::Amber]);
        card.legality = Some(vec![FormatWindow {
            format: Format::Core,
            from: Some(date(2024, 1, 1)),
            until: None,
        }]);
        assert!(card.is_legal_in(Format::Core, date(2030, 1, 1)));
        assert!(!card.is_legal_in(Format::Core, date(2023, 12, 31)));
        assert!(!card.is_legal_in(Format::Infinity, date(2025, 1, 1)));
    }

    #[test]
    fn empty_legality_data_is_not_legal_anywhere() {
        let mut card = CardCandidate::new("Banned", Some(2), &[Ink::Amber]);
        assert!(card.is_legal_in(Format::Core, date(2025, 1, 1)));
        card.legality = Some(Vec::new());
        assert!(!card.is_legal_in(Format::Core, date(2025, 1, 1)));
        assert!(!card.is_legal_in(Format::Infinity, date(2025, 1, 1)));
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let first = CardCandidate::new("Same", Some(1), &[Ink::Amber]);
        let second = CardCandidate::new("Same", Some(7), &[Ink::Ruby]);
        let merged = dedupe_by_name(vec![first.clone(), second]);
        assert_eq!(merged, vec![first]);
    }
}
