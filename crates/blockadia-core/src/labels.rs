//! In-world text labels.
//!
//! Short status strings drawn above units, construction sites and buildings.
//! Only these labels follow the `languageChange` command; HUD text is the
//! presentation layer's business.

use blockadia_types::Language;

/// A status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKey {
    /// A villager working a tree.
    Chopping,
    /// A villager working a deposit.
    Mining,
    /// A staffed production building.
    Working,
    /// A construction site or an upgrading building.
    Building,
    /// A building training a unit.
    Training,
}

/// The label text in `language`.
pub const fn text(key: LabelKey, language: Language) -> &'static str {
    match (key, language) {
        (LabelKey::Chopping, Language::En) => "Chopping...",
        (LabelKey::Chopping, Language::Pl) => "Rąbie...",
        (LabelKey::Chopping, Language::De) => "Hackt...",
        (LabelKey::Mining, Language::En) => "Mining...",
        (LabelKey::Mining, Language::Pl) => "Kopie...",
        (LabelKey::Mining, Language::De) => "Baut ab...",
        (LabelKey::Working, Language::En) => "Working...",
        (LabelKey::Working, Language::Pl) => "Pracuje...",
        (LabelKey::Working, Language::De) => "Arbeitet...",
        (LabelKey::Building, Language::En) => "Building...",
        (LabelKey::Building, Language::Pl) => "Budowanie...",
        (LabelKey::Building, Language::De) => "Bauarbeiten...",
        (LabelKey::Training, Language::En) => "Training...",
        (LabelKey::Training, Language::Pl) => "Szkolenie...",
        (LabelKey::Training, Language::De) => "Ausbildung...",
    }
}
