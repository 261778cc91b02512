//! Consolidation flag.

use crate::ids::ConsolidationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether figures are reported for the group or the parent entity alone.
///
/// The two ids are fixed in storage: consolidated is 1, unconsolidated is 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consolidation {
    /// Group accounts
    Consolidated,

    /// Parent entity accounts (also called standalone)
    #[default]
    Unconsolidated,
}

impl Consolidation {
    /// Returns both flags in id order.
    pub const fn all() -> [Self; 2] {
        [Self::Consolidated, Self::Unconsolidated]
    }

    /// Returns the stored id.
    pub const fn id(&self) -> ConsolidationId {
        match self {
            Self::Consolidated => ConsolidationId(1),
            Self::Unconsolidated => ConsolidationId(2),
        }
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Consolidated => "Consolidated",
            Self::Unconsolidated => "Unconsolidated",
        }
    }

    /// Look up a flag from its stored id.
    pub const fn from_id(id: ConsolidationId) -> Option<Self> {
        match id.0 {
            1 => Some(Self::Consolidated),
            2 => Some(Self::Unconsolidated),
            _ => None,
        }
    }

    /// Interpret a free-text consolidation phrase.
    ///
    /// A phrase containing the word "consolidated" ("Consolidated basis",
    /// "group consolidated") selects group accounts unless it is negated
    /// ("non-consolidated", "not consolidated"). Anything else, including
    /// "standalone" and "unconsolidated", selects the default.
    pub fn parse_phrase(phrase: &str) -> Self {
        let phrase = phrase.to_lowercase();
        let words: Vec<&str> = phrase
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let negated = words
            .windows(2)
            .any(|pair| matches!(pair, ["non" | "not", "consolidated"]));
        if !negated && words.contains(&"consolidated") {
            Self::Consolidated
        } else {
            Self::Unconsolidated
        }
    }
}

impl fmt::Display for Consolidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
