//! Story fragments, theme packs and the fragment table, with RON loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::core::template::{Template, TemplateError};
use crate::schema::theme::{NarrativeRole, Theme};

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("template error in theme '{theme}': {source}")]
    Template {
        theme: String,
        #[source]
        source: TemplateError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("no built-in theme named '{0}'")]
    UnknownBuiltinTheme(String),
}

/// A templated piece of narrative, tagged by theme and role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryFragment {
    pub theme: Theme,
    pub role: NarrativeRole,
    pub weight: u32,
    pub requires: Vec<String>,
    pub excludes: Vec<String>,
    /// Choice label offered when this resolution is used as a branch.
    pub choice: Option<String>,
    pub template: Template,
}

/// A weighted template used for titles and wisdom gems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub weight: u32,
    pub template: Template,
}

/// Every fragment and extra for a single theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePack {
    pub theme: Theme,
    /// Default text for `{challenge}` when the request gives none.
    pub problem: String,
    pub decision_prompt: Template,
    pub titles: Vec<Alternative>,
    pub fragments: Vec<StoryFragment>,
    pub key_items: Vec<String>,
    pub wisdom_gems: Vec<Alternative>,
}

// RON deserialization helpers. The file shape groups fragments by role,
// so we need intermediate structs.

fn default_weight() -> u32 {
    1
}

fn default_decision_prompt() -> String {
    "What should {child.name} do?".to_string()
}

#[derive(Debug, Deserialize)]
struct RonFragment {
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
    #[serde(default)]
    choice: Option<String>,
    text: String,
}

#[derive(Debug, Deserialize)]
struct RonAlternative {
    #[serde(default = "default_weight")]
    weight: u32,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "ThemePack")]
struct RonThemePack {
    theme: String,
    problem: String,
    #[serde(default = "default_decision_prompt")]
    decision_prompt: String,
    #[serde(default)]
    titles: Vec<RonAlternative>,
    #[serde(default)]
    opening: Vec<RonFragment>,
    #[serde(default)]
    challenge: Vec<RonFragment>,
    #[serde(default)]
    resolution: Vec<RonFragment>,
    #[serde(default)]
    closing: Vec<RonFragment>,
    #[serde(default)]
    key_items: Vec<String>,
    #[serde(default)]
    wisdom_gems: Vec<RonAlternative>,
}

impl ThemePack {
    /// Load a theme pack from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ThemePack, FragmentError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a theme pack from a RON string.
    pub fn parse_ron(input: &str) -> Result<ThemePack, FragmentError> {
        let raw: RonThemePack = ron::from_str(input)?;
        let theme = Theme::from(raw.theme);
        let parse = |text: &str| {
            Template::parse(text).map_err(|source| FragmentError::Template {
                theme: theme.key().to_string(),
                source,
            })
        };

        let mut fragments = Vec::new();
        for (role, entries) in [
            (NarrativeRole::Opening, raw.opening),
            (NarrativeRole::Challenge, raw.challenge),
            (NarrativeRole::Resolution, raw.resolution),
            (NarrativeRole::Closing, raw.closing),
        ] {
            for entry in entries {
                fragments.push(StoryFragment {
                    theme: theme.clone(),
                    role,
                    weight: entry.weight,
                    requires: entry.requires,
                    excludes: entry.excludes,
                    choice: entry.choice,
                    template: parse(&entry.text)?,
                });
            }
        }

        let to_alternatives = |raw: Vec<RonAlternative>| -> Result<Vec<Alternative>, FragmentError> {
            raw.into_iter()
                .map(|alt| -> Result<Alternative, FragmentError> {
                    Ok(Alternative {
                        weight: alt.weight,
                        template: parse(&alt.text)?,
                    })
                })
                .collect()
        };

        Ok(ThemePack {
            decision_prompt: parse(&raw.decision_prompt)?,
            titles: to_alternatives(raw.titles)?,
            wisdom_gems: to_alternatives(raw.wisdom_gems)?,
            theme,
            problem: raw.problem,
            fragments,
            key_items: raw.key_items,
        })
    }

    /// Fragments filling the given role, in file order.
    pub fn fragments_for(&self, role: NarrativeRole) -> impl Iterator<Item = &StoryFragment> {
        self.fragments.iter().filter(move |f| f.role == role)
    }
}

/// Theme packs keyed by theme.
#[derive(Debug, Clone, Default)]
pub struct FragmentTable {
    packs: BTreeMap<Theme, ThemePack>,
}

impl FragmentTable {
    /// Insert a pack, replacing any existing pack for the same theme.
    pub fn insert(&mut self, pack: ThemePack) {
        self.packs.insert(pack.theme.clone(), pack);
    }

    /// Merge another table into this one. Packs from `other` override packs
    /// in `self` with the same theme.
    pub fn merge(&mut self, other: FragmentTable) {
        for (theme, pack) in other.packs {
            self.packs.insert(theme, pack);
        }
    }

    pub fn get(&self, theme: &Theme) -> Option<&ThemePack> {
        self.packs.get(theme)
    }

    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        self.packs.keys()
    }

    pub fn packs(&self) -> impl Iterator<Item = &ThemePack> {
        self.packs.values()
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}
