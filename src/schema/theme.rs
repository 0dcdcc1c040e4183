use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The challenge a story helps the child work through.
///
/// The four named themes ship with built-in fragment packs. `Custom` carries
/// any other theme name so that caller-supplied tables can define their own;
/// composing a custom theme the table does not know fails with
/// `ThemeNotFound` rather than at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    Confidence,
    Empathy,
    Fear,
    ConflictResolution,
    Custom(String),
}

impl Theme {
    /// The four themes with built-in fragment packs.
    pub const BUILTIN: [Theme; 4] = [
        Theme::Confidence,
        Theme::Empathy,
        Theme::Fear,
        Theme::ConflictResolution,
    ];

    /// Canonical key used in fragment files and selection tags.
    pub fn key(&self) -> &str {
        match self {
            Self::Confidence => "confidence",
            Self::Empathy => "empathy",
            Self::Fear => "fear",
            Self::ConflictResolution => "conflict-resolution",
            Self::Custom(name) => name,
        }
    }

    /// Human-readable phrase for the adventure report.
    pub fn label(&self) -> &str {
        match self {
            Self::Confidence => "building confidence",
            Self::Empathy => "understanding how others feel",
            Self::Fear => "facing fears",
            Self::ConflictResolution => "working through disagreements",
            Self::Custom(name) => name,
        }
    }

    /// Returns the selection tag for this theme (e.g., "theme:fear").
    pub fn tag(&self) -> String {
        format!("theme:{}", self.key())
    }
}

impl From<String> for Theme {
    fn from(value: String) -> Self {
        let normalized = value.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "confidence" => Self::Confidence,
            "empathy" => Self::Empathy,
            "fear" => Self::Fear,
            "conflict-resolution" => Self::ConflictResolution,
            _ => Self::Custom(normalized),
        }
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.key().to_string()
    }
}

impl FromStr for Theme {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Theme::from(s.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The position a fragment occupies in a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeRole {
    Opening,
    Challenge,
    Resolution,
    Closing,
}

impl NarrativeRole {
    /// Every role a theme must provide, in story order.
    pub const REQUIRED: [NarrativeRole; 4] = [
        NarrativeRole::Opening,
        NarrativeRole::Challenge,
        NarrativeRole::Resolution,
        NarrativeRole::Closing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Challenge => "challenge",
            Self::Resolution => "resolution",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for NarrativeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the story reads straight through or pauses for the child to choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryMode {
    #[default]
    Linear,
    Interactive,
}

impl StoryMode {
    /// Returns the selection tag for this mode (e.g., "mode:interactive").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Linear => "mode:linear",
            Self::Interactive => "mode:interactive",
        }
    }
}

impl FromStr for StoryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "interactive" => Ok(Self::Interactive),
            other => Err(format!(
                "unknown story mode '{}': expected linear or interactive",
                other
            )),
        }
    }
}
