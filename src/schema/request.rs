use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use super::theme::{StoryMode, Theme};

/// Pronoun set for the child, used by template expansion to resolve
/// `{subject}`, `{object}`, `{possessive}` and `{reflexive}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pronouns {
    /// she/her/her/herself
    She,
    /// he/him/his/himself
    He,
    /// they/them/their/themselves
    #[default]
    They,
}

impl Pronouns {
    /// Nominative/subject form: "she", "he", "they".
    pub fn subject(&self) -> &'static str {
        match self {
            Self::She => "she",
            Self::He => "he",
            Self::They => "they",
        }
    }

    /// Accusative/object form: "her", "him", "them".
    pub fn object(&self) -> &'static str {
        match self {
            Self::She => "her",
            Self::He => "him",
            Self::They => "them",
        }
    }

    /// Possessive determiner: "her", "his", "their".
    pub fn possessive(&self) -> &'static str {
        match self {
            Self::She => "her",
            Self::He => "his",
            Self::They => "their",
        }
    }

    /// Reflexive: "herself", "himself", "themselves".
    pub fn reflexive(&self) -> &'static str {
        match self {
            Self::She => "herself",
            Self::He => "himself",
            Self::They => "themselves",
        }
    }
}

impl FromStr for Pronouns {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "she" | "her" | "she/her" | "girl" => Ok(Self::She),
            "he" | "him" | "he/him" | "boy" => Ok(Self::He),
            "they" | "them" | "they/them" | "" => Ok(Self::They),
            other => Err(format!(
                "unknown pronouns '{}': expected she, he or they",
                other
            )),
        }
    }
}

/// A named friend who joins the child on the adventure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Companion {
    pub name: String,
    /// What the companion is, e.g. "talking squirrel".
    pub role: String,
}

impl Companion {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }
}

impl FromStr for Companion {
    type Err = String;

    /// Parses `name:role`, e.g. `Pip:talking squirrel`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((name, role)) => Ok(Companion::new(name.trim(), role.trim())),
            None => Err(format!("invalid companion '{}': expected name:role", s)),
        }
    }
}

/// Reasons a request cannot be turned into a story.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("child name must not be empty")]
    EmptyName,
    #[error("child age is required")]
    MissingAge,
    #[error("child age must be a positive integer, got {0}")]
    NonPositiveAge(i32),
    #[error("companion #{0} must have both a name and a role")]
    BlankCompanion(usize),
    #[error("placeholder '{{{placeholder}}}' in a {role} fragment has no matching request field")]
    UnboundPlaceholder { placeholder: String, role: String },
    #[error("theme '{theme}' has no {role} fragment that fits this request")]
    NoFragmentForRole { theme: String, role: String },
    #[error("interactive mode needs two labelled resolutions for theme '{theme}', found {found}")]
    NotEnoughChoices { theme: String, found: usize },
}

#[derive(Debug, Error)]
pub enum RequestLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structured input describing the child and the story they should get.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryRequest {
    pub name: String,
    /// Kept optional and signed so that absent or negative ages reach
    /// validation instead of failing deserialization.
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub pronouns: Pronouns,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    pub theme: Theme,
    /// Free-text description of what the child struggles with.
    #[serde(default)]
    pub challenge: Option<String>,
    /// How the child would be described, e.g. "brave and funny".
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub companions: Vec<Companion>,
    #[serde(default)]
    pub mode: StoryMode,
}

impl StoryRequest {
    /// A linear request with no interests, companions or challenge detail.
    pub fn new(name: impl Into<String>, age: i32, theme: Theme) -> Self {
        Self {
            name: name.into(),
            age: Some(age),
            pronouns: Pronouns::default(),
            interests: BTreeSet::new(),
            theme,
            challenge: None,
            personality: None,
            companions: Vec::new(),
            mode: StoryMode::Linear,
        }
    }

    pub fn with_interest(mut self, interest: impl Into<String>) -> Self {
        self.interests.insert(interest.into());
        self
    }

    pub fn with_companion(mut self, companion: Companion) -> Self {
        self.companions.push(companion);
        self
    }

    pub fn with_mode(mut self, mode: StoryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pronouns(mut self, pronouns: Pronouns) -> Self {
        self.pronouns = pronouns;
        self
    }

    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }

    /// Check the request fields, returning the validated age.
    pub fn validate(&self) -> Result<u32, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let age = match self.age {
            None => return Err(ValidationError::MissingAge),
            Some(age) if age <= 0 => return Err(ValidationError::NonPositiveAge(age)),
            Some(age) => age as u32,
        };
        for (i, companion) in self.companions.iter().enumerate() {
            if companion.name.trim().is_empty() || companion.role.trim().is_empty() {
                return Err(ValidationError::BlankCompanion(i + 1));
            }
        }
        Ok(age)
    }

    /// Interests with blank entries dropped, in sorted order.
    pub fn interests(&self) -> impl Iterator<Item = &str> {
        self.interests
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Load a request from a `.json` or `.ron` file. Other extensions are
    /// read as RON.
    pub fn load(path: &Path) -> Result<StoryRequest, RequestLoadError> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Ok(serde_json::from_str(&contents)?),
            _ => Ok(ron::from_str(&contents)?),
        }
    }
}

/// Returns the selection tag for an age (e.g., "age:middle").
pub fn age_band_tag(age: u32) -> &'static str {
    match age {
        0..=5 => "age:little",
        6..=8 => "age:middle",
        _ => "age:older",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> StoryRequest {
        StoryRequest::new("Mia", 7, Theme::Confidence)
            .with_interest("dinosaurs")
            .with_companion(Companion::new("Pip", "talking squirrel"))
    }

    #[test]
    fn valid_request_passes() {
        assert_eq!(make_request().validate(), Ok(7));
    }

    #[test]
    fn missing_age_rejected() {
        let mut request = make_request();
        request.age = None;
        assert_eq!(request.validate(), Err(ValidationError::MissingAge));
    }

    #[test]
    fn zero_and_negative_age_rejected() {
        let mut request = make_request();
        request.age = Some(0);
        assert_eq!(request.validate(), Err(ValidationError::NonPositiveAge(0)));
        request.age = Some(-3);
        assert_eq!(request.validate(), Err(ValidationError::NonPositiveAge(-3)));
    }

    #[test]
    fn blank_name_rejected() {
        let request = StoryRequest::new("   ", 5, Theme::Fear);
        assert_eq!(request.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn blank_companion_rejected() {
        let request = make_request().with_companion(Companion::new("Bolt", " "));
        assert_eq!(request.validate(), Err(ValidationError::BlankCompanion(2)));
    }

    #[test]
    fn blank_interests_skipped() {
        let request = make_request().with_interest("  ").with_interest("art");
        let interests: Vec<&str> = request.interests().collect();
        assert_eq!(interests, vec!["art", "dinosaurs"]);
    }

    #[test]
    fn companion_from_str() {
        let c: Companion = "Pip: talking squirrel".parse().unwrap();
        assert_eq!(c, Companion::new("Pip", "talking squirrel"));
        assert!("Pip".parse::<Companion>().is_err());
    }

    #[test]
    fn pronoun_forms() {
        assert_eq!(Pronouns::She.possessive(), "her");
        assert_eq!(Pronouns::He.object(), "him");
        assert_eq!(Pronouns::They.reflexive(), "themselves");
        assert_eq!("he".parse::<Pronouns>(), Ok(Pronouns::He));
        assert!("xe".parse::<Pronouns>().is_err());
    }

    #[test]
    fn age_bands() {
        assert_eq!(age_band_tag(4), "age:little");
        assert_eq!(age_band_tag(6), "age:middle");
        assert_eq!(age_band_tag(8), "age:middle");
        assert_eq!(age_band_tag(11), "age:older");
    }

    #[test]
    fn json_without_age_deserializes() {
        let json = r#"{"name": "Mia", "theme": "confidence"}"#;
        let request: StoryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.age, None);
        assert_eq!(request.mode, StoryMode::Linear);
        assert!(request.companions.is_empty());
    }

    #[test]
    fn json_with_unknown_theme_deserializes_as_custom() {
        let json = r#"{"name": "Mia", "age": 7, "theme": "unknown"}"#;
        let request: StoryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.theme, Theme::Custom("unknown".to_string()));
    }

    #[test]
    fn load_ron_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mia.ron");
        std::fs::write(
            &path,
            r#"(
                name: "Mia",
                age: Some(7),
                pronouns: she,
                interests: ["dragons"],
                theme: "fear",
                companions: [(name: "Pip", role: "talking squirrel")],
                mode: interactive,
            )"#,
        )
        .unwrap();
        let request = StoryRequest::load(&path).unwrap();
        assert_eq!(request.theme, Theme::Fear);
        assert_eq!(request.pronouns, Pronouns::She);
        assert_eq!(request.mode, StoryMode::Interactive);
        assert_eq!(request.companions.len(), 1);
    }
}
