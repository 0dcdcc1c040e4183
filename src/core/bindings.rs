//! Request-derived values for placeholder substitution and the tag set
//! used to filter fragments.

use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

use crate::schema::request::{age_band_tag, Pronouns, StoryRequest};

/// Used for `{interest}` and `{interests}` when the child listed none.
pub const INTEREST_FILLER: &str = "exploring new places";

/// Used for `{child.personality}` when the request gives none.
pub const PERSONALITY_FILLER: &str = "curious and kind";

/// Every field placeholder a request can bind. `companion.*`, `companions`
/// are only bound when the request has at least one companion.
pub const KNOWN_FIELDS: [&str; 11] = [
    "child.name",
    "child.age",
    "child.personality",
    "interest",
    "interests",
    "challenge",
    "theme",
    "companion.name",
    "companion.role",
    "companions",
    "key_item",
];

/// Field values and pronouns available to templates.
#[derive(Debug, Clone)]
pub struct Bindings {
    fields: BTreeMap<String, String>,
    pronouns: Pronouns,
}

impl Bindings {
    /// Build bindings from an already-validated request.
    pub fn from_request(request: &StoryRequest, age: u32, challenge: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("child.name".to_string(), request.name.trim().to_string());
        fields.insert("child.age".to_string(), age.to_string());
        fields.insert("theme".to_string(), request.theme.label().to_string());

        let challenge = request
            .challenge
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(challenge);
        fields.insert("challenge".to_string(), challenge.to_string());

        let personality = request
            .personality
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(PERSONALITY_FILLER);
        fields.insert("child.personality".to_string(), personality.to_string());

        let interests: Vec<&str> = request.interests().collect();
        match interests.first() {
            Some(first) => {
                fields.insert("interest".to_string(), first.to_string());
                fields.insert("interests".to_string(), join_list(&interests));
            }
            None => {
                fields.insert("interest".to_string(), INTEREST_FILLER.to_string());
                fields.insert("interests".to_string(), INTEREST_FILLER.to_string());
            }
        }

        if let Some(first) = request.companions.first() {
            fields.insert("companion.name".to_string(), first.name.trim().to_string());
            fields.insert("companion.role".to_string(), first.role.trim().to_string());
            let names: Vec<&str> = request.companions.iter().map(|c| c.name.trim()).collect();
            fields.insert("companions".to_string(), join_list(&names));
        }

        Self {
            fields,
            pronouns: request.pronouns,
        }
    }

    /// Add or replace a field binding.
    pub fn bind(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Resolve a lower-case pronoun role to the child's form.
    pub fn pronoun(&self, role: &str) -> Option<&'static str> {
        match role {
            "subject" => Some(self.pronouns.subject()),
            "object" => Some(self.pronouns.object()),
            "possessive" => Some(self.pronouns.possessive()),
            "reflexive" => Some(self.pronouns.reflexive()),
            _ => None,
        }
    }
}

/// Tags describing the request, matched against fragment
/// `requires`/`excludes` lists.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    pub tags: FxHashSet<String>,
}

impl SelectionContext {
    pub fn from_request(request: &StoryRequest, age: u32) -> Self {
        let mut tags = FxHashSet::default();
        tags.insert(request.theme.tag());
        tags.insert(request.mode.tag().to_string());
        tags.insert(age_band_tag(age).to_string());
        if request.interests().next().is_some() {
            tags.insert("has:interests".to_string());
        }
        if !request.companions.is_empty() {
            tags.insert("has:companions".to_string());
        }
        if request.companions.len() > 1 {
            tags.insert("companions:many".to_string());
        }
        Self { tags }
    }

    /// True if every `requires` tag is present and no `excludes` tag is.
    pub fn matches(&self, requires: &[String], excludes: &[String]) -> bool {
        requires.iter().all(|t| self.tags.contains(t))
            && !excludes.iter().any(|t| self.tags.contains(t))
    }
}

/// "a", "a and b", "a, b and c".
fn join_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
