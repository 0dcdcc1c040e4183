//! Fragment templates: parsing `{placeholder}` text and rendering it
//! against request bindings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::bindings::Bindings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),
    #[error("unbound placeholder: {0}")]
    Unbound(String),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Request field interpolation: `{child.name}`, `{interest}`, ...
    Field(String),
    /// Pronoun reference: `{subject}`, `{object}`, `{possessive}`,
    /// `{reflexive}`. A capitalised role (`{Subject}`) renders capitalised.
    PronounRef { role: String },
}

/// A parsed template, a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

const PRONOUN_ROLES: [&str; 4] = ["subject", "object", "possessive", "reflexive"];

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{subject}` / `{object}` / `{possessive}` / `{reflexive}` and their
    ///   capitalised forms → `PronounRef`
    /// - `{anything.else}` → `Field`
    /// - `{{` / `}}` → literal braces
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if i + 1 < len && chars[i + 1] == '{' => {
                    literal_buf.push('{');
                    i += 2;
                }
                '{' => {
                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(
                            &mut literal_buf,
                        )));
                    }

                    let start = i + 1;
                    let mut end = start;
                    while end < len && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(TemplateError::Parse(
                                "nested braces are not allowed".to_string(),
                            ));
                        }
                        end += 1;
                    }
                    if end == len {
                        return Err(TemplateError::Parse("unclosed brace".to_string()));
                    }

                    let content: String = chars[start..end].iter().collect();
                    segments.push(Self::parse_segment(content.trim())?);
                    i = end + 1;
                }
                '}' if i + 1 < len && chars[i + 1] == '}' => {
                    literal_buf.push('}');
                    i += 2;
                }
                '}' => {
                    return Err(TemplateError::Parse(
                        "unmatched closing brace".to_string(),
                    ));
                }
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_segment(content: &str) -> Result<TemplateSegment, TemplateError> {
        if content.is_empty() {
            return Err(TemplateError::Parse("empty braces".to_string()));
        }
        if content.chars().any(char::is_whitespace) {
            return Err(TemplateError::Parse(format!(
                "placeholder '{}' contains whitespace",
                content
            )));
        }
        if PRONOUN_ROLES.contains(&content.to_lowercase().as_str()) {
            return Ok(TemplateSegment::PronounRef {
                role: content.to_string(),
            });
        }
        if content.starts_with('.') || content.ends_with('.') {
            return Err(TemplateError::Parse(format!(
                "malformed field name '{}'",
                content
            )));
        }
        Ok(TemplateSegment::Field(content.to_string()))
    }

    /// Names of every field placeholder in this template.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::Field(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// True if the template contains the given field placeholder.
    pub fn mentions(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }

    /// Substitute every placeholder from `bindings`. Fails on the first
    /// placeholder that has no binding.
    pub fn render(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Field(name) => match bindings.field(name) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::Unbound(name.clone())),
                },
                TemplateSegment::PronounRef { role } => {
                    let form = bindings
                        .pronoun(&role.to_lowercase())
                        .ok_or_else(|| TemplateError::Unbound(role.clone()))?;
                    if role.starts_with(char::is_uppercase) {
                        out.push_str(&capitalize(form));
                    } else {
                        out.push_str(form);
                    }
                }
            }
        }
        Ok(out)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::request::{Companion, Pronouns, StoryRequest};
    use crate::schema::theme::Theme;

    fn mia_bindings() -> Bindings {
        let request = StoryRequest::new("Mia", 7, Theme::Confidence)
            .with_pronouns(Pronouns::She)
            .with_companion(Companion::new("Pip", "talking squirrel"));
        Bindings::from_request(&request, 7, "being shy")
    }

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("Once upon a time.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Once upon a time.".to_string())]
        );
    }

    #[test]
    fn parse_field() {
        let t = Template::parse("Hello, {child.name}.").unwrap();
        assert_eq!(t.segments.len(), 3);
        assert_eq!(t.segments[1], TemplateSegment::Field("child.name".to_string()));
    }

    #[test]
    fn parse_pronoun_refs() {
        let t = Template::parse("{Subject} hugged {possessive} friend.").unwrap();
        assert_eq!(
            t.segments[0],
            TemplateSegment::PronounRef {
                role: "Subject".to_string()
            }
        );
        assert_eq!(
            t.segments[2],
            TemplateSegment::PronounRef {
                role: "possessive".to_string()
            }
        );
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("Use {{braces}} here.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Use {braces} here.".to_string())]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("Bad {} here").is_err());
        assert!(Template::parse("Bad {outer{inner}} here").is_err());
        assert!(Template::parse("Bad {unclosed here").is_err());
        assert!(Template::parse("Bad } here").is_err());
        assert!(Template::parse("Bad {child name} here").is_err());
        assert!(Template::parse("Bad {child.} here").is_err());
    }

    #[test]
    fn fields_lists_only_field_placeholders() {
        let t = Template::parse("{child.name} and {companion.name} met {object}.").unwrap();
        let fields: Vec<&str> = t.fields().collect();
        assert_eq!(fields, vec!["child.name", "companion.name"]);
        assert!(t.mentions("child.name"));
        assert!(!t.mentions("interest"));
    }

    #[test]
    fn render_substitutes_fields_and_pronouns() {
        let t = Template::parse(
            "{child.name} met {companion.name}, the {companion.role}. {Subject} smiled at {object}.",
        )
        .unwrap();
        let text = t.render(&mia_bindings()).unwrap();
        assert_eq!(
            text,
            "Mia met Pip, the talking squirrel. She smiled at her."
        );
    }

    #[test]
    fn render_unknown_field_is_unbound() {
        let t = Template::parse("{child.name} rode {pony.name}.").unwrap();
        assert_eq!(
            t.render(&mia_bindings()),
            Err(TemplateError::Unbound("pony.name".to_string()))
        );
    }

    #[test]
    fn capitalize_handles_empty() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("they"), "They");
    }
}
