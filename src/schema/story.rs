use serde::Serialize;
use std::fmt;

use super::theme::{NarrativeRole, StoryMode, Theme};

/// One resolved piece of narrative text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub role: NarrativeRole,
    pub text: String,
}

/// A named option at a decision point, leading to its own resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub label: String,
    pub resolution: String,
}

/// A pause in an interactive story where the reader picks one of two paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchPoint {
    /// Index of the segment this decision follows.
    pub after_segment: usize,
    pub prompt: String,
    pub choices: [Choice; 2],
}

/// Summary printed after the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdventureReport {
    pub key_item: String,
    pub theme_explored: String,
}

/// A fully assembled story.
///
/// Stories are immutable: the composer fixes segment order at creation and
/// nothing exposes a way to reorder or edit them afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    title: String,
    theme: Theme,
    mode: StoryMode,
    segments: Vec<Segment>,
    branch_points: Vec<BranchPoint>,
    report: AdventureReport,
    wisdom_gem: String,
}

impl Story {
    pub(crate) fn new(
        title: String,
        theme: Theme,
        mode: StoryMode,
        segments: Vec<Segment>,
        branch_points: Vec<BranchPoint>,
        report: AdventureReport,
        wisdom_gem: String,
    ) -> Self {
        Self {
            title,
            theme,
            mode,
            segments,
            branch_points,
            report,
            wisdom_gem,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn mode(&self) -> StoryMode {
        self.mode
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn branch_points(&self) -> &[BranchPoint] {
        &self.branch_points
    }

    pub fn report(&self) -> &AdventureReport {
        &self.report
    }

    pub fn wisdom_gem(&self) -> &str {
        &self.wisdom_gem
    }

    /// The segment text that fills the given role, if the story has one.
    pub fn segment(&self, role: NarrativeRole) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| s.role == role)
            .map(|s| s.text.as_str())
    }
}

impl fmt::Display for Story {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f)?;
        for (i, segment) in self.segments.iter().enumerate() {
            writeln!(f, "{}", segment.text)?;
            writeln!(f)?;
            for branch in self.branch_points.iter().filter(|b| b.after_segment == i) {
                writeln!(f, "{}", branch.prompt)?;
                for (n, choice) in branch.choices.iter().enumerate() {
                    writeln!(f, "  {}. {}", n + 1, choice.label)?;
                }
                writeln!(f)?;
                for (n, choice) in branch.choices.iter().enumerate() {
                    writeln!(f, "[If you chose {}] {}", n + 1, choice.resolution)?;
                    writeln!(f)?;
                }
            }
        }
        writeln!(f, "--- Adventure Report ---")?;
        writeln!(f, "* Key Item Found: {}", self.report.key_item)?;
        writeln!(
            f,
            "* This story explored the theme of: {}.",
            self.report.theme_explored
        )?;
        writeln!(f)?;
        writeln!(f, "--- Wisdom Gem ---")?;
        write!(f, "{}", self.wisdom_gem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_story(branch_points: Vec<BranchPoint>) -> Story {
        Story::new(
            "Mia and the Brave Voice".to_string(),
            Theme::Confidence,
            StoryMode::Interactive,
            vec![
                Segment {
                    role: NarrativeRole::Opening,
                    text: "Once upon a time there was Mia.".to_string(),
                },
                Segment {
                    role: NarrativeRole::Challenge,
                    text: "Mia had to speak up.".to_string(),
                },
                Segment {
                    role: NarrativeRole::Closing,
                    text: "The end.".to_string(),
                },
            ],
            branch_points,
            AdventureReport {
                key_item: "The Crystal of Courage".to_string(),
                theme_explored: "building confidence".to_string(),
            },
            "Believe in yourself.".to_string(),
        )
    }

    #[test]
    fn segment_lookup_by_role() {
        let story = make_story(Vec::new());
        assert_eq!(
            story.segment(NarrativeRole::Challenge),
            Some("Mia had to speak up.")
        );
        assert_eq!(story.segment(NarrativeRole::Resolution), None);
    }

    #[test]
    fn display_includes_choices_after_their_segment() {
        let story = make_story(vec![BranchPoint {
            after_segment: 1,
            prompt: "What should Mia do?".to_string(),
            choices: [
                Choice {
                    label: "Sing".to_string(),
                    resolution: "Mia sang.".to_string(),
                },
                Choice {
                    label: "Shout".to_string(),
                    resolution: "Mia shouted.".to_string(),
                },
            ],
        }]);
        let text = story.to_string();
        let challenge_at = text.find("Mia had to speak up.").unwrap();
        let prompt_at = text.find("What should Mia do?").unwrap();
        let closing_at = text.find("The end.").unwrap();
        assert!(challenge_at < prompt_at && prompt_at < closing_at);
        assert!(text.contains("  1. Sing"));
        assert!(text.contains("[If you chose 2] Mia shouted."));
        assert!(text.contains("* Key Item Found: The Crystal of Courage"));
        assert!(text.ends_with("Believe in yourself."));
    }

    #[test]
    fn serializes_to_json() {
        let story = make_story(Vec::new());
        let json = serde_json::to_value(&story).unwrap();
        assert_eq!(json["theme"], "confidence");
        assert_eq!(json["mode"], "interactive");
        assert_eq!(json["segments"][0]["role"], "opening");
    }
}
