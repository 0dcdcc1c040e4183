//! Static checks over a fragment table: role coverage, placeholder names and
//! interactive-mode readiness.

use std::collections::HashSet;

use crate::core::bindings::KNOWN_FIELDS;
use crate::core::fragment::{FragmentTable, StoryFragment, ThemePack};
use crate::core::template::{Template, TemplateSegment};
use crate::schema::theme::NarrativeRole;

/// Problems found by `lint_table`. Errors make some request fail to
/// compose; warnings only limit variety or interactive mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

pub fn lint_table(table: &FragmentTable) -> LintReport {
    let mut report = LintReport::default();
    for pack in table.packs() {
        lint_pack(pack, &mut report);
    }
    report
}

pub fn lint_pack(pack: &ThemePack, report: &mut LintReport) {
    let theme = pack.theme.key();

    // Coverage: every role needs a fragment with no requirements, otherwise
    // some request shape has nothing to pick.
    for role in NarrativeRole::REQUIRED {
        let fragments: Vec<&StoryFragment> = pack.fragments_for(role).collect();
        if fragments.is_empty() {
            report
                .errors
                .push(format!("Theme '{}' has no {} fragments", theme, role));
            continue;
        }
        if !fragments
            .iter()
            .any(|f| f.weight > 0 && f.requires.is_empty() && f.excludes.is_empty())
            && !has_complementary_pair(&fragments)
        {
            report.warnings.push(format!(
                "Theme '{}' has no unconditional {} fragment; some requests may fail",
                theme, role
            ));
        }
        if fragments.len() < 2 {
            report.warnings.push(format!(
                "Theme '{}' has only {} {} fragment (minimum 2 recommended)",
                theme,
                fragments.len(),
                role
            ));
        }
    }

    for fragment in &pack.fragments {
        if fragment.weight == 0 {
            report.warnings.push(format!(
                "Theme '{}' has a zero-weight {} fragment that is never selected",
                theme, fragment.role
            ));
        }
        check_fields(
            &fragment.template,
            &fragment.requires,
            theme,
            fragment.role.name(),
            report,
        );
    }

    for fragment in pack.fragments_for(NarrativeRole::Opening) {
        if !fragment.template.mentions("child.name") {
            report.errors.push(format!(
                "Theme '{}' has an opening fragment that never names the child",
                theme
            ));
        }
    }

    check_fields(&pack.decision_prompt, &[], theme, "decision prompt", report);
    for alt in &pack.titles {
        check_fields(&alt.template, &[], theme, "title", report);
    }
    for alt in &pack.wisdom_gems {
        check_fields(&alt.template, &[], theme, "wisdom gem", report);
    }

    // Interactive readiness
    let mut labels = HashSet::new();
    let mut duplicates = HashSet::new();
    for fragment in pack.fragments_for(NarrativeRole::Resolution) {
        if let Some(label) = fragment.choice.as_deref().map(str::trim) {
            if !labels.insert(label) {
                duplicates.insert(label);
            }
        }
    }
    if labels.len() < 2 {
        report.warnings.push(format!(
            "Theme '{}' has {} labelled resolution(s); interactive mode needs 2",
            theme,
            labels.len()
        ));
    }
    let mut duplicates: Vec<&str> = duplicates.into_iter().collect();
    duplicates.sort();
    for label in duplicates {
        report.warnings.push(format!(
            "Theme '{}' reuses choice label '{}'",
            theme, label
        ));
    }
}

/// Verbs that only agree with she/he, never with they.
const SINGULAR_VERBS: [&str; 5] = ["was", "is", "has", "does", "doesn't"];

/// Warn on `{subject} was` and friends, which render as "they was".
fn check_agreement(template: &Template, theme: &str, place: &str, report: &mut LintReport) {
    for pair in template.segments.windows(2) {
        let (TemplateSegment::PronounRef { role }, TemplateSegment::Literal(text)) =
            (&pair[0], &pair[1])
        else {
            continue;
        };
        if !role.eq_ignore_ascii_case("subject") {
            continue;
        }
        let verb = text
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_end_matches(|c: char| !c.is_alphanumeric() && c != '\'');
        if SINGULAR_VERBS.contains(&verb) {
            report.warnings.push(format!(
                "Theme '{}' {} has '{{{}}} {}', which does not agree with they/them",
                theme, place, role, verb
            ));
        }
    }
}

/// A pair like `requires: ["has:companions"]` / `excludes: ["has:companions"]`
/// covers every request between them.
fn has_complementary_pair(fragments: &[&StoryFragment]) -> bool {
    fragments.iter().any(|a| {
        a.weight > 0
            && a.excludes.is_empty()
            && a.requires.len() == 1
            && fragments.iter().any(|b| {
                b.weight > 0 && b.requires.is_empty() && b.excludes == a.requires
            })
    })
}

fn check_fields(
    template: &Template,
    requires: &[String],
    theme: &str,
    place: &str,
    report: &mut LintReport,
) {
    check_agreement(template, theme, place, report);
    for field in template.fields() {
        if !KNOWN_FIELDS.contains(&field) {
            report.errors.push(format!(
                "Theme '{}' {} references unknown placeholder '{{{}}}'",
                theme, place, field
            ));
        } else if field.starts_with("companion")
            && !requires.iter().any(|t| t == "has:companions")
        {
            report.errors.push(format!(
                "Theme '{}' {} uses '{{{}}}' without requiring has:companions",
                theme, place, field
            ));
        }
    }
}
