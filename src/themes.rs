//! Built-in theme packs, compiled into the library from `theme_data/`.

use crate::core::fragment::{FragmentError, FragmentTable, ThemePack};
use crate::schema::theme::Theme;

mod data {
    pub const CONFIDENCE: &str = include_str!("../theme_data/confidence/fragments.ron");
    pub const EMPATHY: &str = include_str!("../theme_data/empathy/fragments.ron");
    pub const FEAR: &str = include_str!("../theme_data/fear/fragments.ron");
    pub const CONFLICT_RESOLUTION: &str =
        include_str!("../theme_data/conflict_resolution/fragments.ron");
}

/// Names accepted by `StoryComposerBuilder::builtin_themes`.
pub const BUILTIN_NAMES: [&str; 4] = ["confidence", "empathy", "fear", "conflict-resolution"];

/// The RON source of a built-in pack. Accepts the same spellings as
/// `Theme::from` (e.g. `conflict_resolution`).
pub fn builtin_source(name: &str) -> Option<&'static str> {
    match Theme::from(name.to_string()) {
        Theme::Confidence => Some(data::CONFIDENCE),
        Theme::Empathy => Some(data::EMPATHY),
        Theme::Fear => Some(data::FEAR),
        Theme::ConflictResolution => Some(data::CONFLICT_RESOLUTION),
        Theme::Custom(_) => None,
    }
}

pub fn builtin_pack(name: &str) -> Result<ThemePack, FragmentError> {
    let source =
        builtin_source(name).ok_or_else(|| FragmentError::UnknownBuiltinTheme(name.to_string()))?;
    ThemePack::parse_ron(source)
}

/// A table holding every built-in pack.
pub fn builtin_table() -> Result<FragmentTable, FragmentError> {
    let mut table = FragmentTable::default();
    for name in BUILTIN_NAMES {
        table.insert(builtin_pack(name)?);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lint::lint_table;
    use crate::schema::theme::NarrativeRole;

    #[test]
    fn every_builtin_parses() {
        let table = builtin_table().unwrap();
        assert_eq!(table.len(), 4);
        for theme in Theme::BUILTIN {
            assert!(table.get(&theme).is_some(), "missing pack for {}", theme);
        }
    }

    #[test]
    fn builtin_pack_theme_matches_name() {
        for name in BUILTIN_NAMES {
            let pack = builtin_pack(name).unwrap();
            assert_eq!(pack.theme.key(), name);
        }
    }

    #[test]
    fn builtin_packs_cover_every_role() {
        let table = builtin_table().unwrap();
        for pack in table.packs() {
            for role in NarrativeRole::REQUIRED {
                assert!(
                    pack.fragments_for(role).count() >= 2,
                    "theme {} has too few {} fragments",
                    pack.theme,
                    role
                );
            }
        }
    }

    #[test]
    fn builtin_packs_lint_clean() {
        let report = lint_table(&builtin_table().unwrap());
        assert!(report.is_clean(), "lint findings: {:?}", report);
    }

    #[test]
    fn alternate_spelling_resolves() {
        assert!(builtin_source("conflict_resolution").is_some());
        assert!(builtin_source("pirates").is_none());
        assert!(matches!(
            builtin_pack("pirates"),
            Err(FragmentError::UnknownBuiltinTheme(_))
        ));
    }
}
