//! Theme pack files on disk: loading and linting.

use adventure_engine::core::fragment::ThemePack;
use adventure_engine::core::lint::{lint_pack, LintReport};
use adventure_engine::core::template::TemplateSegment;
use adventure_engine::{NarrativeRole, Theme};

const PACK_PATHS: [(&str, Theme); 4] = [
    ("theme_data/confidence/fragments.ron", Theme::Confidence),
    ("theme_data/empathy/fragments.ron", Theme::Empathy),
    ("theme_data/fear/fragments.ron", Theme::Fear),
    (
        "theme_data/conflict_resolution/fragments.ron",
        Theme::ConflictResolution,
    ),
];

#[test]
fn theme_packs_load_from_disk() {
    for (path, theme) in PACK_PATHS {
        let pack = ThemePack::load_from_ron(std::path::Path::new(path)).unwrap();
        assert_eq!(pack.theme, theme, "{}", path);
        assert!(!pack.problem.is_empty());
        assert!(!pack.key_items.is_empty(), "{} has no key items", path);
        assert!(!pack.wisdom_gems.is_empty(), "{} has no wisdom gems", path);
        assert!(!pack.titles.is_empty(), "{} has no titles", path);
    }
}

#[test]
fn every_pack_has_two_labelled_resolutions() {
    for (path, _) in PACK_PATHS {
        let pack = ThemePack::load_from_ron(std::path::Path::new(path)).unwrap();
        let labelled = pack
            .fragments_for(NarrativeRole::Resolution)
            .filter(|f| f.choice.is_some() && f.requires.is_empty())
            .count();
        assert!(
            labelled >= 2,
            "{} has only {} unconditional labelled resolutions",
            path,
            labelled
        );
    }
}

#[test]
fn openings_always_name_the_child() {
    for (path, _) in PACK_PATHS {
        let pack = ThemePack::load_from_ron(std::path::Path::new(path)).unwrap();
        for fragment in pack.fragments_for(NarrativeRole::Opening) {
            assert!(
                fragment
                    .template
                    .segments
                    .iter()
                    .any(|s| matches!(s, TemplateSegment::Field(f) if f == "child.name")),
                "{} has an opening without {{child.name}}",
                path
            );
        }
    }
}

#[test]
fn packs_lint_clean() {
    for (path, _) in PACK_PATHS {
        let pack = ThemePack::load_from_ron(std::path::Path::new(path)).unwrap();
        let mut report = LintReport::default();
        lint_pack(&pack, &mut report);
        assert!(report.is_clean(), "{}: {:?}", path, report);
    }
}
