//! The story composer: request → story assembly.
//!
//! Validates the request, picks one fragment per narrative role from the
//! theme's pack, and renders each against the request bindings. Selection is
//! weighted but deterministic: the RNG is seeded from the composer seed and a
//! stable hash of the request, so the same request always yields the same
//! story.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::bindings::{Bindings, SelectionContext};
use crate::core::fragment::{Alternative, FragmentError, FragmentTable, StoryFragment, ThemePack};
use crate::core::template::{Template, TemplateError};
use crate::schema::request::{StoryRequest, ValidationError};
use crate::schema::story::{AdventureReport, BranchPoint, Choice, Segment, Story};
use crate::schema::theme::{NarrativeRole, StoryMode, Theme};
use crate::themes;

const DEFAULT_KEY_ITEM: &str = "The Crystal of Courage";
const DEFAULT_WISDOM_GEM: &str =
    "Believing in yourself is the first step to any great adventure.";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid story request: {0}")]
    Validation(#[from] ValidationError),
    #[error("no fragments found for theme '{0}'")]
    ThemeNotFound(Theme),
}

/// Assembles stories from a fixed fragment table. Built via
/// `StoryComposer::builder()`.
#[derive(Debug, Clone)]
pub struct StoryComposer {
    fragments: FragmentTable,
    seed: u64,
}

/// Builder for constructing a `StoryComposer`.
///
/// Sources are layered in this order, later ones overriding earlier ones
/// for the same theme: built-in themes, a directly provided table, fragment
/// directories, individual fragment files.
#[derive(Debug, Default)]
pub struct StoryComposerBuilder {
    builtin_themes: Vec<String>,
    fragments_dirs: Vec<PathBuf>,
    fragment_files: Vec<PathBuf>,
    seed: u64,
    /// Directly provided table (for testing without files).
    fragments: Option<FragmentTable>,
}

impl StoryComposer {
    pub fn builder() -> StoryComposerBuilder {
        StoryComposerBuilder::default()
    }

    pub fn fragments(&self) -> &FragmentTable {
        &self.fragments
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Compose a story for `request`.
    pub fn compose(&self, request: &StoryRequest) -> Result<Story, ComposeError> {
        let age = request.validate()?;
        let pack = self
            .fragments
            .get(&request.theme)
            .filter(|pack| !pack.fragments.is_empty())
            .ok_or_else(|| ComposeError::ThemeNotFound(request.theme.clone()))?;

        let mut rng = StdRng::seed_from_u64(self.seed ^ request_fingerprint(request));
        let ctx = SelectionContext::from_request(request, age);
        let mut bindings = Bindings::from_request(request, age, &pack.problem);

        let key_item = pick_key_item(pack, &mut rng);
        bindings.bind("key_item", key_item.as_str());

        let mut segments: Vec<Segment> = Vec::with_capacity(NarrativeRole::REQUIRED.len());
        let mut branch_points = Vec::new();

        for role in NarrativeRole::REQUIRED {
            if role == NarrativeRole::Resolution && request.mode == StoryMode::Interactive {
                let prompt = render(&pack.decision_prompt, &bindings, "decision prompt")?;
                let choices = select_choices(pack, &ctx, &bindings, &mut rng)?;
                branch_points.push(BranchPoint {
                    after_segment: segments.len().saturating_sub(1),
                    prompt,
                    choices,
                });
                continue;
            }

            let fragment = select_fragment(pack, role, &ctx, &mut rng)?;
            segments.push(Segment {
                role,
                text: render(&fragment.template, &bindings, role.name())?,
            });
        }

        let title = match pick_alternative(&pack.titles, &mut rng) {
            Some(alt) => render(&alt.template, &bindings, "title")?,
            None => format!("{}'s Great Adventure", request.name.trim()),
        };
        let wisdom_gem = match pick_alternative(&pack.wisdom_gems, &mut rng) {
            Some(alt) => render(&alt.template, &bindings, "wisdom gem")?,
            None => DEFAULT_WISDOM_GEM.to_string(),
        };

        debug!(
            theme = %request.theme,
            mode = ?request.mode,
            segments = segments.len(),
            branch_points = branch_points.len(),
            "story composed"
        );

        Ok(Story::new(
            title,
            request.theme.clone(),
            request.mode,
            segments,
            branch_points,
            AdventureReport {
                key_item,
                theme_explored: request.theme.label().to_string(),
            },
            wisdom_gem,
        ))
    }
}

impl StoryComposerBuilder {
    /// Load the named built-in theme packs, e.g. `&["confidence", "fear"]`.
    pub fn builtin_themes(mut self, names: &[&str]) -> Self {
        self.builtin_themes = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Load every built-in theme pack.
    pub fn all_builtin_themes(mut self) -> Self {
        self.builtin_themes = themes::BUILTIN_NAMES.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Load every `.ron` theme pack in `path`.
    pub fn fragments_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.fragments_dirs.push(path.as_ref().to_path_buf());
        self
    }

    /// Load a single theme pack file.
    pub fn fragments_file(mut self, path: impl AsRef<Path>) -> Self {
        self.fragment_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide fragments directly (for testing without files).
    pub fn with_fragments(mut self, fragments: FragmentTable) -> Self {
        self.fragments = Some(fragments);
        self
    }

    pub fn build(self) -> Result<StoryComposer, FragmentError> {
        let mut fragments = FragmentTable::default();

        for name in &self.builtin_themes {
            fragments.insert(themes::builtin_pack(name)?);
        }

        if let Some(table) = self.fragments {
            fragments.merge(table);
        }

        for dir in &self.fragments_dirs {
            if !dir.exists() {
                warn!(dir = %dir.display(), "fragment directory does not exist, skipping");
                continue;
            }
            load_ron_files_from_dir(dir, |path| {
                let pack = ThemePack::load_from_ron(path)?;
                debug!(path = %path.display(), theme = %pack.theme, "loaded theme pack");
                fragments.insert(pack);
                Ok(())
            })?;
        }

        for file in &self.fragment_files {
            fragments.insert(ThemePack::load_from_ron(file)?);
        }

        info!(themes = fragments.len(), seed = self.seed, "story composer ready");

        Ok(StoryComposer {
            fragments,
            seed: self.seed,
        })
    }
}

/// Load all .ron files from a directory in path order, calling `loader` for
/// each.
fn load_ron_files_from_dir<F>(dir: &Path, mut loader: F) -> Result<(), FragmentError>
where
    F: FnMut(&Path) -> Result<(), FragmentError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in &paths {
        loader(path)?;
    }
    Ok(())
}

fn request_fingerprint(request: &StoryRequest) -> u64 {
    let mut hasher = FxHasher::default();
    request.hash(&mut hasher);
    hasher.finish()
}

fn render(template: &Template, bindings: &Bindings, role: &str) -> Result<String, ValidationError> {
    template.render(bindings).map_err(|e| {
        let placeholder = match e {
            TemplateError::Unbound(name) => name,
            TemplateError::Parse(msg) => msg,
        };
        ValidationError::UnboundPlaceholder {
            placeholder,
            role: role.to_string(),
        }
    })
}

/// Weighted pick; `None` if there is nothing with positive weight.
fn pick_weighted<'a, T>(
    items: &[&'a T],
    weight: impl Fn(&T) -> u32,
    rng: &mut StdRng,
) -> Option<&'a T> {
    let total: u64 = items.iter().map(|item| weight(item) as u64).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for &item in items {
        let w = weight(item) as u64;
        if roll < w {
            return Some(item);
        }
        roll -= w;
    }
    None
}

fn pick_alternative<'a>(alternatives: &'a [Alternative], rng: &mut StdRng) -> Option<&'a Alternative> {
    let refs: Vec<&Alternative> = alternatives.iter().collect();
    pick_weighted(&refs, |alt| alt.weight, rng)
}

fn pick_key_item(pack: &ThemePack, rng: &mut StdRng) -> String {
    if pack.key_items.is_empty() {
        return DEFAULT_KEY_ITEM.to_string();
    }
    let index = rng.gen_range(0..pack.key_items.len());
    pack.key_items[index].clone()
}

fn select_fragment<'a>(
    pack: &'a ThemePack,
    role: NarrativeRole,
    ctx: &SelectionContext,
    rng: &mut StdRng,
) -> Result<&'a StoryFragment, ValidationError> {
    let candidates: Vec<&StoryFragment> = pack
        .fragments_for(role)
        .filter(|f| ctx.matches(&f.requires, &f.excludes))
        .collect();

    let chosen = pick_weighted(&candidates, |f| f.weight, rng).ok_or_else(|| {
        ValidationError::NoFragmentForRole {
            theme: pack.theme.key().to_string(),
            role: role.name().to_string(),
        }
    })?;

    debug!(
        theme = %pack.theme,
        role = %role,
        candidates = candidates.len(),
        "selected fragment"
    );
    Ok(chosen)
}

/// Pick two resolutions with distinct choice labels and render them as the
/// branch choices.
fn select_choices(
    pack: &ThemePack,
    ctx: &SelectionContext,
    bindings: &Bindings,
    rng: &mut StdRng,
) -> Result<[Choice; 2], ValidationError> {
    let mut candidates: Vec<&StoryFragment> = Vec::new();
    for fragment in pack.fragments_for(NarrativeRole::Resolution) {
        let Some(label) = fragment.choice.as_deref().map(str::trim) else {
            continue;
        };
        if label.is_empty()
            || fragment.weight == 0
            || !ctx.matches(&fragment.requires, &fragment.excludes)
        {
            continue;
        }
        let duplicate = candidates
            .iter()
            .any(|c| c.choice.as_deref().map(str::trim) == Some(label));
        if !duplicate {
            candidates.push(fragment);
        }
    }

    let not_enough = |found| ValidationError::NotEnoughChoices {
        theme: pack.theme.key().to_string(),
        found,
    };
    if candidates.len() < 2 {
        return Err(not_enough(candidates.len()));
    }

    let first = pick_weighted(&candidates, |f| f.weight, rng)
        .ok_or_else(|| not_enough(candidates.len()))?;
    let rest: Vec<&StoryFragment> = candidates
        .iter()
        .copied()
        .filter(|f| !std::ptr::eq(*f, first))
        .collect();
    let second = pick_weighted(&rest, |f| f.weight, rng)
        .ok_or_else(|| not_enough(candidates.len()))?;

    let mut choices = Vec::with_capacity(2);
    for fragment in [first, second] {
        choices.push(Choice {
            label: fragment
                .choice
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            resolution: render(&fragment.template, bindings, NarrativeRole::Resolution.name())?,
        });
    }
    let second = choices.pop();
    let first = choices.pop();
    match (first, second) {
        (Some(first), Some(second)) => Ok([first, second]),
        _ => Err(not_enough(candidates.len())),
    }
}
