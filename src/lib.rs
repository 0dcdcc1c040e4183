//! Adventure Engine: personalised children's stories from templates.
//!
//! A `StoryComposer` turns a `StoryRequest` (the child, a theme, companions
//! and a reading mode) into a `Story` by picking one fragment per narrative
//! role from a theme pack and filling its placeholders. Composition is
//! deterministic and performs no I/O.

pub mod core;
pub mod schema;
pub mod themes;

pub use crate::core::composer::{ComposeError, StoryComposer, StoryComposerBuilder};
pub use crate::schema::request::{Companion, Pronouns, StoryRequest, ValidationError};
pub use crate::schema::story::{BranchPoint, Choice, Segment, Story};
pub use crate::schema::theme::{NarrativeRole, StoryMode, Theme};
