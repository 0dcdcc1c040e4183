//! Composition runtime: templates, bindings, fragment tables, the composer
//! and the fragment linter.

pub mod bindings;
pub mod composer;
pub mod fragment;
pub mod lint;
pub mod template;
