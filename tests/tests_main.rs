#[path = "helpers/mod.rs"]
mod helpers;

#[path = "hir/mod.rs"]
mod hir;

#[path = "incremental/mod.rs"]
mod incremental;

#[path = "project/mod.rs"]
mod project;
