//! Shared setup and assertions for the integration tests.

#![allow(dead_code)]

pub mod diagnostic_helpers;
pub mod project_helpers;
