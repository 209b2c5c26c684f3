#![doc = "contentful-audit-core: core logic library for contentful-audit."]

//! This crate contains the data model, API contracts and report pipelines used to
//! audit a Contentful space. The binary crate only parses arguments, loads
//! configuration and wires real HTTP clients into the pipelines below.
//!
//! # Usage
//! Add this as a dependency for anything that needs to fetch, compare or report on
//! Contentful entries and content types.

pub mod config;
pub mod content_model;
pub mod contract;
pub mod delivery;
pub mod duplicate_titles;
pub mod first_line;
pub mod http;
pub mod id_lists;
pub mod locale;
pub mod published;
pub mod report;
pub mod rich_text;
