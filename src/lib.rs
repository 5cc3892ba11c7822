//! # namesfile
//!
//! A library for parsing the attribute schema (".names") files of
//! predictive-modeling datasets into validated attribute tables.
//!
//! # Features
//!
//! - Parse names files into typed, cross-validated attribute tables.
//! - Full delimiter handling: pipe comments, backslash escapes, whitespace
//!   collapsing, trailing periods and the two-character `:=`.
//! - Continuous, discrete (enumerated or counted), date, time, timestamp,
//!   ignored and label attributes, plus derived attributes defined by
//!   formulas with automatic dependency extraction.
//! - Bulk include/exclude directives and case-weight handling.
//! - Every problem in a file is surfaced in a single pass; a load either
//!   yields a fully valid table or a complete list of diagnostics.
//!
//! # Example
//!
//! ```rust
//! use namesfile::parser::parse_names;
//!
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!
//!     let names = r#"
//! outcome:
//! outcome: continuous
//! size: continuous
//! weather: sunny, rainy, cloudy | declared values get an N/A sentinel
//! comfort := size / 2
//! "#;
//!     let table = parse_names(names)?;
//!
//!     println!("target: {}", table.target_attribute().name);
//!     for att in &table.attributes {
//!         println!("{}: {:?}", att.name, att.kind);
//!     }
//!     Ok(())
//! }
//! ```
pub mod definition;
pub mod diagnostics;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod test_utils;
