//! # ardlint-rules
//!
//! Built-in rule catalogue for ardlint.
//!
//! Rules are constant [`Descriptor`]s grouped by project type. The catalogue
//! order is fixed: for each project type, existence and structure rules run
//! before format rules, then the individual field rules, then documentation
//! and code rules.
//!
//! ## Available Rules
//!
//! | Codes | Project type | Checks |
//! |-------|--------------|--------|
//! | SS001–SS007 | sketch | primary file, file and folder names, `.pde`, `src` case |
//! | SM001 | sketch | `sketch.json` is valid JSON |
//! | SD001–SD002, SC001 | sketch | readme, license, `Arduino.h` include case |
//! | LS001–LS016 | library | validity, names, stray files, symlinks, headers, `src`/`extras`/`examples` folders |
//! | LP001–LP005 | library | `library.properties` presence, file name and format |
//! | LP006–LP057 | library | `library.properties` fields: name, version, author, maintainer, email, sentence, paragraph, category, url, architectures, depends, dot_a_linkage, includes, precompiled, ldflags |
//! | LD001–LD002, LC001 | library | readme, license, `Arduino.h` include case |
//! | PS001, PF001–PF003 | platform | `boards.txt` presence, configuration file format |
//! | PD001–PD002 | platform | readme, license |
//! | IS001–IS003 | package index | index file presence and file name |
//! | IF001–IF002 | package index | JSON and index structure |
//! | IP001–IP003 | package index | package names, platform versions and archive URLs |
//!
//! ## Usage
//!
//! ```ignore
//! use ardlint_core::Engine;
//!
//! let engine = Engine::builder()
//!     .rules(ardlint_rules::all_rules())
//!     .build()?;
//! let report = engine.run(&projects);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalogue;
mod library;
mod library_properties;
mod package_index;
mod platform;
mod sketch;
mod util;

pub use catalogue::{all_rules, descriptor, descriptors, rules_for};

/// Re-export core types for convenience.
pub use ardlint_core::{Descriptor, Rule, RuleBox};
