//! shaderdex - index, tag and search a local corpus of shader metadata.
//!
//! The corpus is a directory of per-shader JSON documents plus archive
//! directories holding tag files (`search_results/<tag>`) and capability
//! lists (`requires_<capability>.txt`). shaderdex builds a cached index
//! over the documents, answers conjunctive metadata queries, and can write
//! mapped tags and inferred resource requirements back into the corpus.
//!
//! # Quick start
//!
//! ```no_run
//! use std::collections::BTreeSet;
//!
//! use shaderdex::{CacheStore, Capability, CorpusLayout, DataDir, ShaderSearcher};
//! use shaderdex::search::Query;
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let searcher = ShaderSearcher::new(
//!     CorpusLayout::default(),
//!     CacheStore::open(&data_dir.cache_db()),
//! );
//!
//! let query = Query {
//!     author: Some("iq".to_string()),
//!     requires: BTreeSet::from([Capability::Sound]),
//!     ..Query::default()
//! };
//!
//! for r in searcher.search(&query, false) {
//!     println!("{} {} by {}", r.id, r.name, r.username);
//! }
//! ```

pub mod cache;
pub mod capability;
pub mod cli;
pub mod data_dir;
pub mod document;
pub mod error;
pub mod indexer;
pub mod layout;
pub mod mutator;
pub mod record;
pub mod requirements;
pub mod requires_file;
pub mod search;
pub mod searcher;
pub mod shader_id;
pub mod tags;
pub mod text_util;
pub mod walker;
pub mod web;

pub use cache::CacheStore;
pub use capability::Capability;
pub use data_dir::DataDir;
pub use error::{Error, Result};
pub use layout::CorpusLayout;
pub use record::{ShaderIndex, ShaderRecord};
pub use searcher::ShaderSearcher;
