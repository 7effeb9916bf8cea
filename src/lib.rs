//! # Palate (library root)
//!
//! Palate is a mood-aware restaurant menu chatbot: it ranks items from a
//! fixed, pre-indexed catalog against a natural-language query, using the
//! customer's detected emotional state to bias both the ranking and the tone
//! of the reply.
//!
//! The crate is organized around one orchestration type and a set of small,
//! testable collaborators:
//!
//! - [`catalog`]: the immutable catalog store loaded once at startup.
//! - [`mood`]: mood enumeration, static preference/tone tables, query
//!   enhancement, and the LLM-backed classifier.
//! - [`ranker`]: linear-scan cosine ranking with the mood boost.
//! - [`prompt`]: context formatting and mood-keyed system prompts.
//! - [`session`]: the conversation session, holding turn history, mood
//!   persistence, and the per-message classify/rank/format/generate pipeline.
//! - [`client`] / [`encoder`]: the two external collaborators (chat
//!   completion and text embedding) behind narrow trait seams.
//! - [`config`], [`commands`], [`repl`], [`error`]: configuration, CLI,
//!   interactive surface, and the error taxonomy.
//!
//! The catalog itself is produced by an external ingestion pipeline
//! (PDF/image extraction); this crate only consumes its JSON output.

use directories::ProjectDirs;
use std::error::Error;

pub mod catalog;
pub mod client;
pub mod commands;
pub mod config;
pub mod encoder;
pub mod error;
pub mod mood;
pub mod prompt;
pub mod ranker;
pub mod repl;
pub mod session;

/// Return the per-platform configuration directory used by Palate.
///
/// Uses [`directories::ProjectDirs`] with the application triple
/// `("com", "palate", "palate")`, e.g. `~/.config/palate` on Linux (XDG).
/// The directory is **not** created by this function.
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be
/// determined.
pub fn config_dir() -> Result<std::path::PathBuf, Box<dyn Error>> {
    let proj_dirs = ProjectDirs::from("com", "palate", "palate")
        .ok_or("Unable to determine config directory")?;
    Ok(proj_dirs.config_dir().to_path_buf())
}
