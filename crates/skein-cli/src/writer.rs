//! Serialize ordered passages back into container files.
//!
//! Twee outputs get a `:: name [tags]` header per passage (names and
//! tags escaped, tags sorted); non-Twee outputs (scripts, stylesheets)
//! carry bodies only. Passages are separated by one blank line.

use std::fs;
use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use skein_core::passage::{Passage, escape};
use tracing::info;

/// Render the header line for one passage.
fn header(passage: &Passage) -> String {
    let mut line = format!(":: {}", escape(&passage.name));
    if !passage.tags.is_empty() {
        let mut tags: Vec<String> = passage.tags.iter().map(|tag| escape(tag)).collect();
        tags.sort_unstable();
        line.push_str(&format!(" [{}]", tags.join(" ")));
    }
    line
}

/// Render one output file's full content.
#[must_use]
pub fn render_file(file: &str, names: &[String], passages: &IndexMap<String, Passage>) -> String {
    let twee = file.ends_with(".twee");
    let mut chunks: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let Some(passage) = passages.get(name) else {
            continue;
        };
        let mut lines: Vec<String> = Vec::with_capacity(passage.body.len() + 1);
        if twee {
            lines.push(header(passage));
        }
        lines.extend(passage.body.iter().cloned());
        chunks.push(lines.join("\n"));
    }
    let mut content = chunks.join("\n\n");
    if !content.is_empty() {
        content.push('\n');
    }
    content
}

/// Write every output file under `dir`, creating it if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or a file
/// cannot be written.
pub fn write_split(
    dir: &Path,
    files: &IndexMap<String, Vec<String>>,
    passages: &IndexMap<String, Passage>,
) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    for (file, names) in files {
        let path = dir.join(file);
        let content = render_file(file, names, passages);
        fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        info!(file = %path.display(), passages = names.len(), "wrote output file");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
