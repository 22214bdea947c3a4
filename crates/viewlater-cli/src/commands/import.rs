//! Bookmark import command

use std::path::Path;

use anyhow::{Context, Result};

use viewlater_core::{load_bookmarks, Persistence, Store, IMPORTED_GROUP};

use crate::output::{Output, OutputFormat};

/// Import every bookmark in a browser bookmark file
pub fn import<P: Persistence>(store: &mut Store<P>, path: &Path, output: &Output) -> Result<()> {
    let tree = load_bookmarks(path)?;
    let imported = store
        .import_bookmarks(&tree)
        .context("Failed to import bookmarks")?;

    match output.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({"imported": imported, "group": IMPORTED_GROUP})
        ),
        OutputFormat::Quiet => println!("{}", imported),
        OutputFormat::Human if imported > 0 => output.success(&format!(
            "Imported {} bookmark(s) into \"{}\"",
            imported, IMPORTED_GROUP
        )),
        OutputFormat::Human => output.message("No new bookmarks found to import."),
    }

    Ok(())
}
