//! Status command handler

use anyhow::Result;

use viewlater_core::{Persistence, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show<P: Persistence>(store: &mut Store<P>, output: &Output) -> Result<()> {
    let stats = store.stats();
    let links = store.link_count()?;
    let groups = store.groups()?.len();
    let config = store.config();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "links_file": config.links_path(),
                    "storage": {
                        "exists": stats.exists,
                        "size": stats.size
                    },
                    "counts": {
                        "links": links,
                        "groups": groups
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", links);
        }
        OutputFormat::Human => {
            println!("viewlater Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.links_path().display());
            if stats.exists {
                println!("  Size:     {}", stats.size_human());
            } else {
                println!("  Size:     (nothing saved yet)");
            }
            println!();
            println!("Contents:");
            println!("  Links:  {}", links);
            println!("  Groups: {}", groups);
        }
    }

    Ok(())
}
