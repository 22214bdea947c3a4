//! Group command handlers

use anyhow::Result;

use viewlater_core::{Persistence, Store};

use crate::output::Output;

/// List all groups with link counts
pub fn list<P: Persistence>(store: &mut Store<P>, output: &Output) -> Result<()> {
    let groups = store.group_counts()?;
    output.print_groups(&groups);
    Ok(())
}
