//! Link command handlers

use anyhow::{bail, Context, Result};
use clap::Args;

use viewlater_core::{
    ActivePage, EditSession, GroupChoice, LinkEdit, LinkError, NewLink, Persistence, Query, Store,
};

use crate::editor::{confirm, edit_text, prompt_with_default};
use crate::metadata::fetch_title;
use crate::output::Output;

/// Group selection flags shared by `save` and `edit`
#[derive(Args, Debug, Default)]
pub struct GroupArgs {
    /// Put the link in an existing group
    #[arg(short, long, conflicts_with_all = ["new_group", "ungroup"])]
    pub group: Option<String>,
    /// Put the link in a new group
    #[arg(long, conflicts_with = "ungroup")]
    pub new_group: Option<String>,
    /// Remove the link from its group
    #[arg(long)]
    pub ungroup: bool,
}

impl GroupArgs {
    /// The selection made on the command line, if any
    fn choice(&self) -> Option<GroupChoice> {
        if let Some(name) = &self.group {
            Some(GroupChoice::Existing(name.clone()))
        } else if let Some(name) = &self.new_group {
            Some(GroupChoice::New(name.clone()))
        } else if self.ungroup {
            Some(GroupChoice::Ungrouped)
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// URL to save
    pub url: String,
    /// Title (fetched from the page when omitted)
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Notes
    #[arg(short, long)]
    pub notes: Option<String>,
    #[command(flatten)]
    pub group: GroupArgs,
    /// Don't fetch the page title
    #[arg(long)]
    pub no_fetch: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Link ID (full ID or prefix)
    pub id: String,
    /// New title
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// New notes
    #[arg(short, long, conflicts_with = "editor")]
    pub notes: Option<String>,
    #[command(flatten)]
    pub group: GroupArgs,
    /// Edit notes in $EDITOR
    #[arg(short, long)]
    pub editor: bool,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only links in this group
    #[arg(short, long)]
    pub group: Option<String>,
    /// Show every match instead of the most recent few
    #[arg(short, long)]
    pub all: bool,
    /// Number of links to show
    #[arg(short, long, value_parser = parse_limit)]
    pub limit: Option<usize>,
}

/// `--limit` takes a positive number
fn parse_limit(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("limit must be at least 1".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}

/// Save a new link
pub async fn save<P: Persistence>(
    store: &mut Store<P>,
    args: SaveArgs,
    output: &Output,
) -> Result<()> {
    let group = match args.group.choice() {
        Some(choice) => check_group_exists(store, choice)?,
        None => GroupChoice::Ungrouped,
    };

    let title = match args.title {
        Some(title) => Some(title),
        None if store.config().fetch_titles && !args.no_fetch => fetch_title(&args.url).await,
        None => None,
    };

    let mut page = ActivePage::new(&args.url);
    if let Some(title) = title {
        page = page.with_title(title);
    }

    let input = NewLink::prefilled(&page)
        .notes(args.notes.unwrap_or_default())
        .group(group);
    let link = store.save_link(&page, input)?;

    output.success(&format!("Saved link: {}", link.id));
    output.print_link(&link);
    Ok(())
}

/// List the most recent links
pub fn list<P: Persistence>(store: &mut Store<P>, args: ListArgs, output: &Output) -> Result<()> {
    let query = build_query(store, String::new(), args);
    let result = store.query(&query)?;
    output.print_results(&result);
    Ok(())
}

/// Search links by title, URL, notes or group
pub fn search<P: Persistence>(
    store: &mut Store<P>,
    text: String,
    args: ListArgs,
    output: &Output,
) -> Result<()> {
    let query = build_query(store, text, args);
    let result = store.query(&query)?;
    output.print_results(&result);
    Ok(())
}

/// Show a single link
pub fn show<P: Persistence>(store: &mut Store<P>, id: String, output: &Output) -> Result<()> {
    let id = store.resolve_id(&id)?;
    let link = store
        .get_link(&id)?
        .ok_or(LinkError::RecordNotFound(id))?;

    output.print_link(&link);
    Ok(())
}

/// Edit a link's title, notes and group
pub fn edit<P: Persistence>(store: &mut Store<P>, args: EditArgs, output: &Output) -> Result<()> {
    let id = store.resolve_id(&args.id)?;
    let mut session = EditSession::new();
    let current = store.begin_edit(&mut session, &id)?;

    let original = LinkEdit::from_record(&current);
    let mut edit = original.clone();
    let flags_given = args.title.is_some()
        || args.notes.is_some()
        || args.group.choice().is_some()
        || args.editor;

    if let Some(title) = args.title {
        edit.title = title;
    }
    if let Some(notes) = args.notes {
        edit.notes = notes;
    }
    if let Some(choice) = args.group.choice() {
        edit.group = check_group_exists(store, choice)?;
    }
    if args.editor {
        edit.notes = edit_text(&edit.notes).context("Failed to edit notes")?;
    }

    if !flags_given {
        if !output.should_prompt() {
            session.cancel()?;
            bail!("Nothing to change. Pass --title, --notes or a group flag.");
        }

        println!("Editing link: {}", current.id);
        println!("Press Enter to keep current value, or type new value.\n");

        if let Some(title) = prompt_with_default("Title", &current.title)? {
            edit.title = title;
        }
        if let Some(notes) = prompt_with_default("Notes", &current.notes)? {
            edit.notes = notes;
        }
        let groups = store.groups()?;
        if !groups.is_empty() {
            println!("Groups: {}", groups.join(", "));
        }
        if let Some(answer) = prompt_with_default("Group ('-' for none)", &current.group)? {
            edit.group = match answer.as_str() {
                "-" => GroupChoice::Ungrouped,
                name if groups.iter().any(|g| g == name) => GroupChoice::Existing(answer),
                _ => GroupChoice::New(answer),
            };
        }
    }

    if edit == original {
        session.cancel()?;
        output.message("No changes.");
        return Ok(());
    }

    let updated = store.commit_edit(&mut session, edit)?;
    output.success("Link updated");
    output.print_link(&updated);
    Ok(())
}

/// Delete a link
pub fn delete<P: Persistence>(store: &mut Store<P>, id: String, output: &Output) -> Result<()> {
    let id = match store.resolve_id(&id) {
        Ok(id) => id,
        Err(e @ LinkError::RecordNotFound(_)) => {
            output.warning(&e.to_string());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let Some(link) = store.get_link(&id)? else {
        output.warning(&LinkError::RecordNotFound(id).to_string());
        return Ok(());
    };

    if output.should_prompt() {
        println!("Delete link: {} - {}", link.id.short(), link.display_title());
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match store.delete_link(&id) {
        Ok(_) => output.success(&format!("Deleted link: {}", id)),
        Err(e) if e.is_warning() => output.warning(&e.to_string()),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Open a link in the default browser
pub fn open<P: Persistence>(store: &mut Store<P>, id: String, output: &Output) -> Result<()> {
    let id = store.resolve_id(&id)?;
    let link = store
        .get_link(&id)?
        .ok_or_else(|| LinkError::RecordNotFound(id.clone()))?;

    ::open::that(&link.url).with_context(|| format!("Failed to open {}", link.url))?;
    output.message(&format!("Opened {}", link.url));
    Ok(())
}

fn build_query<P: Persistence>(store: &Store<P>, text: String, args: ListArgs) -> Query {
    let mut query = store.default_query().search(text).show_all(args.all);
    if let Some(group) = args.group {
        query = query.group(group);
    }
    if let Some(limit) = args.limit {
        query = query.limit(limit);
    }
    query
}

/// Reject `--group` for a group nobody uses yet
fn check_group_exists<P: Persistence>(
    store: &mut Store<P>,
    choice: GroupChoice,
) -> Result<GroupChoice> {
    if let GroupChoice::Existing(name) = &choice {
        let groups = store.groups()?;
        if !groups.iter().any(|g| g == name.trim()) {
            bail!(
                "No group named '{}'. Use --new-group to create it.",
                name.trim()
            );
        }
    }
    Ok(choice)
}
