//! Interactive input
//!
//! Prompts on stdin and opens $EDITOR for editing link notes.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::Command;

/// Open content in the user's preferred editor
///
/// Uses $EDITOR, $VISUAL, or falls back to common editors.
pub fn edit_text(initial_content: &str) -> Result<String> {
    let editor = find_editor()?;

    let temp_path = env::temp_dir().join(format!("viewlater_notes_{}.txt", std::process::id()));
    fs::write(&temp_path, initial_content)
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let status = Command::new(&editor)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor));

    let result = match status {
        Ok(status) if status.success() => fs::read_to_string(&temp_path)
            .with_context(|| format!("Failed to read edited file: {:?}", temp_path)),
        Ok(_) => Err(anyhow::anyhow!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        )),
        Err(e) => Err(e),
    };

    let _ = fs::remove_file(&temp_path);
    result
}

/// Find the user's preferred editor
fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.is_empty() {
                return Ok(editor);
            }
        }
    }

    for editor in ["nano", "vim", "vi", "emacs", "notepad"] {
        if command_exists(editor) {
            return Ok(editor.to_string());
        }
    }

    bail!(
        "No editor found. Set $EDITOR environment variable.\n\
         Example: export EDITOR=nano"
    )
}

/// Check if a command exists in PATH
fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

/// Prompt with a default value, returns None if user keeps default
pub fn prompt_with_default(prompt: &str, default: &str) -> Result<Option<String>> {
    if default.is_empty() {
        print!("{}: ", prompt);
    } else {
        print!("{} [{}]: ", prompt, default);
    }
    io::stdout().flush()?;

    read_answer(io::stdin().lock())
}

/// Read one line, `None` when it is blank
fn read_answer(mut reader: impl BufRead) -> Result<Option<String>> {
    let mut input = String::new();
    reader.read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.to_string()))
    }
}
