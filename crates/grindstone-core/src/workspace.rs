//! On-disk problem workspace.
//!
//! Each problem gets a directory under the configured problems root
//! holding the rendered statement, the solution file, free-form notes,
//! machine-readable metadata, and a debug log of failing harness runs.
//! The statement and metadata are rewritten on every fetch; the
//! solution and notes are created once and never overwritten.

use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::store::{fmt_ts, Problem};

pub const SOLUTION_FILE: &str = "solution.py";
pub const README_FILE: &str = "README.md";
pub const NOTES_FILE: &str = "notes.md";
pub const META_FILE: &str = "meta.json";
pub const DEBUG_LOG_FILE: &str = "debug.log";

const FALLBACK_STUB: &str = "class Solution:\n    pass\n";
const NOTES_SEED: &str = "# Notes\n\n- Mistakes:\n- Insights:\n";

/// Directory for one problem.
pub fn problem_dir(base: &Path, slug: &str) -> PathBuf {
    base.join(slug)
}

pub fn solution_path(dir: &Path) -> PathBuf {
    dir.join(SOLUTION_FILE)
}

/// Create the problem directory and its files. README.md is rewritten
/// each time; solution.py and notes.md are only created when missing.
pub fn ensure_problem_files(dir: &Path, problem: &Problem) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(README_FILE), render_readme(problem))?;

    let solution = dir.join(SOLUTION_FILE);
    if !solution.exists() {
        let stub = if problem.code_stub.trim().is_empty() {
            FALLBACK_STUB
        } else {
            &problem.code_stub
        };
        let mut body = stub.to_string();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        std::fs::write(&solution, body)?;
    }

    let notes = dir.join(NOTES_FILE);
    if !notes.exists() {
        std::fs::write(&notes, NOTES_SEED)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ProblemMeta<'a> {
    slug: &'a str,
    frontend_id: &'a str,
    title: &'a str,
    difficulty: &'a str,
    topics: &'a [String],
    status: &'a str,
    time_spent_sec: i64,
    last_submit: &'a str,
    runtime: &'a str,
    memory: &'a str,
    updated_at: String,
}

/// Rewrite meta.json from the current problem row. Progress fields
/// ride along so the snapshot tracks timer and submission changes,
/// not just fetched metadata.
pub fn write_meta(dir: &Path, problem: &Problem) -> Result<()> {
    let meta = ProblemMeta {
        slug: &problem.slug,
        frontend_id: &problem.frontend_id,
        title: &problem.title,
        difficulty: problem.difficulty.as_str(),
        topics: &problem.topics,
        status: problem.status.as_str(),
        time_spent_sec: problem.time_spent_sec,
        last_submit: &problem.last_result,
        runtime: &problem.last_runtime,
        memory: &problem.last_memory,
        updated_at: fmt_ts(problem.updated_at),
    };
    let mut raw = serde_json::to_string_pretty(&meta)?;
    raw.push('\n');
    std::fs::write(dir.join(META_FILE), raw)?;
    Ok(())
}

/// Append a timestamped block of harness output to debug.log.
pub fn append_debug_log(dir: &Path, output: &str) -> Result<()> {
    let chunk = format!("\n[{}]\n{}\n", fmt_ts(Utc::now()), output.trim_end());
    append(&dir.join(DEBUG_LOG_FILE), &chunk)?;
    Ok(())
}

/// Append one bullet to notes.md, stamped with the local time.
pub fn append_note_line(dir: &Path, text: &str, tags: &[String]) -> Result<()> {
    let mut line = format!("- [{}] {}", Local::now().format("%Y-%m-%d %H:%M"), text);
    if !tags.is_empty() {
        line.push_str(&format!(" (tags: {})", tags.join(", ")));
    }
    line.push('\n');
    append(&dir.join(NOTES_FILE), &line)?;
    Ok(())
}

/// Open a file in `$EDITOR`, falling back to vi.
pub fn open_in_editor(path: &Path) -> Result<()> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = std::process::Command::new(&editor).arg(path).status()?;
    if !status.success() {
        return Err(CoreError::Custom(format!("{editor} exited with {status}")));
    }
    Ok(())
}

fn append(path: &Path, chunk: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(chunk.as_bytes())
}

fn render_readme(p: &Problem) -> String {
    let title = if p.frontend_id.is_empty() {
        p.title.clone()
    } else {
        format!("{}. {}", p.frontend_id, p.title)
    };
    let topics = if p.topics.is_empty() {
        "-".to_string()
    } else {
        p.topics.join(", ")
    };
    format!(
        "# {title}\n\n- Difficulty: {}\n- Topics: {topics}\n- Status: {}\n\n\
         ## Statement\n\n{}\n\n## Examples\n\n```\n{}\n```\n",
        p.difficulty,
        p.status,
        p.statement.trim_end(),
        p.examples.trim_end(),
    )
}
