//! Console commands. One line of input maps to one [`Command`].

mod ask;
mod config;
mod manage;
mod sources;
mod upload;

use anyhow::Result;

use crate::docs::filter::ListFilter;
use crate::docs::types::DocId;
use crate::docs::{Desk, RequestKind};
use crate::sync::lifecycle::Phase;

pub const HELP: &str = "\
Commands:
  list [all|selected|unselected]   set filter and reload
  refresh                          reload with the active filter
  show                             print documents, selection and answer
  upload <path>                    upload a PDF
  retry                            re-upload the file from a failed upload
  rename <id> <name...>            rename a document
  select <id> [on|off]             mark or unmark a document
  delete <id>                      delete a document
  use <id>                         pick the document to ask about
  ask <question...>                ask about the picked document
  flush                            send pending edits now
  config [debounce_ms <n>]         show or change sync settings
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(ListFilter),
    Refresh,
    Show,
    Upload(String),
    Retry,
    Rename { id: DocId, name: String },
    Select { id: DocId, on: bool },
    Delete(DocId),
    Use(DocId),
    Ask(String),
    Flush,
    Config(Option<(String, u64)>),
    Help,
    Quit,
}

fn parse_id(word: Option<&str>) -> Result<DocId, String> {
    let word = word.ok_or("missing document id")?;
    word.trim_start_matches('#')
        .parse()
        .map_err(|_| format!("`{}` is not a document id", word))
}

/// Text after the first `n` words, untouched.
fn rest_after(line: &str, n: usize) -> String {
    let mut rest = line.trim_start();
    for _ in 0..n {
        rest = rest
            .split_once(char::is_whitespace)
            .map(|(_, r)| r.trim_start())
            .unwrap_or("");
    }
    rest.trim_end().to_string()
}

impl Command {
    /// Parse one input line. `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };

        let head = head.to_lowercase();
        let cmd = match head.as_str() {
            "list" | "ls" => Command::List(match words.next() {
                Some(mode) => mode.parse()?,
                None => ListFilter::All,
            }),
            "refresh" => Command::Refresh,
            "show" => Command::Show,
            "upload" => {
                let path = rest_after(line, 1);
                if path.is_empty() {
                    return Err("usage: upload <path>".into());
                }
                Command::Upload(path)
            }
            "retry" => Command::Retry,
            "rename" => {
                let id = parse_id(words.next())?;
                let name = rest_after(line, 2);
                if name.is_empty() {
                    return Err("usage: rename <id> <name>".into());
                }
                Command::Rename { id, name }
            }
            "select" | "unselect" => {
                let id = parse_id(words.next())?;
                let on = match (head.as_str(), words.next()) {
                    ("unselect", _) => false,
                    (_, None | Some("on" | "true" | "yes")) => true,
                    (_, Some("off" | "false" | "no")) => false,
                    (_, Some(other)) => return Err(format!("expected on or off, got `{}`", other)),
                };
                Command::Select { id, on }
            }
            "delete" | "rm" => Command::Delete(parse_id(words.next())?),
            "use" => Command::Use(parse_id(words.next())?),
            "ask" => Command::Ask(rest_after(line, 1)),
            "flush" => Command::Flush,
            "config" => match (words.next(), words.next()) {
                (None, _) => Command::Config(None),
                (Some(key), Some(value)) => {
                    let value = value
                        .parse()
                        .map_err(|_| format!("`{}` is not a number", value))?;
                    Command::Config(Some((key.to_string(), value)))
                }
                (Some(_), None) => {
                    return Err("provide both key and value, e.g. `config debounce_ms 600`".into())
                }
            },
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("unknown command `{}` (try `help`)", other)),
        };
        Ok(Some(cmd))
    }
}

/// Run a command against the desk and return what to print.
pub async fn dispatch(desk: &mut Desk, cmd: Command) -> Result<String> {
    Ok(match cmd {
        Command::List(filter) => sources::list(desk, filter),
        Command::Refresh => sources::refresh(desk),
        Command::Show => sources::show(desk),
        Command::Upload(path) => upload::upload(desk, &path).await?,
        Command::Retry => upload::retry(desk),
        Command::Rename { id, name } => manage::rename(desk, id, name),
        Command::Select { id, on } => manage::select(desk, id, on),
        Command::Delete(id) => manage::delete(desk, id),
        Command::Use(id) => ask::use_document(desk, id),
        Command::Ask(question) => ask::ask(desk, &question),
        Command::Flush => manage::flush(desk).await,
        Command::Config(change) => config::config(desk, change),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    })
}

/// Describe the outcome of a just-applied settlement, if it changed what the
/// user sees (stale settlements print nothing).
pub fn settled(desk: &Desk, kind: RequestKind) -> Option<String> {
    match kind {
        RequestKind::List => match desk.listing().phase() {
            Phase::Success(count) => Some(format!(
                "Loaded {} document(s) [{}]\n{}",
                count,
                desk.active_filter(),
                sources::render_documents(desk)
            )),
            Phase::Failed(msg) => Some(format!("Error fetching documents: {}", msg)),
            _ => None,
        },
        RequestKind::Upload => match desk.uploading().phase() {
            Phase::Success(id) => {
                let name = desk.get(*id).map(|d| d.name.as_str()).unwrap_or("");
                Some(format!("Uploaded #{} {}", id, name))
            }
            Phase::Failed(msg) => Some(format!(
                "Upload failed: {} (file kept, use `retry`)",
                msg
            )),
            _ => None,
        },
        RequestKind::Delete(id) => match desk.deleting(id).map(|l| l.phase()) {
            Some(Phase::Success(())) => Some(format!("Deleted #{}", id)),
            Some(Phase::Failed(msg)) => Some(format!("Delete of #{} failed: {}", id, msg)),
            _ => None,
        },
        RequestKind::Ask => match desk.asking().phase() {
            Phase::Success(answer) => Some(ask::render_answer(answer)),
            Phase::Failed(msg) => Some(format!("Error: {}", msg)),
            _ => None,
        },
    }
}
