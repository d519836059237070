use std::fs::File;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::catalog::{DetailClient, MovieId, SearchClient, SummaryRecord, TitleLanguage};
use crate::export::{ExportConfiguration, IdKind, Table};
use crate::store::{Rating, SelectionStore};

use super::view::{write_detail, write_search_results, write_selection_list};

const HELP: &str = "\
Commands:
  search <query>        list matches, most popular first
  pick <n>              select the n-th match of the last search
  add <id>              select a movie by TMDb id
  show <id>             show details without selecting
  rate <id> <1-10>      set a rating
  review <id> <text>    set a review
  clear <id>            drop rating and review
  remove <id>           drop a selection
  list                  show selections
  id tmdb|imdb          identifier column
  lang original|localized
  toggle title|year|rating|review
  export [file]         write the CSV (stdout when no file)
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToggleField {
    Title,
    Year,
    Rating,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Search(String),
    Pick(usize),
    Add(MovieId),
    Show(MovieId),
    Rate(MovieId, Rating),
    Review(MovieId, String),
    Clear(MovieId),
    Remove(MovieId),
    List,
    IdKind(IdKind),
    Lang(TitleLanguage),
    Toggle(ToggleField),
    Export(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub(crate) fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => {
            if rest.is_empty() {
                return Err("Empty search!".to_string());
            }
            SessionCommand::Search(rest.to_string())
        }
        "pick" | "p" => {
            let n = rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("usage: pick <n>, got {rest:?}"))?;
            SessionCommand::Pick(n)
        }
        "add" => SessionCommand::Add(rest.parse()?),
        "show" => SessionCommand::Show(rest.parse()?),
        "rate" => {
            let (id, value) = split_id(rest, "rate <id> <1-10>")?;
            let value = value
                .parse::<i64>()
                .map_err(|_| format!("invalid rating: {value:?}"))?;
            let rating = Rating::new(value).map_err(|err| err.to_string())?;
            SessionCommand::Rate(id, rating)
        }
        "review" => {
            let (id, text) = split_id(rest, "review <id> <text>")?;
            SessionCommand::Review(id, text.to_string())
        }
        "clear" => SessionCommand::Clear(rest.parse()?),
        "remove" | "rm" => SessionCommand::Remove(rest.parse()?),
        "list" | "ls" => SessionCommand::List,
        "id" => match rest.to_ascii_lowercase().as_str() {
            "tmdb" => SessionCommand::IdKind(IdKind::Tmdb),
            "imdb" => SessionCommand::IdKind(IdKind::Imdb),
            _ => return Err("usage: id tmdb|imdb".to_string()),
        },
        "lang" => match rest.to_ascii_lowercase().as_str() {
            "original" => SessionCommand::Lang(TitleLanguage::Original),
            "localized" | "english" => SessionCommand::Lang(TitleLanguage::Localized),
            _ => return Err("usage: lang original|localized".to_string()),
        },
        "toggle" => match rest.to_ascii_lowercase().as_str() {
            "title" => SessionCommand::Toggle(ToggleField::Title),
            "year" => SessionCommand::Toggle(ToggleField::Year),
            "rating" => SessionCommand::Toggle(ToggleField::Rating),
            "review" => SessionCommand::Toggle(ToggleField::Review),
            _ => return Err("usage: toggle title|year|rating|review".to_string()),
        },
        "export" => SessionCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

fn split_id<'a>(rest: &'a str, usage: &str) -> Result<(MovieId, &'a str), String> {
    let Some((raw_id, tail)) = rest.split_once(char::is_whitespace) else {
        return Err(format!("usage: {usage}"));
    };
    let tail = tail.trim();
    if tail.is_empty() {
        return Err(format!("usage: {usage}"));
    }
    Ok((raw_id.parse()?, tail))
}

/// State of one interactive session. Everything here is dropped when the
/// session ends.
pub(crate) struct Session<C> {
    client: C,
    pub(crate) store: SelectionStore,
    pub(crate) config: ExportConfiguration,
    last_results: Vec<SummaryRecord>,
}

impl<C: SearchClient + DetailClient> Session<C> {
    pub(crate) fn new(client: C, config: ExportConfiguration) -> Self {
        Self {
            client,
            store: SelectionStore::new(),
            config,
            last_results: Vec::new(),
        }
    }

    /// Applies one command. Catalog and store failures are reported on `out`
    /// and leave the session running; only output errors propagate.
    pub(crate) fn handle<W: Write>(&mut self, command: SessionCommand, out: &mut W) -> Result<Flow> {
        let language = self.config.title_language;
        match command {
            SessionCommand::Search(query) => match self.client.search(&query) {
                Ok(results) => {
                    write_search_results(out, &results, language)?;
                    self.last_results = results;
                }
                Err(err) => {
                    self.last_results.clear();
                    writeln!(out, "ERROR: search failed: {err}")?;
                }
            },
            SessionCommand::Pick(n) => match self.last_results.get(n - 1) {
                Some(record) => {
                    let id = record.id;
                    self.select(id, out)?;
                }
                None => writeln!(
                    out,
                    "ERROR: no result #{n} (last search returned {})",
                    self.last_results.len()
                )?,
            },
            SessionCommand::Add(id) => self.select(id, out)?,
            SessionCommand::Show(id) => match self.store.get(id) {
                Some(entry) => write_detail(out, &entry.detail, language)?,
                None => match self.client.fetch(id) {
                    Ok(record) => write_detail(out, &record, language)?,
                    Err(err) => writeln!(out, "ERROR: lookup failed for {id}: {err}")?,
                },
            },
            SessionCommand::Rate(id, rating) => {
                report(self.store.annotate(id, Some(rating), None), out)?
            }
            SessionCommand::Review(id, text) => {
                report(self.store.annotate(id, None, Some(text)), out)?
            }
            SessionCommand::Clear(id) => report(self.store.clear_annotation(id), out)?,
            SessionCommand::Remove(id) => match self.store.remove(id) {
                Some(entry) => writeln!(out, "Removed: {}", entry.detail.title_in(language))?,
                None => writeln!(out, "ERROR: movie {id} has not been selected")?,
            },
            SessionCommand::List => write_selection_list(out, &self.store, language)?,
            SessionCommand::IdKind(kind) => {
                self.config.id_kind = kind;
                writeln!(out, "Identifier column: {}", self.config.columns()[0].header())?;
            }
            SessionCommand::Lang(lang) => {
                self.config.title_language = lang;
                writeln!(out, "Title language: {lang:?}")?;
            }
            SessionCommand::Toggle(field) => {
                let flag = match field {
                    ToggleField::Title => &mut self.config.title,
                    ToggleField::Year => &mut self.config.year,
                    ToggleField::Rating => &mut self.config.rating,
                    ToggleField::Review => &mut self.config.review,
                };
                *flag = !*flag;
                let headers = self.store.export(&self.config).headers().join(", ");
                writeln!(out, "Columns: {headers}")?;
            }
            SessionCommand::Export(path) => {
                let table = self.store.export(&self.config);
                match path {
                    Some(path) => match write_export_file(&table, &path) {
                        Ok(()) => writeln!(
                            out,
                            "Wrote {} row(s) to {}",
                            table.rows.len(),
                            path.display()
                        )?,
                        Err(err) => writeln!(out, "ERROR: {err:#}")?,
                    },
                    None => table.write_csv(&mut *out).context("failed to write export")?,
                }
            }
            SessionCommand::Help => writeln!(out, "{HELP}")?,
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn select<W: Write>(&mut self, id: MovieId, out: &mut W) -> Result<()> {
        match self.client.fetch(id) {
            Ok(record) => {
                write_detail(out, &record, self.config.title_language)?;
                let replaced = self.store.contains(id);
                self.store.upsert(id, record);
                if replaced {
                    writeln!(out, "Refreshed selection {id}.")?;
                } else {
                    writeln!(out, "Added {id} ({} selected).", self.store.len())?;
                }
            }
            Err(err) => {
                warn!(%id, "detail fetch failed: {err}");
                writeln!(out, "ERROR: lookup failed for {id}: {err}")?;
            }
        }
        Ok(())
    }
}

fn write_export_file(table: &Table, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    table
        .write_csv(file)
        .with_context(|| format!("failed to write export file {}", path.display()))
}

fn report<W: Write, E: std::fmt::Display>(result: Result<(), E>, out: &mut W) -> Result<()> {
    match result {
        Ok(()) => writeln!(out, "OK")?,
        Err(err) => writeln!(out, "ERROR: {err}")?,
    }
    Ok(())
}

/// Reads commands from `input` until EOF or `quit`.
pub(crate) fn run_session<C, R, W>(session: &mut Session<C>, mut input: R, out: &mut W) -> Result<()>
where
    C: SearchClient + DetailClient,
    R: BufRead,
    W: Write,
{
    writeln!(out, "letterlog session. Type `help` for commands.")?;
    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line).context("failed to read input")? == 0 {
            break;
        }
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "ERROR: {message}")?;
                continue;
            }
        };
        if session.handle(command, out)? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
