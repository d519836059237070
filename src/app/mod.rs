mod picks;
mod session;
mod view;


use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::catalog::{DetailClient, Memoized, MovieId, SearchClient, TmdbClient};
use crate::cli::{Cli, Command};
use crate::config::{Settings, load_settings};
use crate::export::ExportConfiguration;
use crate::paths::config_file_path;
use crate::store::SelectionStore;

use self::picks::{apply_picks, parse_picks};
use self::session::{Session, run_session};
use self::view::{write_detail, write_search_results};

pub fn run(cli: Cli) -> Result<()> {
    let default_config = match config_file_path() {
        Ok(path) => Some(path),
        Err(err) => {
            warn!("{err:#}");
            None
        }
    };
    let settings = load_settings(&cli.global, default_config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Some(Command::Search { query }) => {
            let client = open_catalog(&settings)?;
            run_search(&client, &query.join(" "), &settings.export, &mut out)?
        }
        Some(Command::Show { id }) => {
            let client = open_catalog(&settings)?;
            run_show(&client, id, &settings.export, &mut out)?
        }
        Some(Command::Export { picks, out: target }) => {
            let client = open_catalog(&settings)?;
            run_export(&client, &picks, target.as_deref(), &settings.export, &mut out)?
        }
        Some(Command::Session) | None => {
            let client = open_catalog(&settings)?;
            let mut session = Session::new(client, settings.export.clone());
            run_session(&mut session, io::stdin().lock(), &mut out)?
        }
    }

    Ok(())
}

fn open_catalog(settings: &Settings) -> Result<Memoized<TmdbClient>> {
    let api_key = settings.api_key()?;
    Ok(Memoized::new(TmdbClient::new(
        &settings.base_url,
        api_key,
        settings.connect_timeout,
        settings.read_timeout,
    )))
}

fn run_search<C: SearchClient, W: Write>(
    client: &C,
    query: &str,
    export: &ExportConfiguration,
    out: &mut W,
) -> Result<()> {
    let results = client
        .search(query)
        .with_context(|| format!("search for {query:?} failed"))?;
    write_search_results(out, &results, export.title_language)?;
    Ok(())
}

fn run_show<C: DetailClient, W: Write>(
    client: &C,
    id: MovieId,
    export: &ExportConfiguration,
    out: &mut W,
) -> Result<()> {
    let record = client
        .fetch(id)
        .with_context(|| format!("failed to fetch movie {id}"))?;
    write_detail(out, &record, export.title_language)?;
    Ok(())
}

fn run_export<C: DetailClient, W: Write>(
    client: &C,
    picks_path: &Path,
    target: Option<&Path>,
    export: &ExportConfiguration,
    out: &mut W,
) -> Result<()> {
    let raw = fs::read(picks_path)
        .with_context(|| format!("failed to read picks file {}", picks_path.display()))?;
    let picks = parse_picks(raw.as_slice())
        .with_context(|| format!("invalid picks file {}", picks_path.display()))?;

    let mut store = SelectionStore::new();
    apply_picks(client, &mut store, picks)?;
    let table = store.export(export);
    if table.is_empty() {
        warn!(path = %picks_path.display(), "picks file has no entries");
    }

    match target {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create export file {}", path.display()))?;
            table
                .write_csv(file)
                .with_context(|| format!("failed to write export file {}", path.display()))?;
            eprintln!("Wrote {} row(s) to {}", table.rows.len(), path.display());
        }
        None => table.write_csv(out).context("failed to write export")?,
    }
    Ok(())
}
