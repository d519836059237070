use std::io::{self, Write};

use crate::catalog::{DetailRecord, SummaryRecord, TitleLanguage};
use crate::format::{
    format_genres, format_release_date, format_runtime, format_score, poster_url, release_year,
    title_year_label,
};
use crate::store::SelectionStore;

pub(crate) fn write_search_results<W: Write>(
    out: &mut W,
    results: &[SummaryRecord],
    language: TitleLanguage,
) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "Zero results!");
    }
    writeln!(out, "{:<4} {:<10} {}", "#", "TMDB ID", "TITLE")?;
    for (idx, record) in results.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<10} {}",
            idx + 1,
            record.id,
            title_year_label(record.title_in(language), record.release_date.as_deref())
        )?;
    }
    Ok(())
}

pub(crate) fn write_detail<W: Write>(
    out: &mut W,
    record: &DetailRecord,
    language: TitleLanguage,
) -> io::Result<()> {
    writeln!(out, "{}", record.title_in(language))?;
    if let Some(overview) = record.overview.as_deref() {
        writeln!(out, "  Overview:       {overview}")?;
    }
    writeln!(out, "  Genres:         {}", format_genres(&record.genres))?;
    writeln!(out, "  Runtime:        {}", format_runtime(record.runtime))?;
    writeln!(
        out,
        "  Release Date:   {}",
        format_release_date(record.release_date.as_deref())
    )?;
    writeln!(out, "  Average Rating: {}", format_score(record.vote_average))?;
    writeln!(out, "  TMDb ID:        {}", record.id)?;
    writeln!(
        out,
        "  IMDb ID:        {}",
        record.imdb_id.as_deref().unwrap_or("-")
    )?;
    if let Some(url) = poster_url(record.poster_path.as_deref()) {
        writeln!(out, "  Poster:         {url}")?;
    }
    Ok(())
}

pub(crate) fn write_selection_list<W: Write>(
    out: &mut W,
    store: &SelectionStore,
    language: TitleLanguage,
) -> io::Result<()> {
    if store.is_empty() {
        return writeln!(out, "No movies selected yet. Use `search` then `pick`.");
    }
    writeln!(
        out,
        "{:<10} {:<40} {:<6} {:<6} {}",
        "TMDB ID", "TITLE", "YEAR", "RATING", "REVIEW"
    )?;
    for entry in store.iter() {
        let year = release_year(entry.detail.release_date.as_deref())
            .map(|year| year.to_string())
            .unwrap_or_else(|| "-".to_string());
        let rating = entry
            .annotation
            .rating
            .map(|rating| rating.to_string())
            .unwrap_or_else(|| "-".to_string());
        let review = entry
            .annotation
            .review
            .as_deref()
            .map(|review| truncate(review, 30))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<10} {:<40} {:<6} {:<6} {}",
            entry.id,
            truncate(entry.detail.title_in(language), 40),
            year,
            rating,
            review
        )?;
    }
    Ok(())
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}
