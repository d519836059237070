use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::error::CatalogError;

/// Shown in place of a field the upstream record does not carry.
pub(crate) const PLACEHOLDER: &str = "Unknown";

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/original";

/// `[]` -> placeholder, `[A]` -> `A`, `[A, B, C]` -> `A, B and C`.
pub(crate) fn format_genres(genres: &[String]) -> String {
    match genres {
        [] => PLACEHOLDER.to_string(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

/// Total minutes as `{H}h {M}m`. TMDb reports unknown runtimes as 0.
pub(crate) fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        Some(total) if total > 0 => format!("{}h {}m", total / 60, total % 60),
        _ => PLACEHOLDER.to_string(),
    }
}

pub(crate) fn parse_release_date(raw: Option<&str>) -> Result<Option<NaiveDate>, CatalogError> {
    let Some(raw) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CatalogError::MalformedRecord(format!("release date {raw:?} is not YYYY-MM-DD")))
}

/// ISO `YYYY-MM-DD` as `DD/MM/YYYY`; missing or malformed dates become the
/// placeholder.
pub(crate) fn format_release_date(raw: Option<&str>) -> String {
    match parse_release_date(raw) {
        Ok(Some(date)) => date.format("%d/%m/%Y").to_string(),
        Ok(None) => PLACEHOLDER.to_string(),
        Err(err) => {
            warn!("{err}");
            PLACEHOLDER.to_string()
        }
    }
}

/// Year of a well-formed release date. Malformed dates yield `None`.
pub(crate) fn release_year(raw: Option<&str>) -> Option<i32> {
    match parse_release_date(raw) {
        Ok(date) => date.map(|date| date.year()),
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}

/// 0-10 score as a percentage, rounded to two decimals with trailing zeros
/// dropped (`7.438` -> `74.38%`, `8.0` -> `80%`).
pub(crate) fn format_score(score: Option<f64>) -> String {
    let Some(score) = score.filter(|value| value.is_finite() && *value >= 0.0) else {
        return PLACEHOLDER.to_string();
    };
    let percent = format!("{:.2}", score * 10.0);
    let percent = percent.trim_end_matches('0').trim_end_matches('.');
    format!("{percent}%")
}

/// `Title (Year)`, or the bare title when the release date is missing.
pub(crate) fn title_year_label(title: &str, release_date: Option<&str>) -> String {
    match release_year(release_date) {
        Some(year) => format!("{title} ({year})"),
        None => title.to_string(),
    }
}

pub(crate) fn poster_url(poster_path: Option<&str>) -> Option<String> {
    let path = poster_path?.trim();
    if path.is_empty() {
        return None;
    }
    if path.starts_with('/') {
        Some(format!("{POSTER_BASE_URL}{path}"))
    } else {
        Some(format!("{POSTER_BASE_URL}/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn genres_join_with_final_and() {
        assert_eq!(format_genres(&names(&["Drama"])), "Drama");
        assert_eq!(format_genres(&names(&["Action", "Drama"])), "Action and Drama");
        assert_eq!(
            format_genres(&names(&["Action", "Drama", "Comedy"])),
            "Action, Drama and Comedy"
        );
        assert_eq!(format_genres(&[]), PLACEHOLDER);
    }

    #[test]
    fn runtime_splits_hours_and_minutes() {
        assert_eq!(format_runtime(Some(125)), "2h 5m");
        assert_eq!(format_runtime(Some(45)), "0h 45m");
        assert_eq!(format_runtime(Some(120)), "2h 0m");
        assert_eq!(format_runtime(Some(0)), PLACEHOLDER);
        assert_eq!(format_runtime(None), PLACEHOLDER);
    }

    #[test]
    fn release_date_is_reordered() {
        assert_eq!(format_release_date(Some("1999-10-15")), "15/10/1999");
        assert_eq!(format_release_date(Some("")), PLACEHOLDER);
        assert_eq!(format_release_date(None), PLACEHOLDER);
    }

    #[test]
    fn malformed_release_date_is_reported_then_replaced() {
        assert!(matches!(
            parse_release_date(Some("1999")),
            Err(CatalogError::MalformedRecord(_))
        ));
        assert_eq!(format_release_date(Some("1999")), PLACEHOLDER);
    }

    #[test]
    fn release_year_comes_from_parsed_date() {
        assert_eq!(release_year(Some("1999-10-15")), Some(1999));
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(None), None);
        assert_eq!(release_year(Some("TBA")), None);
        assert_eq!(release_year(Some("1999")), None);
    }

    #[test]
    fn score_becomes_percentage() {
        assert_eq!(format_score(Some(7.438)), "74.38%");
        assert_eq!(format_score(Some(8.0)), "80%");
        assert_eq!(format_score(Some(6.25)), "62.5%");
        assert_eq!(format_score(Some(0.0)), "0%");
        assert_eq!(format_score(None), PLACEHOLDER);
        assert_eq!(format_score(Some(f64::NAN)), PLACEHOLDER);
    }

    #[test]
    fn label_omits_missing_year() {
        assert_eq!(title_year_label("Fight Club", Some("1999-10-15")), "Fight Club (1999)");
        assert_eq!(title_year_label("Untitled", None), "Untitled");
        assert_eq!(title_year_label("Untitled", Some("TBA")), "Untitled");
    }

    #[test]
    fn poster_url_joins_path() {
        assert_eq!(
            poster_url(Some("/abc.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/original/abc.jpg")
        );
        assert_eq!(poster_url(None), None);
    }
}
