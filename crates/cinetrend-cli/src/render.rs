//! Plain-text rendering of session snapshots

use cinetrend_core::{MovieSummary, SearchState, TrendingView};

/// Render the results section: spinner, error, or the movie list
pub fn render_search(state: &SearchState) -> String {
    let heading = if state.is_discover_mode() {
        "Popular Movies".to_string()
    } else {
        format!("Results for \"{}\"", state.debounced_input.trim())
    };
    let mut out = format!("== {} ==\n", heading);

    if state.is_loading {
        out.push_str("Loading...\n");
    } else if let Some(error) = &state.error {
        out.push_str(error);
        out.push('\n');
    } else if state.results.is_empty() {
        out.push_str("No movies found.\n");
    } else {
        for movie in &state.results {
            out.push_str(&render_movie(movie));
            out.push('\n');
        }
    }

    out
}

/// One line per movie: title, year and rating when the catalog supplied them
pub fn render_movie(movie: &MovieSummary) -> String {
    let mut line = format!("  [{}] {}", movie.id, display_title(movie));

    if let Some(year) = movie
        .field("release_date")
        .and_then(|v| v.as_str())
        .and_then(|date| date.get(..4))
    {
        line.push_str(&format!(" ({})", year));
    }

    if let Some(rating) = movie.field("vote_average").and_then(|v| v.as_f64()) {
        line.push_str(&format!(" - {:.1}", rating));
    }

    line
}

fn display_title(movie: &MovieSummary) -> &str {
    if movie.title.is_empty() {
        "(untitled)"
    } else {
        &movie.title
    }
}

/// Render the leaderboard, or nothing at all when it is empty
pub fn render_trending(view: &TrendingView) -> String {
    if view.is_empty() {
        return String::new();
    }

    let rows: String = view
        .ranked()
        .map(|(rank, entry)| format!("  {}. {} ({} searches)\n", rank, entry.key, entry.count))
        .collect();
    format!("== Trending Movies ==\n{}", rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinetrend_core::{SearchTerm, TrendEntity, TrendEntry, FETCH_ERROR_MESSAGE};

    fn entry(key: &str, count: u64) -> TrendEntry {
        let mut entry = TrendEntry::first(&SearchTerm::parse(key).unwrap(), &TrendEntity::new(1, ""));
        entry.count = count;
        entry
    }

    #[test]
    fn test_empty_trending_renders_nothing() {
        assert_eq!(render_trending(&TrendingView::default()), "");
    }

    #[test]
    fn test_trending_is_numbered_from_one() {
        let view = TrendingView::from_entries(vec![entry("alien", 2), entry("heat", 7)]);
        assert_eq!(
            render_trending(&view),
            "== Trending Movies ==\n  1. heat (7 searches)\n  2. alien (2 searches)\n"
        );
    }

    #[test]
    fn test_loading_wins_over_results() {
        let state = SearchState {
            debounced_input: "heat".to_string(),
            is_loading: true,
            results: vec![MovieSummary::new(949, "Heat")],
            ..SearchState::default()
        };
        let out = render_search(&state);
        assert!(out.starts_with("== Results for \"heat\" =="));
        assert!(out.contains("Loading..."));
        assert!(!out.contains("Heat"));
    }

    #[test]
    fn test_error_is_shown() {
        let state = SearchState {
            error: Some(FETCH_ERROR_MESSAGE.to_string()),
            ..SearchState::default()
        };
        let out = render_search(&state);
        assert!(out.starts_with("== Popular Movies =="));
        assert!(out.contains(FETCH_ERROR_MESSAGE));
    }

    #[test]
    fn test_results_are_listed_one_per_line() {
        let state = SearchState {
            debounced_input: " heat ".to_string(),
            results: vec![heat(), MovieSummary::new(348, "Alien")],
            ..SearchState::default()
        };
        assert_eq!(
            render_search(&state),
            "== Results for \"heat\" ==\n  [949] Heat (1995) - 7.9\n  [348] Alien\n"
        );
    }

    #[test]
    fn test_movie_line_uses_catalog_fields() {
        let movie = heat();
        assert_eq!(render_movie(&movie), "  [949] Heat (1995) - 7.9");
        assert_eq!(render_movie(&MovieSummary::new(1, "")), "  [1] (untitled)");
    }

    fn heat() -> MovieSummary {
        let mut movie = MovieSummary::new(949, "Heat");
        movie.extra.insert("release_date".to_string(), "1995-12-15".into());
        movie.extra.insert("vote_average".to_string(), 7.9.into());
        movie
    }
}
