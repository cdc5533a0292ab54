//! Reading-statistics aggregation.
//!
//! The aggregate snapshot is a pure function of the full book collection
//! and a supplied "now" instant; it is recomputed from scratch on every
//! request, never cached, never persisted. Cost is linear in the number of
//! books plus genres per book.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{Book, BookStatus, BooksByStatus, GenreCount, MonthlyTrendPoint, ReadingStatistics};
use crate::temporal;

/// Number of calendar months covered by the trend, current month included.
const TREND_MONTHS: u32 = 6;

/// Maximum number of genre entries reported.
const TOP_GENRES: usize = 5;

/// Compute the aggregate snapshot over the full collection.
///
/// `now` anchors the calendar windows (trailing six months, current month,
/// current year); callers pass `Utc::now()` outside of tests.
pub fn compute_statistics(books: &[Book], now: DateTime<Utc>) -> ReadingStatistics {
    let total_books = books.len() as i64;

    // Per-status tallies are independent equality filters; the total is
    // never derived from them.
    let books_by_status = BooksByStatus {
        planned: count_with_status(books, BookStatus::Planned),
        reading: count_with_status(books, BookStatus::Reading),
        completed: count_with_status(books, BookStatus::Completed),
    };

    // A completed book counts as read in full, whatever currentPage says.
    let total_pages_read = books
        .iter()
        .filter(|b| b.status == BookStatus::Completed)
        .filter_map(|b| b.pages.filter(|p| *p != 0))
        .sum();

    let ratings: Vec<i64> = books
        .iter()
        .filter(|b| b.status == BookStatus::Completed)
        .filter_map(|b| b.rating.filter(|r| *r > 0))
        .collect();
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    let top_genres = top_genres(books);

    // Completion dates are free-form strings; only the parseable ones
    // participate in the calendar counts.
    let completions: Vec<DateTime<Utc>> = books
        .iter()
        .filter(|b| b.status == BookStatus::Completed)
        .filter_map(|b| b.completed_date.as_deref())
        .filter_map(temporal::parse_completion_date)
        .collect();

    let mut monthly_trend = Vec::with_capacity(TREND_MONTHS as usize);
    for months_back in (0..TREND_MONTHS).rev() {
        let (start, end) = temporal::month_window(now, months_back);
        monthly_trend.push(MonthlyTrendPoint {
            month: temporal::short_month_name(start),
            completed: count_in_window(&completions, start, end),
        });
    }

    let (month_start, month_end) = temporal::month_window(now, 0);
    let this_month_completed = count_in_window(&completions, month_start, month_end);

    let (year_start, year_end) = temporal::year_window(now);
    let this_year_completed = count_in_window(&completions, year_start, year_end);

    tracing::debug!(
        subsystem = "stats",
        op = "aggregate",
        total_books,
        completed = books_by_status.completed,
        parseable_completion_dates = completions.len(),
        "Computed reading statistics"
    );

    ReadingStatistics {
        total_books,
        books_by_status,
        total_pages_read,
        average_rating,
        top_genres,
        monthly_trend,
        this_month_completed,
        this_year_completed,
    }
}

fn count_with_status(books: &[Book], status: BookStatus) -> i64 {
    books.iter().filter(|b| b.status == status).count() as i64
}

fn count_in_window(completions: &[DateTime<Utc>], start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    completions.iter().filter(|t| **t >= start && **t < end).count() as i64
}

/// Frequency of every non-empty genre label across all books, regardless of
/// status. Each occurrence counts, so a label listed twice on one book
/// counts twice. Sorted by descending count; the sort is stable, so ties
/// keep first-encounter order. Truncated to [`TOP_GENRES`].
fn top_genres(books: &[Book]) -> Vec<GenreCount> {
    let mut tally: Vec<GenreCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for book in books {
        for genre in book.genres.iter().filter(|g| !g.is_empty()) {
            if let Some(&i) = index.get(genre.as_str()) {
                tally[i].count += 1;
            } else {
                index.insert(genre, tally.len());
                tally.push(GenreCount {
                    genre: genre.clone(),
                    count: 1,
                });
            }
        }
    }

    tally.sort_by(|a, b| b.count.cmp(&a.count));
    tally.truncate(TOP_GENRES);
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        // A Sunday in late August; trend months are Mar through Aug.
        Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap()
    }

    fn book(status: BookStatus) -> Book {
        Book {
            id: 0,
            title: "t".to_string(),
            author: "a".to_string(),
            status,
            rating: None,
            notes: None,
            image_url: None,
            pages: None,
            current_page: None,
            description: None,
            published_date: None,
            isbn: None,
            genres: Vec::new(),
            started_date: None,
            completed_date: None,
            created_at: fixed_now(),
            updated_at: fixed_now(),
            created_by: None,
            updated_by: None,
        }
    }

    fn completed(date: &str, rating: Option<i64>, pages: Option<i64>) -> Book {
        Book {
            rating,
            pages,
            completed_date: Some(date.to_string()),
            ..book(BookStatus::Completed)
        }
    }

    #[test]
    fn test_empty_collection() {
        let stats = compute_statistics(&[], fixed_now());
        assert_eq!(stats.total_books, 0);
        assert_eq!(stats.books_by_status, BooksByStatus::default());
        assert_eq!(stats.total_pages_read, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert!(stats.top_genres.is_empty());
        assert_eq!(stats.monthly_trend.len(), 6);
        assert!(stats.monthly_trend.iter().all(|p| p.completed == 0));
        assert_eq!(stats.this_month_completed, 0);
        assert_eq!(stats.this_year_completed, 0);
    }

    #[test]
    fn test_two_book_snapshot() {
        // One completed this month with rating and pages, one planned.
        let books = vec![
            completed("2026-08-10", Some(4), Some(100)),
            book(BookStatus::Planned),
        ];
        let stats = compute_statistics(&books, fixed_now());

        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.books_by_status.completed, 1);
        assert_eq!(stats.books_by_status.planned, 1);
        assert_eq!(stats.books_by_status.reading, 0);
        assert_eq!(stats.total_pages_read, 100);
        assert_eq!(stats.average_rating, 4.0);
        assert_eq!(stats.this_month_completed, 1);
        assert_eq!(stats.this_year_completed, 1);
    }

    #[test]
    fn test_pages_only_from_completed_books() {
        let books = vec![
            completed("2026-08-10", None, Some(300)),
            Book {
                pages: Some(500),
                ..book(BookStatus::Reading)
            },
            completed("2026-08-11", None, None),
            completed("2026-08-12", None, Some(0)),
        ];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.total_pages_read, 300);
    }

    #[test]
    fn test_average_rating_ignores_unrated_and_zero() {
        let books = vec![
            completed("2026-08-01", Some(4), None),
            completed("2026-08-02", Some(5), None),
            completed("2026-08-03", Some(0), None),
            completed("2026-08-04", None, None),
            Book {
                rating: Some(5),
                ..book(BookStatus::Reading)
            },
        ];
        let stats = compute_statistics(&books, fixed_now());
        // Mean of 4 and 5 only.
        assert_eq!(stats.average_rating, 4.5);
    }

    #[test]
    fn test_average_rating_rounds_to_one_decimal() {
        let books = vec![
            completed("2026-08-01", Some(4), None),
            completed("2026-08-02", Some(5), None),
            completed("2026-08-03", Some(5), None),
        ];
        let stats = compute_statistics(&books, fixed_now());
        // 14 / 3 = 4.666… → 4.7
        assert_eq!(stats.average_rating, 4.7);
    }

    #[test]
    fn test_average_rating_zero_when_no_qualifying_books() {
        let books = vec![completed("2026-08-01", Some(0), None)];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.average_rating, 0.0);
    }

    #[test]
    fn test_top_genres_counts_and_tie_order() {
        let with_genres = |genres: &[&str]| Book {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            ..book(BookStatus::Planned)
        };
        let books = vec![
            with_genres(&["Fiction"]),
            with_genres(&["Fiction", "Drama"]),
            with_genres(&["Drama"]),
        ];
        let stats = compute_statistics(&books, fixed_now());

        assert_eq!(stats.top_genres.len(), 2);
        // Tied at 2; Fiction was encountered first.
        assert_eq!(stats.top_genres[0].genre, "Fiction");
        assert_eq!(stats.top_genres[0].count, 2);
        assert_eq!(stats.top_genres[1].genre, "Drama");
        assert_eq!(stats.top_genres[1].count, 2);
    }

    #[test]
    fn test_top_genres_truncates_to_five() {
        let mut books = Vec::new();
        for (i, genre) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            // Descending frequencies so the order is deterministic.
            for _ in 0..(7 - i) {
                books.push(Book {
                    genres: vec![genre.to_string()],
                    ..book(BookStatus::Planned)
                });
            }
        }
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.top_genres.len(), 5);
        assert_eq!(stats.top_genres[0].genre, "A");
        assert_eq!(stats.top_genres[4].genre, "E");
    }

    #[test]
    fn test_top_genres_counts_duplicates_within_one_book() {
        let books = vec![Book {
            genres: vec!["Drama".to_string(), "Drama".to_string()],
            ..book(BookStatus::Planned)
        }];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.top_genres[0].count, 2);
    }

    #[test]
    fn test_top_genres_skips_empty_labels() {
        let books = vec![Book {
            genres: vec![String::new(), "Essay".to_string()],
            ..book(BookStatus::Planned)
        }];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.top_genres.len(), 1);
        assert_eq!(stats.top_genres[0].genre, "Essay");
    }

    #[test]
    fn test_top_genres_includes_all_statuses() {
        let books = vec![
            Book {
                genres: vec!["Memoir".to_string()],
                ..book(BookStatus::Planned)
            },
            Book {
                genres: vec!["Memoir".to_string()],
                ..completed("2026-08-01", None, None)
            },
        ];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.top_genres[0].count, 2);
    }

    #[test]
    fn test_monthly_trend_has_six_entries_oldest_first() {
        let stats = compute_statistics(&[], fixed_now());
        let months: Vec<&str> = stats.monthly_trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["Mar", "Apr", "May", "Jun", "Jul", "Aug"]);
    }

    #[test]
    fn test_monthly_trend_buckets_completions() {
        let books = vec![
            completed("2026-03-05", None, None),
            completed("2026-07-15T08:00:00.000Z", None, None),
            completed("2026-07-20", None, None),
            completed("2026-08-01", None, None),
            // Outside the window entirely.
            completed("2026-02-28", None, None),
            completed("2025-08-10", None, None),
        ];
        let stats = compute_statistics(&books, fixed_now());
        let counts: Vec<i64> = stats.monthly_trend.iter().map(|p| p.completed).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 2, 1]);
    }

    #[test]
    fn test_monthly_trend_ignores_unparseable_dates() {
        let books = vec![
            completed("sometime last week", None, None),
            completed("2026-08-05", None, None),
        ];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.monthly_trend[5].completed, 1);
        assert_eq!(stats.this_month_completed, 1);
    }

    #[test]
    fn test_non_completed_books_never_count_in_trend() {
        let books = vec![Book {
            completed_date: Some("2026-08-05".to_string()),
            ..book(BookStatus::Reading)
        }];
        let stats = compute_statistics(&books, fixed_now());
        assert!(stats.monthly_trend.iter().all(|p| p.completed == 0));
        assert_eq!(stats.this_month_completed, 0);
    }

    #[test]
    fn test_this_month_matches_last_trend_entry() {
        let books = vec![
            completed("2026-08-03", None, None),
            completed("2026-08-21", None, None),
            completed("2026-07-30", None, None),
        ];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(
            stats.this_month_completed,
            stats.monthly_trend[5].completed
        );
        assert_eq!(stats.this_month_completed, 2);
    }

    #[test]
    fn test_this_year_excludes_previous_december() {
        let books = vec![
            completed("2025-12-31T23:59:59Z", None, None),
            completed("2026-01-01", None, None),
            completed("2026-08-10", None, None),
        ];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.this_year_completed, 2);
    }

    #[test]
    fn test_trend_spans_year_boundary() {
        let january_now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let books = vec![
            completed("2025-08-10", None, None),
            completed("2025-12-25", None, None),
            completed("2026-01-02", None, None),
        ];
        let stats = compute_statistics(&books, january_now);
        let months: Vec<&str> = stats.monthly_trend.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["Aug", "Sep", "Oct", "Nov", "Dec", "Jan"]);
        let counts: Vec<i64> = stats.monthly_trend.iter().map(|p| p.completed).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 1, 1]);
        // The December completion belongs to 2025.
        assert_eq!(stats.this_year_completed, 1);
    }

    #[test]
    fn test_total_books_counts_every_record() {
        let books = vec![
            book(BookStatus::Planned),
            book(BookStatus::Reading),
            completed("2026-08-01", None, None),
        ];
        let stats = compute_statistics(&books, fixed_now());
        assert_eq!(stats.total_books, 3);
        let tallied = stats.books_by_status.planned
            + stats.books_by_status.reading
            + stats.books_by_status.completed;
        assert_eq!(tallied, 3);
    }
}
