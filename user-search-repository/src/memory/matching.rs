//! Text matching used by the in-memory engine.
//!
//! Mirrors the engine semantics closely enough for tests: `text` fields are
//! lowercased and split into terms, `keyword` fields match the whole query
//! string, and fuzziness follows the `AUTO` edit-distance rule.

use crate::schema::{FieldType, IndexSchema};
use user_search_shared::UserRecord;

/// Maximum edit distance allowed for a term under `AUTO` fuzziness.
pub(crate) fn auto_fuzziness(term: &str) -> usize {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

/// Split text into lowercase alphanumeric terms.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Relevance of a record for a query; `0.0` means no match.
///
/// Fields are scored independently and the best field wins.
pub(crate) fn score(schema: &IndexSchema, record: &UserRecord, query: &str, fuzzy: bool) -> f64 {
    let query_terms = tokenize(query);

    schema
        .fields()
        .filter_map(|(name, ty)| record.field(name).map(|value| (value, ty)))
        .map(|(value, ty)| match ty {
            FieldType::Keyword => keyword_score(value, query, fuzzy),
            FieldType::Text => text_score(value, &query_terms, fuzzy),
        })
        .fold(0.0, f64::max)
}

fn keyword_score(value: &str, query: &str, fuzzy: bool) -> f64 {
    if value == query {
        return 1.0;
    }
    if fuzzy && edit_distance(value, query) <= auto_fuzziness(query) {
        return 0.5;
    }
    0.0
}

fn text_score(value: &str, query_terms: &[String], fuzzy: bool) -> f64 {
    let field_terms = tokenize(value);

    query_terms
        .iter()
        .map(|query_term| {
            if field_terms.iter().any(|t| t == query_term) {
                1.0
            } else if fuzzy {
                let max_edits = auto_fuzziness(query_term);
                let close = field_terms
                    .iter()
                    .any(|t| edit_distance(t, query_term) <= max_edits);
                if close {
                    0.5
                } else {
                    0.0
                }
            } else {
                0.0
            }
        })
        .sum()
}

/// Optimal string alignment distance (Levenshtein plus adjacent transpositions).
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];

    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for j in 0..=b.len() {
        d[j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1)
                .min(d[(i - 1) * width + j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1);
            }
            d[i * width + j] = best;
        }
    }

    d[a.len() * width + b.len()]
}
