//! Card status report endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use card_store::{CardStatusQuery, CardStatusRecord, CardStore};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CardStore> {
    pub store: S,
}

impl<S: CardStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

/// Raw `key=value` pairs from the query string or a urlencoded body.
///
/// Kept as a list so repeated keys never reject the request; the last
/// occurrence wins.
pub type RequestPairs = Vec<(String, String)>;

fn is_php_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Length of the leading numeric text in `s` and whether it is float-shaped.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// exponent only when at least one digit follows it.
fn numeric_prefix(s: &str) -> (usize, bool) {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut seen_digit = int_end > end;
    let mut is_float = false;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if seen_digit || frac_end > end + 1 {
            seen_digit = true;
            is_float = true;
            end = frac_end;
        }
    }

    if !seen_digit {
        return (0, false);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_start = end + 1 + sign;
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            is_float = true;
            end = exp_end;
        }
    }

    (end, is_float)
}

/// Converts a `since` value the way the dashboard has always been served.
///
/// Leading whitespace is skipped and the longest leading numeric text is
/// used; anything else reads as `0`. A fraction or exponent is honoured and
/// the result truncated toward zero, so `"1e3"` is `1000` and `"12.9"` is
/// `12`. Out-of-range values saturate.
pub fn parse_since(raw: &str) -> i64 {
    let trimmed = raw.trim_start_matches(is_php_space);
    let (len, is_float) = numeric_prefix(trimmed);
    let number = &trimmed[..len];

    if is_float {
        // `as` truncates toward zero and saturates at the i64 bounds.
        return number.parse::<f64>().map_or(0, |v| v as i64);
    }

    let (negative, digits) = match number.as_bytes().first() {
        Some(b'-') => (true, &number[1..]),
        Some(b'+') => (false, &number[1..]),
        _ => (false, number),
    };

    digits.bytes().fold(0i64, |acc, b| {
        let digit = i64::from(b - b'0');
        if negative {
            acc.saturating_mul(10).saturating_sub(digit)
        } else {
            acc.saturating_mul(10).saturating_add(digit)
        }
    })
}

fn last_since(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .rev()
        .find(|(key, _)| key == "since")
        .map(|(_, value)| value.as_str())
}

/// Picks the effective `since` bound. A form body wins over the query string.
pub fn since_from_request(
    query: &[(String, String)],
    form: Option<&[(String, String)]>,
) -> Option<i64> {
    form.and_then(last_since)
        .or_else(|| last_since(query))
        .map(parse_since)
}

/// ANY /data — active card status records, ordered by name.
#[tracing::instrument(skip_all, fields(since = tracing::field::Empty))]
pub async fn data<S: CardStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<RequestPairs>,
    form: Result<Form<RequestPairs>, FormRejection>,
) -> Result<Json<Vec<CardStatusRecord>>, ApiError> {
    metrics::counter!("card_status_requests_total").increment(1);

    let form = form.ok().map(|Form(pairs)| pairs);
    let since = since_from_request(&query, form.as_deref());
    if let Some(since) = since {
        tracing::Span::current().record("since", since);
    }

    let query = since.map_or_else(CardStatusQuery::new, CardStatusQuery::since);
    let records = state.store.card_statuses(query).await?;

    metrics::counter!("card_status_records_returned_total").increment(records.len() as u64);
    tracing::debug!(count = records.len(), "serving card status records");

    Ok(Json(records))
}
