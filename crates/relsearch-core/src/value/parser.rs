//! C5 — Value Parser.
//!
//! Coerces the string literals carried by a wire-level `SearchCondition`
//! into typed `Value`s, following an attribute's static `ScalarKind`.
//! Never panics on malformed input; every failure mode surfaces as
//! `ParseOutcome::Invalid` for the caller to fold into a `Violation`.

use super::Value;
use crate::metamodel::ScalarKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Result of coercing one literal. Kept distinct from `Result<Value, _>` so
/// callers building an aggregated `Violation` list don't need to construct a
/// throwaway `SearchError` per failed literal.
#[derive(Debug)]
pub enum ParseOutcome {
    Ok(Value),
    Invalid { reason: String },
}

const TRUE_TOKENS: &[&str] = &["true", "1", "yes", "y", "on"];
const FALSE_TOKENS: &[&str] = &["false", "0", "no", "n", "off"];

/// Parse one literal against the declared `ScalarKind`. Nullish tokens
/// (`""`, case-insensitive `"null"`) always produce `Value::Null`,
/// regardless of the target kind.
#[must_use]
pub fn parse_value(kind: ScalarKind, raw: &str) -> ParseOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return ParseOutcome::Ok(Value::Null);
    }

    match kind {
        ScalarKind::Text | ScalarKind::Uuid => ParseOutcome::Ok(Value::Text(trimmed.to_string())),
        ScalarKind::Bool => parse_bool(trimmed),
        ScalarKind::Int | ScalarKind::Long => parse_int(trimmed),
        ScalarKind::Decimal | ScalarKind::Float | ScalarKind::Double => parse_float(trimmed),
        ScalarKind::Date => parse_date(trimmed),
        ScalarKind::DateTime => parse_date_time(trimmed),
        ScalarKind::OffsetDateTime => parse_offset_date_time(trimmed),
        ScalarKind::Enum(type_name) => {
            ParseOutcome::Ok(Value::Enum(format!("{type_name}::{trimmed}")))
        }
    }
}

/// Parse a `IN`/`NOT IN`/`BETWEEN` literal list. `BETWEEN` against a `Date`
/// kind expands the end literal's implied time to end-of-day, so a
/// date-only `BETWEEN` range is inclusive of the entire end day (§4.2).
#[must_use]
pub fn parse_value_list(kind: ScalarKind, raw: &[String], is_between: bool) -> Vec<ParseOutcome> {
    let mut outcomes: Vec<ParseOutcome> = raw.iter().map(|r| parse_value(kind, r)).collect();

    if is_between && matches!(kind, ScalarKind::Date) {
        if let Some(last) = outcomes.last_mut() {
            if let ParseOutcome::Ok(Value::Date(date)) = last {
                *last = ParseOutcome::Ok(Value::DateTime(end_of_day(*date)));
            }
        }
        if let Some(ParseOutcome::Ok(Value::Date(date))) = outcomes.first() {
            let start = date.and_time(NaiveTime::MIN);
            outcomes[0] = ParseOutcome::Ok(Value::DateTime(start));
        }
    }

    outcomes
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(
        NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .expect("23:59:59.999999999 is a valid time"),
    )
}

fn parse_bool(trimmed: &str) -> ParseOutcome {
    let lower = trimmed.to_ascii_lowercase();
    if TRUE_TOKENS.contains(&lower.as_str()) {
        ParseOutcome::Ok(Value::Bool(true))
    } else if FALSE_TOKENS.contains(&lower.as_str()) {
        ParseOutcome::Ok(Value::Bool(false))
    } else {
        ParseOutcome::Invalid {
            reason: format!("`{trimmed}` is not a recognized boolean token"),
        }
    }
}

/// Strip grouping separators (`,` and `_`) before parsing — locale-neutral,
/// not locale-aware (§4.2: "numeric literals are parsed without regard to
/// locale; grouping separators are stripped, not interpreted").
fn strip_grouping(trimmed: &str) -> String {
    trimmed.chars().filter(|c| *c != ',' && *c != '_').collect()
}

fn parse_int(trimmed: &str) -> ParseOutcome {
    let stripped = strip_grouping(trimmed);
    match stripped.parse::<i64>() {
        Ok(n) => ParseOutcome::Ok(Value::Int(n)),
        Err(_) => ParseOutcome::Invalid {
            reason: format!("`{trimmed}` is not a valid integer"),
        },
    }
}

fn parse_float(trimmed: &str) -> ParseOutcome {
    let stripped = strip_grouping(trimmed);
    match stripped.parse::<f64>() {
        Ok(n) => ParseOutcome::Ok(Value::Float(n)),
        Err(_) => ParseOutcome::Invalid {
            reason: format!("`{trimmed}` is not a valid number"),
        },
    }
}

fn parse_date(trimmed: &str) -> ParseOutcome {
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => ParseOutcome::Ok(Value::Date(date)),
        Err(_) => ParseOutcome::Invalid {
            reason: format!("`{trimmed}` is not an ISO-8601 date"),
        },
    }
}

fn parse_date_time(trimmed: &str) -> ParseOutcome {
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return ParseOutcome::Ok(Value::DateTime(dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return ParseOutcome::Ok(Value::DateTime(date.and_time(NaiveTime::MIN)));
    }
    ParseOutcome::Invalid {
        reason: format!("`{trimmed}` is not an ISO-8601 datetime"),
    }
}

fn parse_offset_date_time(trimmed: &str) -> ParseOutcome {
    match chrono::DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => ParseOutcome::Ok(Value::OffsetDateTime(dt)),
        Err(_) => ParseOutcome::Invalid {
            reason: format!("`{trimmed}` is not an ISO-8601 offset datetime"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseOutcome, parse_value, parse_value_list};
    use crate::metamodel::ScalarKind;
    use crate::value::Value;
    use proptest::prelude::*;

    fn expect_ok(outcome: ParseOutcome) -> Value {
        match outcome {
            ParseOutcome::Ok(value) => value,
            ParseOutcome::Invalid { reason } => panic!("expected Ok, got Invalid: {reason}"),
        }
    }

    #[test]
    fn empty_and_null_tokens_coerce_to_null() {
        assert!(expect_ok(parse_value(ScalarKind::Text, "")).is_null());
        assert!(expect_ok(parse_value(ScalarKind::Int, "null")).is_null());
        assert!(expect_ok(parse_value(ScalarKind::Int, "NULL")).is_null());
    }

    #[test]
    fn bool_tokens_are_case_insensitive() {
        for tok in ["true", "TRUE", "Yes", "y", "ON", "1"] {
            assert_eq!(expect_ok(parse_value(ScalarKind::Bool, tok)), Value::Bool(true));
        }
        for tok in ["false", "No", "n", "off", "0"] {
            assert_eq!(expect_ok(parse_value(ScalarKind::Bool, tok)), Value::Bool(false));
        }
    }

    #[test]
    fn bool_rejects_unknown_token() {
        assert!(matches!(
            parse_value(ScalarKind::Bool, "maybe"),
            ParseOutcome::Invalid { .. }
        ));
    }

    #[test]
    fn int_strips_grouping_separators() {
        assert_eq!(
            expect_ok(parse_value(ScalarKind::Int, "1,234,567")),
            Value::Int(1_234_567)
        );
        assert_eq!(
            expect_ok(parse_value(ScalarKind::Long, "1_000")),
            Value::Int(1000)
        );
    }

    #[test]
    fn float_parses_decimal_literal() {
        assert_eq!(
            expect_ok(parse_value(ScalarKind::Decimal, "19.99")),
            Value::Float(19.99)
        );
    }

    #[test]
    fn date_parses_iso8601() {
        let value = expect_ok(parse_value(ScalarKind::Date, "2026-08-01"));
        assert!(matches!(value, Value::Date(_)));
    }

    #[test]
    fn date_between_expands_to_full_day_bounds() {
        let outcomes =
            parse_value_list(ScalarKind::Date, &["2026-01-01".into(), "2026-01-31".into()], true);
        let mut outcomes = outcomes.into_iter();
        let start = expect_ok(outcomes.next().unwrap());
        let end = expect_ok(outcomes.next().unwrap());
        match (start, end) {
            (Value::DateTime(start), Value::DateTime(end)) => {
                assert_eq!(start.format("%H:%M:%S%.f").to_string(), "00:00:00.0");
                assert_eq!(end.format("%H:%M:%S%.f").to_string(), "23:59:59.999999999");
            }
            other => panic!("expected DateTime/DateTime, got {other:?}"),
        }
    }

    #[test]
    fn enum_match_is_recorded_with_type_qualifier() {
        let value = expect_ok(parse_value(ScalarKind::Enum("Status"), "Active"));
        assert_eq!(value, Value::Enum("Status::Active".to_string()));
    }

    proptest! {
        /// P8: parsing is lossless for any `i64` once formatted as a plain
        /// decimal literal — `strip_grouping` must never touch a digit.
        #[test]
        fn parses_any_i64_losslessly(n in any::<i64>()) {
            let formatted = n.to_string();
            match parse_value(ScalarKind::Int, &formatted) {
                ParseOutcome::Ok(Value::Int(parsed)) => prop_assert_eq!(parsed, n),
                other => return Err(proptest::test_runner::TestCaseError::fail(format!(
                    "expected Ok(Int({n})), got {other:?}"
                ))),
            }
        }

        /// Inserting thousands-grouping commas into a non-negative `i64`'s
        /// decimal digits must still round-trip (§4.2 grouping-separator
        /// stripping) — grouping is locale-neutral, not locale-validated.
        #[test]
        fn grouping_commas_do_not_change_the_parsed_value(n in 0i64..1_000_000_000) {
            let digits = n.to_string();
            let grouped = group_with_commas(&digits);
            match parse_value(ScalarKind::Int, &grouped) {
                ParseOutcome::Ok(Value::Int(parsed)) => prop_assert_eq!(parsed, n),
                other => return Err(proptest::test_runner::TestCaseError::fail(format!(
                    "expected Ok(Int({n})), got {other:?}"
                ))),
            }
        }
    }

    /// Groups `digits` from the right in runs of three, e.g. `"1234567"` ->
    /// `"1,234,567"` — mirrors how a caller might format a literal before
    /// sending it, exercising `strip_grouping`'s removal path.
    fn group_with_commas(digits: &str) -> String {
        let mut out = String::new();
        for (i, ch) in digits.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out.chars().rev().collect()
    }
}
