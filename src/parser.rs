use ahash::AHashMap;
use tracing::debug;

use crate::{
    errors::{HeapBenchError, Result},
    record::{CaseKey, MeasurementRecord, TestKind},
};

const RATIO_SUFFIX: char = 'x';

/// Parses one benchmark row:
///
/// ```text
/// <test> <n> <dheap p50> <dheap p95> <stl p50> <stl p95> <speedup p50>x <speedup p95>x
/// ```
///
/// Anything else (headers, separators, log noise) yields `None`.
pub fn parse_line(line: &str) -> Option<MeasurementRecord> {
    let (test, rest) = split_test_name(line.trim())?;
    let mut fields = rest.split_whitespace();
    let n = parse_size(fields.next()?)?;
    let subject_p50 = parse_decimal(fields.next()?)?;
    let subject_p95 = parse_decimal(fields.next()?)?;
    let baseline_p50 = parse_decimal(fields.next()?)?;
    let baseline_p95 = parse_decimal(fields.next()?)?;
    let speedup_p50 = parse_ratio(fields.next()?)?;
    let speedup_p95 = parse_ratio(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some(MeasurementRecord {
        test,
        n,
        subject_p50,
        subject_p95,
        baseline_p50,
        baseline_p95,
        speedup_p50,
        speedup_p95,
    })
}

/// Every matching row of `text`, in input order. Duplicate keys are kept.
pub fn parse_output(text: &str) -> Vec<MeasurementRecord> {
    let mut skipped = 0usize;
    let records: Vec<MeasurementRecord> = text
        .lines()
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                skipped += 1;
            }
            parsed
        })
        .collect();
    debug!(rows = records.len(), skipped, "parsed benchmark output");
    records
}

/// Keyed view of `records`; a later row with the same key replaces an earlier one.
pub fn index_by_key(records: &[MeasurementRecord]) -> AHashMap<CaseKey, &MeasurementRecord> {
    let mut index = AHashMap::with_capacity(records.len());
    for record in records {
        index.insert(record.key(), record);
    }
    index
}

pub fn require_records(
    records: Vec<MeasurementRecord>,
    source: &str,
) -> Result<Vec<MeasurementRecord>> {
    if records.is_empty() {
        return Err(HeapBenchError::empty_result(source));
    }
    Ok(records)
}

fn split_test_name(line: &str) -> Option<(TestKind, &str)> {
    TestKind::ALL.into_iter().find_map(|kind| {
        let rest = line.strip_prefix(kind.as_str())?;
        rest.starts_with(char::is_whitespace).then_some((kind, rest))
    })
}

/// Plain positive decimal size; signs and overflow are rejected.
pub(crate) fn parse_size(token: &str) -> Option<u64> {
    if !is_digits(token) {
        return None;
    }
    token.parse::<u64>().ok().filter(|n| *n > 0)
}

fn parse_ratio(token: &str) -> Option<f64> {
    parse_decimal(token.strip_suffix(RATIO_SUFFIX)?)
}

fn parse_decimal(token: &str) -> Option<f64> {
    let valid = match token.split_once('.') {
        Some((whole, frac)) => is_digits(whole) && is_digits(frac),
        None => is_digits(token),
    };
    if !valid {
        return None;
    }
    token.parse::<f64>().ok()
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
