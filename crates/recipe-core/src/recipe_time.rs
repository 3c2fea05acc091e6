//! Cooking-time estimation from action words and literal time expressions.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::action_time::{ActionTimeRecord, ActionTimeTable};
use crate::token::{label, TaggedToken};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEstimate {
    /// Occurrences per action word.
    pub count: BTreeMap<String, usize>,
    /// `actiontime + recipetime`, in seconds.
    pub time: f64,
    /// Sum of literal time expressions found in the text.
    pub recipetime: f64,
    /// Sum of table durations over distinct action words.
    pub actiontime: f64,
    /// The table used, for client display and editing.
    pub params: Vec<ActionTimeRecord>,
}

/// Chef-action tokens in order of appearance, surfaces without span joins.
pub fn extract_action_words(tokens: &[TaggedToken]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| t.has_label(label::ACTION_BY_CHEF))
        .map(|t| t.surface.clone())
        .collect()
}

pub fn count_action_words(actions: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for action in actions {
        *counts.entry(action.clone()).or_insert(0) += 1;
    }
    counts
}

/// Sum of table durations over distinct actions. Actions missing from the table
/// contribute nothing.
pub fn sum_action_time(actions: &[String], table: &ActionTimeTable) -> f64 {
    let distinct: BTreeSet<&str> = actions.iter().map(String::as_str).collect();
    let mut missing = Vec::new();
    let mut total = 0.0;
    for action in distinct {
        match table.seconds(action) {
            Some(seconds) => total += seconds,
            None => missing.push(action),
        }
    }
    if !missing.is_empty() {
        tracing::debug!(?missing, "actions without a table entry");
    }
    total
}

static TIME_RE: OnceLock<Regex> = OnceLock::new();

const UNIT: &str = r"(?:時間|分間|分|秒|(?:hours?|hrs?|minutes?|mins?|seconds?|secs?)\b)";

/// `N [unit] [~ M] unit`; a unit may follow each end of a range.
fn time_re() -> &'static Regex {
    TIME_RE.get_or_init(|| {
        let pattern = format!(
            r"(?i)(\d+(?:\.\d+)?)\s*(?:({UNIT})\s*)?(?:[~〜～\-]\s*(\d+(?:\.\d+)?)\s*)?({UNIT})"
        );
        Regex::new(&pattern).expect("time expression pattern is valid")
    })
}

fn unit_seconds(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "時間" | "hour" | "hours" | "hr" | "hrs" => 3600.0,
        "分間" | "分" | "minute" | "minutes" | "min" | "mins" => 60.0,
        _ => 1.0,
    }
}

/// Full-width digits and period to ASCII.
fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '．' => '.',
            _ => c,
        })
        .collect()
}

/// `分` followed by `の` (fraction, `3 分 の 1`) or `目` (fill level, `8 分 目`)
/// is not a duration.
fn is_fraction(unit: &str, rest: &str) -> bool {
    unit == "分" && matches!(rest.trim_start().chars().next(), Some('の' | '目'))
}

/// Sum every literal time expression (e.g. `10 分`, `1〜2 時間`) in seconds.
/// Ranges count their upper bound.
pub fn literal_time(wakati: &str) -> f64 {
    let text = normalize_digits(wakati);
    time_re()
        .captures_iter(&text)
        .filter_map(|caps| {
            let unit = caps.get(4)?;
            if is_fraction(unit.as_str(), &text[unit.end()..]) {
                return None;
            }
            let amount = caps
                .get(3)
                .or_else(|| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())?;
            Some(amount * unit_seconds(unit.as_str()))
        })
        .sum()
}

pub fn estimate(tokens: &[TaggedToken], wakati: &str, table: &ActionTimeTable) -> TimeEstimate {
    let actions = extract_action_words(tokens);
    let actiontime = sum_action_time(&actions, table);
    let recipetime = literal_time(wakati);
    TimeEstimate {
        count: count_action_words(&actions),
        time: actiontime + recipetime,
        recipetime,
        actiontime,
        params: table.records(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::parse_annotated;

    fn table(entries: &[(&str, u64)]) -> ActionTimeTable {
        ActionTimeTable::from_records(entries.iter().map(|(a, t)| ActionTimeRecord {
            action: a.to_string(),
            time: (*t).into(),
        }))
    }

    #[test]
    fn extracts_chef_actions_only() {
        let tokens = parse_annotated("玉=ねぎ/F を 切/Ac り 、 鍋/T で 煮/Ac る 。 煮/Af え たら");
        assert_eq!(extract_action_words(&tokens), vec!["切", "煮"]);
    }

    #[test]
    fn repeated_actions_sum_once_but_count_each() {
        let tokens = parse_annotated("切/Ac る 切/Ac る 煮/Ac る");
        let est = estimate(&tokens, "切 る 切 る 煮 る", &table(&[("切", 60), ("煮", 300)]));
        assert_eq!(est.actiontime, 360.0);
        assert_eq!(est.count["切"], 2);
        assert_eq!(est.count["煮"], 1);
    }

    #[test]
    fn missing_actions_contribute_zero() {
        let tokens = parse_annotated("焼/Ac く 切/Ac る");
        let est = estimate(&tokens, "", &table(&[("切", 60)]));
        assert_eq!(est.actiontime, 60.0);
        assert_eq!(est.time, 60.0);
    }

    #[test]
    fn literal_time_handles_units_and_ranges() {
        assert_eq!(literal_time("10 分 煮 る"), 600.0);
        assert_eq!(literal_time("1 時間 寝か せる"), 3600.0);
        assert_eq!(literal_time("30 秒 混ぜ る"), 30.0);
        assert_eq!(literal_time("5 〜 6 分間"), 360.0);
        assert_eq!(literal_time("１０分"), 600.0);
        assert_eq!(literal_time("bake for 10 minutes then rest 1.5 hours"), 600.0 + 5400.0);
        assert_eq!(literal_time("塩 少々"), 0.0);
    }

    #[test]
    fn range_with_unit_on_both_ends_counts_upper_bound() {
        assert_eq!(literal_time("5 分 〜 10 分 煮 る"), 600.0);
        assert_eq!(literal_time("1 時間 ~ 2 時間 寝か せる"), 7200.0);
        assert_eq!(literal_time("10〜15分"), 900.0);
    }

    #[test]
    fn fractions_and_fill_levels_are_not_minutes() {
        assert_eq!(literal_time("鍋 の 3 分 の 1 まで 水 を 入れ る"), 0.0);
        assert_eq!(literal_time("8 分 目 まで 注 ぐ"), 0.0);
        assert_eq!(literal_time("8分目 まで 注ぐ 。 5 分 煮 る"), 300.0);
    }

    #[test]
    fn ascii_units_need_a_word_boundary() {
        assert_eq!(literal_time("add 2 minced cloves"), 0.0);
        assert_eq!(literal_time("3 second-hand pans"), 3.0);
        assert_eq!(literal_time("simmer 2 min"), 120.0);
    }

    #[test]
    fn total_adds_table_and_literal_time() {
        let tokens = parse_annotated("煮/Ac る");
        let est = estimate(&tokens, "10 分 煮 る", &table(&[("煮", 120)]));
        assert_eq!(est.actiontime, 120.0);
        assert_eq!(est.recipetime, 600.0);
        assert_eq!(est.time, 720.0);
        assert_eq!(est.params.len(), 1);
    }
}
