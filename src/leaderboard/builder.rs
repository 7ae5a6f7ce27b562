//! Leaderboard aggregation: group, sum, rank, cap, reorder, mask, round.

use std::collections::HashMap;

use crate::leaderboard::mask::mask_username;
use crate::models::{Amount, LeaderboardEntry};

/// Boards never show more than this many rows.
pub const MAX_ENTRIES: usize = 10;

/// How totals are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Nearest integer, halves rounded towards positive infinity.
    Whole,
    /// Two decimal places, decided on the exact binary value with halves rounded away from zero.
    Cents,
}

impl Rounding {
    pub fn apply(self, total: f64) -> Amount {
        match self {
            Rounding::Whole => Amount::Whole(round_half_up(total) as i64),
            Rounding::Cents => Amount::Cents(round_cents(total)),
        }
    }
}

/// `x - floor(x)` is exact, so no addition error can push a value below one half over it.
fn round_half_up(total: f64) -> f64 {
    let floor = total.floor();
    if total - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Digits past which every finite f64 has terminated in decimal.
const EXACT_FRACTION_DIGITS: usize = 1100;

/// Round to two decimals using the full decimal expansion of `total`.
///
/// `0.015` is stored as `0.01499999...`, so it becomes `0.01`; scaling by 100 first would
/// produce `1.5` and round up.
fn round_cents(total: f64) -> f64 {
    if !total.is_finite() || total.abs() >= 1e21 {
        return total;
    }

    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, total.abs());
    let Some((int_part, frac)) = exact.split_once('.') else {
        return total;
    };
    let frac = frac.as_bytes();
    let mut digits: Vec<u8> = int_part.bytes().chain(frac[..2].iter().copied()).collect();

    if frac[2] >= b'5' {
        // Propagate the carry through the kept digits.
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let rounded = format!(
        "{}.{}",
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    );
    let magnitude = rounded.parse::<f64>().unwrap_or(0.0);
    if total < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Build a ranked, masked board from raw per-user records.
///
/// Records are grouped by the *unmasked* name returned by `username`, so two names that
/// mask identically still rank separately, while every record without a resolvable name
/// lands in the same sentinel group. Groups are ranked by their summed `value` with ties
/// kept in first-seen order, the list is capped at [`MAX_ENTRIES`], and then the first two
/// rows trade places. The swap is a fixed display rule of the public board, not a tie-break.
pub fn build<R>(
    records: &[R],
    username: impl Fn(&R) -> String,
    value: impl Fn(&R) -> f64,
    rounding: Rounding,
) -> Vec<LeaderboardEntry> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();

    for record in records {
        let key = username(record);
        let v = value(record);
        let v = if v.is_finite() { v } else { 0.0 };

        match slots.get(&key) {
            Some(&i) => totals[i].1 += v,
            None => {
                slots.insert(key.clone(), totals.len());
                totals.push((key, v));
            }
        }
    }

    // `sort_by` is stable: equal totals keep encounter order.
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals.truncate(MAX_ENTRIES);
    if totals.len() >= 2 {
        totals.swap(0, 1);
    }

    totals
        .into_iter()
        .map(|(name, total)| {
            let amount = rounding.apply(total);
            LeaderboardEntry {
                username: mask_username(Some(&name)),
                wagered: amount,
                weighted_wager: amount,
            }
        })
        .collect()
}
