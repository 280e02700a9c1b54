//! Grammars of the weeks/periods descriptor, i.e. `1-4,6-12,14(周)[03-04节]`

use std::sync::LazyLock;

use regex::Regex;

/// Ranges are cut at this week, ten years of semesters
pub const MAX_WEEK: u32 = 520;

/// Weeks a course takes place, in the order the descriptor lists them
///
/// Tokens are either `n` or an inclusive `a-b`. Anything else is ignored,
/// so a descriptor with no valid token gives an empty list. Overlapping
/// ranges are kept as written, duplicates included.
pub fn weeks(descriptor: &str) -> Vec<u32> {
    static SUFFIX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(.+?)[(（]周[)）]").unwrap());

    let list = SUFFIX
        .captures(descriptor)
        .and_then(|cap| cap.get(1))
        .map_or(descriptor, |m| m.as_str());

    let mut weeks = Vec::new();
    for token in list.split(',').map(str::trim) {
        match week_token(token) {
            Some((start, end)) => weeks.extend(start..=end),
            None => log::debug!("Ignoring week token `{token}` in `{descriptor}`"),
        }
    }

    weeks
}

/// Bounds of one token, `None` if it doesn't conform
fn week_token(token: &str) -> Option<(u32, u32)> {
    let number = |s: &str| -> Option<u32> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok().filter(|&n| n >= 1)
    };

    let (start, end) = match token.split_once('-') {
        Some((start, end)) => (number(start)?, number(end)?),
        None => number(token).map(|week| (week, week))?,
    };
    if start > MAX_WEEK {
        return None;
    }
    if end > MAX_WEEK {
        log::warn!("Week range `{token}` cut at week {MAX_WEEK}");
    }

    Some((start, end.min(MAX_WEEK)))
}

/// Lesson slot given by a `[a-b]节` period range
///
/// Periods go by pairs, so periods 1-2 are slot 1, 3-4 slot 2 and so on.
pub fn periods(descriptor: &str) -> Option<u32> {
    static PERIODS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[?(\d+)-(\d+)\]?节").unwrap());

    PERIODS
        .captures(descriptor)
        .and_then(|cap| cap[1].parse::<u32>().ok())
        .map(|first| first.saturating_add(1) / 2)
}

/// Same as [`periods`], `default` when the descriptor has no period range
///
/// Callers pass the row's ordinal as `default`. That is only a guess: it
/// stops matching the real slot as soon as the portal merges rows.
pub fn slot(descriptor: &str, default: u32) -> u32 {
    periods(descriptor).unwrap_or_else(|| {
        log::debug!("No period range in `{descriptor}`, guessing slot {default}");
        default
    })
}
