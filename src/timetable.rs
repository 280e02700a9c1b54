use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use scraper::{Html, Selector};

use crate::{
    config::{Config, SlotTable},
    error::{Error, Result},
    utils::{
        center, etc_str,
        models::{Position, TabChar},
    },
};

use self::models::{CellOutcome, CourseOccurrence, Skip};

pub mod cell;
pub mod descriptor;
pub mod models;
pub mod occurrence;

/// Every class meeting of the semester, in document order
///
/// Rows of the portal's table are groups of periods and columns weekdays.
/// Cells that don't hold a readable course are skipped; only a page
/// without the timetable fails.
pub fn parse(
    html: &str,
    semester_start: NaiveDate,
    config: &Config,
) -> Result<Vec<CourseOccurrence>> {
    let document = Html::parse_document(html);

    // Selectors
    let sel_table = Selector::parse("table.Nsb_r_list.Nsb_table").unwrap();
    let sel_tr = Selector::parse("tr").unwrap();
    let sel_td = Selector::parse("td").unwrap();

    // Find the timetable
    let raw_timetable = document
        .select(&sel_table)
        .next()
        .ok_or(Error::NoTimetable)?;

    if semester_start.weekday() != Weekday::Mon {
        log::warn!(
            "Semester start {semester_start} is a {}, not a monday",
            semester_start.weekday()
        );
    }

    let mut courses = Vec::new();
    let mut rows = 0;
    // First row is the weekday header
    for (row, tr) in raw_timetable.select(&sel_tr).skip(1).enumerate() {
        rows += 1;
        // Approximation: assumes one row per slot, wrong if the portal merges rows
        let default_slot = u32::try_from(row + 1).unwrap_or(u32::MAX);

        for (column, td) in tr.select(&sel_td).enumerate() {
            let weekday = column + 1;
            for block in cell::blocks(td) {
                match walk_block(&block, weekday, default_slot, semester_start, &config.slots) {
                    CellOutcome::Ok(mut occurrences) => courses.append(&mut occurrences),
                    CellOutcome::Skipped(reason @ Skip::SlotOutOfRange(_)) => {
                        log::warn!("Row {default_slot}, column {weekday}: {reason}");
                    }
                    CellOutcome::Skipped(reason) => {
                        log::debug!("Row {default_slot}, column {weekday}: {reason}");
                    }
                }
            }
        }
    }

    log::info!("Walked {rows} rows, found {} course occurrences", courses.len());
    if courses.is_empty() {
        log::warn!("The timetable holds no course");
    }

    Ok(courses)
}

/// Run one raw course block through the whole chain
fn walk_block(
    block: &str,
    weekday: usize,
    default_slot: u32,
    semester_start: NaiveDate,
    slots: &SlotTable,
) -> CellOutcome {
    let occurrences = || {
        if weekday > 7 {
            return Err(Skip::ColumnOutOfRange(weekday));
        }

        let info = cell::course_info(block)?;

        let weeks = descriptor::weeks(&info.descriptor);
        if weeks.is_empty() {
            return Err(Skip::NoWeeks(info.descriptor));
        }

        let index = descriptor::slot(&info.descriptor, default_slot);
        let slot = slots.get(index).ok_or(Skip::SlotOutOfRange(index))?;

        occurrence::expand(&info, &weeks, slot, weekday, semester_start)
    };

    match occurrences() {
        Ok(occurrences) => CellOutcome::Ok(occurrences),
        Err(reason) => CellOutcome::Skipped(reason),
    }
}

const DAYS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

/// Weekly grid of the distinct courses, slots as rows and weekdays as columns
pub fn render(courses: &[CourseOccurrence], slots: &SlotTable, cell_length: usize) -> String {
    // Cell length for hours
    let clh = 13;

    let mut grid = vec![[(); 7].map(|()| BTreeSet::new()); slots.len()];
    for course in courses {
        let day = course.start.weekday().num_days_from_monday() as usize;
        if let Some(i) = slots.iter().position(|s| s.start == course.start.time()) {
            grid[i][day].insert(course.name.as_str());
        }
    }

    // Hide the weekend when it's free
    let weekend = grid.iter().any(|row| !row[5].is_empty() || !row[6].is_empty());
    let cn = if weekend { 7 } else { 5 };

    let sep = TabChar::Bv.val();
    let mut out = String::new();

    out += &line_table(clh, cell_length, cn, &Position::Top);
    out.push(sep);
    out += &center("", clh);
    for day in &DAYS[..cn] {
        out.push(sep);
        out += &center(day, cell_length);
    }
    out.push(sep);
    out.push('\n');

    for (slot, row) in slots.iter().zip(&grid) {
        out += &line_table(clh, cell_length, cn, &Position::Middle);
        out.push(sep);
        let hours = format!("{}-{}", slot.start.format("%H:%M"), slot.end.format("%H:%M"));
        out += &center(&hours, clh);
        for names in &row[..cn] {
            let text = names.iter().copied().collect::<Vec<_>>().join("/");
            out.push(sep);
            out += &center(&etc_str(&text, cell_length), cell_length);
        }
        out.push(sep);
        out.push('\n');
    }
    out += &line_table(clh, cell_length, cn, &Position::Bottom);

    out
}

/// Display the timetable
pub fn display(courses: &[CourseOccurrence], slots: &SlotTable) {
    print!("{}", render(courses, slots, 16));
}

/// Horizontal line of the table
fn line_table(clh: usize, cell_length: usize, cn: usize, position: &Position) -> String {
    let (left, inner, right) = position.joints();
    let bar = TabChar::Bh.val().to_string();

    let mut line = String::new();
    line.push(left);
    line += &bar.repeat(clh);
    for _ in 0..cn {
        line.push(inner);
        line += &bar.repeat(cell_length);
    }
    line.push(right);
    line.push('\n');

    line
}
