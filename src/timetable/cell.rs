//! Course blocks of a single timetable cell.
//!
//! The portal writes one course as four lines separated by `<br>`:
//! name, teacher, weeks/periods and room. Every line but the name may or
//! may not be wrapped in a `<font>` tag.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::timetable::models::{CourseInfo, Skip};
use crate::utils::{clean_text, strip_tags};

static BR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static FONT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<font[^>]*>(.*?)</font>").unwrap());
static LEADING_FONT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^<font[^>]*>(.*?)</font>").unwrap());

/// Raw course blocks of a cell, empty when there is no class that day
pub fn blocks(cell: ElementRef) -> Vec<String> {
    // Selectors
    let sel_content = Selector::parse("p.kbcontent, div.kbcontent").unwrap();
    let sel_titled = Selector::parse("p[title]").unwrap();

    let has_title = |element: &ElementRef| {
        element
            .value()
            .attr("title")
            .is_some_and(|title| !title.trim().is_empty())
    };

    let mut elements: Vec<_> = cell.select(&sel_content).collect();
    // Older pages only put the course in a title
    if elements.is_empty() {
        elements = cell.select(&sel_titled).filter(has_title).collect();
    }

    elements
        .into_iter()
        .map(|element| match element.value().attr("title") {
            Some(title) if !title.trim().is_empty() => title.to_owned(),
            _ => element.inner_html(),
        })
        .collect()
}

/// Split a raw block into the course's attributes
pub fn course_info(block: &str) -> Result<CourseInfo, Skip> {
    if block.trim().is_empty() {
        return Err(Skip::EmptyBlock);
    }

    let lines: Vec<&str> = BR
        .split(block)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 3 {
        return Err(Skip::NotACourse);
    }

    let name = course_name(lines[0]);
    if name.is_empty() {
        return Err(Skip::NotACourse);
    }

    Ok(CourseInfo {
        name,
        teacher: font_or_text(&FONT, lines[1]),
        descriptor: font_or_text(&LEADING_FONT, lines[2]),
        location: lines
            .get(3)
            .map(|line| font_or_text(&FONT, line))
            .unwrap_or_default(),
    })
}

/// Name is cut at the first tag following it
///
/// Unlike a plain cut at the first tag, a line starting with a tag
/// (`<b>X</b>`) isn't discarded: its text with tags stripped is the name.
fn course_name(line: &str) -> String {
    let head = line.split('<').next().map(clean_text).unwrap_or_default();
    if head.is_empty() {
        // Name wrapped in a tag
        clean_text(line)
    } else {
        head
    }
}

/// Content of the first tag matched by `re`, else the line without its tags
fn font_or_text(re: &Regex, line: &str) -> String {
    match re.captures(line) {
        Some(cap) => clean_text(&cap[1]),
        None => clean_text(&strip_tags(line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn cell_blocks(markup: &str) -> Vec<String> {
        let html = Html::parse_fragment(&format!("<table><tr><td>{markup}</td></tr></table>"));
        let sel_td = Selector::parse("td").unwrap();
        blocks(html.select(&sel_td).next().unwrap())
    }

    #[test]
    fn content_class_on_div_and_p() {
        let blocks = cell_blocks(
            r#"<div class="kbcontent">A<br>B<br>C</div><p class="kbcontent">D<br>E<br>F</p>"#,
        );
        assert_eq!(blocks, vec!["A<br>B<br>C", "D<br>E<br>F"]);
    }

    #[test]
    fn hidden_short_variant_is_ignored() {
        let blocks = cell_blocks(
            r#"<div class="kbcontent1">short</div><div class="kbcontent">A<br>B<br>C</div>"#,
        );
        assert_eq!(blocks, vec!["A<br>B<br>C"]);
    }

    #[test]
    fn title_wins_over_markup() {
        let blocks = cell_blocks(r#"<p class="kbcontent" title="X&lt;br/&gt;Y&lt;br/&gt;Z">ignored</p>"#);
        assert_eq!(blocks, vec!["X<br/>Y<br/>Z"]);
    }

    #[test]
    fn titled_paragraph_is_a_fallback() {
        let blocks = cell_blocks(r#"<p title="">empty</p><p title="A&lt;br&gt;B&lt;br&gt;C">x</p>"#);
        assert_eq!(blocks, vec!["A<br>B<br>C"]);

        let blocks = cell_blocks(r#"<div class="kbcontent">K</div><p title="T">x</p>"#);
        assert_eq!(blocks, vec!["K"]);
    }

    #[test]
    fn empty_cell_has_no_block() {
        assert!(cell_blocks("&nbsp;").is_empty());
    }

    #[test]
    fn four_lines_with_fonts() {
        let info = course_info(
            r#"高等数学<br><font title="老师">张三</font><br><font title="周次(节次)">1-16(周)[01-02节]</font><br><font title="教室">A101</font><br>"#,
        )
        .unwrap();
        assert_eq!(
            info,
            CourseInfo {
                name: "高等数学".to_owned(),
                teacher: "张三".to_owned(),
                descriptor: "1-16(周)[01-02节]".to_owned(),
                location: "A101".to_owned(),
            }
        );
    }

    #[test]
    fn plain_lines_without_room() {
        let info = course_info("大学英语<br/>李四<br />1-8(周)").unwrap();
        assert_eq!(info.name, "大学英语");
        assert_eq!(info.teacher, "李四");
        assert_eq!(info.descriptor, "1-8(周)");
        assert_eq!(info.location, "");
    }

    #[test]
    fn name_cut_at_trailing_markup() {
        let info = course_info("体育&amp;健康<span>(2)</span><BR>王五<BR>3-4(周)<BR>操场").unwrap();
        assert_eq!(info.name, "体育&健康");
        assert_eq!(info.location, "操场");
    }

    #[test]
    fn descriptor_font_must_lead_the_line() {
        let info = course_info("C<br>T<br>x <font>1-2(周)</font>").unwrap();
        assert_eq!(info.descriptor, "x 1-2(周)");
    }

    #[test]
    fn two_lines_are_not_a_course() {
        assert_eq!(course_info("高等数学<br>张三<br>  <br>"), Err(Skip::NotACourse));
        assert_eq!(course_info("   "), Err(Skip::EmptyBlock));
    }

    #[test]
    fn name_wrapped_in_a_tag_is_unwrapped() {
        let info = course_info("<b>线性代数</b><br>T<br>1(周)").unwrap();
        assert_eq!(info.name, "线性代数");
    }

    #[test]
    fn nameless_block_is_discarded() {
        assert_eq!(course_info("<b></b><br>T<br>1(周)"), Err(Skip::NotACourse));
    }
}
