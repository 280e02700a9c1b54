use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

use regex::{Captures, Regex};
use reqwest::{cookie::Jar, StatusCode, Url};

use crate::{
    config::PortalConfig,
    error::{Error, Result},
};

pub mod models;

/// Marker only present on the full-semester timetable page
const TIMETABLE_TITLE: &str = "<title>学期理论课表</title>";

/// Fail if the portal didn't answer with the timetable page
pub fn check_errors(status: StatusCode, html: &str, loc: &str) -> Result<()> {
    match html {
        _ if !status.is_success() => Err(Error::SessionExpired(format!("{loc} ({status})"))),
        t if !t.contains(TIMETABLE_TITLE) => Err(Error::SessionExpired(loc.to_owned())),
        _ => Ok(()),
    }
}

/// Get the timetable webpage for the session behind a `TGC` SSO cookie
pub async fn get_timetable_page(tgc: &str, portal: &PortalConfig) -> Result<String> {
    let cas =
        Url::parse(&portal.cas_url).map_err(|_| Error::InvalidUrl(portal.cas_url.clone()))?;

    let jar = Jar::default();
    jar.add_cookie_str(
        &format!("TGC={tgc}; Domain={}; Path=/", portal.cookie_domain),
        &cas,
    );

    // Use custom User-Agent, keep the cookies along the SSO redirects
    let client = reqwest::Client::builder()
        .user_agent(&portal.user_agent)
        .cookie_provider(Arc::new(jar))
        .danger_accept_invalid_certs(portal.insecure)
        .build()?;

    log::debug!("SSO redirect through {}", portal.cas_url);
    client
        .get(format!(
            "{}/login?service={}/jsxsd/sso.jsp",
            portal.cas_url, portal.portal_url
        ))
        .timeout(Duration::from_secs(10))
        .send()
        .await?;

    // The timetable refuses to answer before the main frame was visited once
    client
        .get(format!("{}/jsxsd/framework/xsMain.jsp", portal.portal_url))
        .timeout(Duration::from_secs(10))
        .send()
        .await?;

    // No parameters means the whole semester
    let url = format!("{}/jsxsd/xskb/xskb_list.do", portal.portal_url);
    let response = client
        .get(&url)
        .timeout(Duration::from_secs(15))
        .send()
        .await?;
    let status = response.status();
    let html = response.text().await?;

    check_errors(status, &html, &url)?;
    log::info!("Fetched timetable page ({} bytes)", html.len());

    Ok(html)
}

/// Remove every tag of a markup fragment
pub fn strip_tags(markup: &str) -> String {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

    RE.replace_all(markup, "").into_owned()
}

/// Decode the entities the portal actually emits
pub fn decode_entities(text: &str) -> String {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)&(#x[0-9a-f]+|#\d+|nbsp|amp|lt|gt|quot|apos);").unwrap());

    RE.replace_all(text, |cap: &Captures| {
        let entity = cap[1].to_ascii_lowercase();
        let decoded = match entity.as_str() {
            "nbsp" => Some(' '),
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            hex if hex.starts_with("#x") => {
                u32::from_str_radix(&hex[2..], 16).ok().and_then(char::from_u32)
            }
            dec => dec[1..].parse().ok().and_then(char::from_u32),
        };

        // Leave unknown code points as they were written
        decoded.map_or_else(|| cap[0].to_owned(), String::from)
    })
    .into_owned()
}

/// Strip tags, decode entities and collapse whitespace
pub fn clean_text(markup: &str) -> String {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

    RE.replace_all(decode_entities(&strip_tags(markup)).trim(), " ")
        .into_owned()
}

/// Columns a string takes in a terminal, wide for CJK
pub fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| if u32::from(c) >= 0x1100 { 2 } else { 1 })
        .sum()
}

/// Shorten a string to `width` columns, ending with an ellipsis if cut
pub fn etc_str(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_owned();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = display_width(c.encode_utf8(&mut [0; 4]));
        // Keep a column for the ellipsis
        if used + w + 1 > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');

    out
}

/// Center a string in `width` columns
pub fn center(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(s));
    let left = pad / 2;

    format!("{}{s}{}", " ".repeat(left), " ".repeat(pad - left))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_keeps_text() {
        assert_eq!(
            strip_tags(r#"<font title="老师">张三</font><br/>"#),
            "张三"
        );
    }

    #[test]
    fn decode_entities_named_and_numeric() {
        assert_eq!(decode_entities("A&amp;B&nbsp;&lt;x&gt;"), "A&B <x>");
        assert_eq!(decode_entities("&#39;&#x4E2D;&QUOT;"), "'中\"");
        assert_eq!(decode_entities("&#xFFFFFFF;"), "&#xFFFFFFF;");
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(
            clean_text("  <b>高等&nbsp;&nbsp;数学</b>\n  (上) "),
            "高等 数学 (上)"
        );
    }

    #[test]
    fn check_errors_requires_title_marker() {
        let page = format!("<html><head>{TIMETABLE_TITLE}</head></html>");
        assert!(check_errors(StatusCode::OK, &page, "u").is_ok());
        assert!(matches!(
            check_errors(StatusCode::OK, "<title>登录</title>", "u"),
            Err(Error::SessionExpired(_))
        ));
        assert!(check_errors(StatusCode::FOUND, &page, "u").is_err());
    }

    #[test]
    fn width_helpers_count_cjk_twice() {
        assert_eq!(display_width("ab中"), 4);
        assert_eq!(etc_str("高等数学", 8), "高等数学");
        assert_eq!(etc_str("高等数学", 6), "高等…");
        assert_eq!(center("中", 4), " 中 ");
    }
}
