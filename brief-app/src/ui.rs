//! Server-rendered HTML for the single-page UI.

use crate::service::{ArticleSummary, CardOutcome};
use brief_web::{Headline, HeadlineSource};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "AI News Summarizer";
pub const CARD_PLACEHOLDER: &str = "Click 'Summarize' to get an AI-generated summary.";
pub const SELECT_SOURCE_HINT: &str = "Please select a news source from the sidebar to view headlines.";
pub const NO_HEADLINES: &str = "No headlines found or an error occurred. Please try again later.";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; color: #222; }
aside { width: 16rem; padding: 1.5rem; background: #f4f5f7; min-height: 100vh; }
main { flex: 1; padding: 1.5rem 2.5rem; max-width: 60rem; }
form.inline { display: flex; gap: .5rem; }
input[type=url] { flex: 1; padding: .4rem; }
.card { border: 1px solid #ddd; border-radius: .5rem; padding: 1rem; margin: 1rem 0; }
.info { background: #e8f1fb; padding: .6rem .8rem; border-radius: .3rem; }
.error { background: #fdecea; color: #8a1c12; padding: .6rem .8rem; border-radius: .3rem; }
.meta { color: #666; font-size: .9em; }
"#;

/// Escape text for HTML element content and quoted attribute values.
///
/// ```
/// use brief_app::ui::escape;
///
/// assert_eq!(escape(r#"<a href="x">Tom & Jerry's</a>"#),
///     "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;");
/// ```
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sidebar headline panel state.
pub enum HeadlinePanel {
    NoSource,
    Unavailable,
    Cards(Vec<HeadlineCard>),
}

pub struct HeadlineCard {
    pub headline: Headline,
    pub outcome: Option<CardOutcome>,
}

/// Everything one render of `/` needs.
pub struct Page<'a> {
    pub url_input: &'a str,
    pub result: Option<&'a ArticleSummary>,
    pub error: Option<String>,
    pub source: Option<HeadlineSource>,
    pub count: usize,
    pub panel: HeadlinePanel,
    pub model: &'a str,
}

pub fn render(page: &Page<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    let _ = write!(
        html,
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{PAGE_TITLE}</title><style>{STYLE}</style></head><body>"
    );
    render_sidebar(&mut html, page);

    html.push_str("<main>");
    let _ = write!(html, "<h1>&#128240; {PAGE_TITLE}</h1>");
    html.push_str(
        "<p>Welcome to your <strong>AI News Summarizer</strong>! Paste an article link, \
         or select a news source from the sidebar and get instant summaries of top headlines.</p>",
    );
    let _ = write!(
        html,
        "<form class=\"inline\" method=\"post\" action=\"/summarize\">\
         <input type=\"url\" name=\"url\" placeholder=\"https://\" required value=\"{}\">\
         <input type=\"hidden\" name=\"source\" value=\"{}\">\
         <input type=\"hidden\" name=\"count\" value=\"{}\">\
         <button type=\"submit\">Summarize</button></form>",
        escape(page.url_input),
        page.source.map(|s| s.slug()).unwrap_or_default(),
        page.count
    );

    if let Some(err) = &page.error {
        let _ = write!(html, "<p class=\"error\">{}</p>", escape(err));
    }
    if let Some(result) = page.result {
        render_result(&mut html, result);
    }
    render_panel(&mut html, page);

    let _ = write!(
        html,
        "<p class=\"meta\">Model: {}</p></main></body></html>",
        escape(page.model)
    );
    html
}

fn render_sidebar(html: &mut String, page: &Page<'_>) {
    html.push_str(
        "<aside><h2>Settings</h2><p>Configure your news feed here.</p>\
         <form method=\"get\" action=\"/\"><label>Choose a News Source<br><select name=\"source\">",
    );
    let selected = |yes: bool| if yes { " selected" } else { "" };
    let _ = write!(
        html,
        "<option value=\"\"{}>Select a source</option>",
        selected(page.source.is_none())
    );
    for s in HeadlineSource::ALL {
        let _ = write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            s.slug(),
            selected(page.source == Some(*s)),
            s.label()
        );
    }
    let _ = write!(
        html,
        "</select></label><br><label>Number of articles to display<br>\
         <input type=\"number\" name=\"count\" min=\"1\" max=\"{}\" value=\"{}\"></label><br>\
         <button type=\"submit\">Show headlines</button></form></aside>",
        brief_web::headlines::MAX_HEADLINES,
        page.count
    );
}

fn render_result(html: &mut String, r: &ArticleSummary) {
    let _ = write!(
        html,
        "<section class=\"card\"><h2>{}</h2><p class=\"meta\"><a href=\"{}\" rel=\"noopener\">{}</a>",
        escape(&r.title),
        escape(&r.url),
        escape(&r.url)
    );
    if let Some(published) = r.published_at {
        let _ = write!(html, " &middot; {}", published.format("%Y-%m-%d"));
    }
    let _ = write!(
        html,
        "</p><p class=\"info\"><strong>AI Summary:</strong> {}</p></section>",
        escape(&r.summary)
    );
}

fn render_panel(html: &mut String, page: &Page<'_>) {
    match &page.panel {
        HeadlinePanel::NoSource => {
            let _ = write!(html, "<p class=\"info\">{SELECT_SOURCE_HINT}</p>");
        }
        HeadlinePanel::Unavailable => {
            let _ = write!(html, "<p class=\"error\">{NO_HEADLINES}</p>");
        }
        HeadlinePanel::Cards(cards) => {
            let label = page.source.map(|s| s.label()).unwrap_or_default();
            let _ = write!(html, "<h2>Latest Headlines from {label}</h2>");
            for card in cards {
                render_card(html, card, page);
            }
        }
    }
}

fn render_card(html: &mut String, card: &HeadlineCard, page: &Page<'_>) {
    let link = escape(&card.headline.link);
    let _ = write!(
        html,
        "<section class=\"card\"><h4>{}</h4>\
         <p><strong>Link:</strong> <a href=\"{link}\" rel=\"noopener\">Read Full Article</a></p>",
        escape(&card.headline.title)
    );
    let status = match &card.outcome {
        Some(CardOutcome::Summarized(s)) => {
            format!("<strong>AI Summary:</strong> {}", escape(&s.summary))
        }
        Some(CardOutcome::Failed(msg)) => escape(msg),
        None => CARD_PLACEHOLDER.to_string(),
    };
    let _ = write!(html, "<p class=\"info\">{status}</p>");
    let source = page.source.map(|s| s.slug()).unwrap_or_default();
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/headlines/summarize\">\
         <input type=\"hidden\" name=\"link\" value=\"{link}\">\
         <input type=\"hidden\" name=\"source\" value=\"{source}\">\
         <input type=\"hidden\" name=\"count\" value=\"{}\">\
         <button type=\"submit\">Summarize</button></form></section>",
        page.count
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page<'a>(panel: HeadlinePanel) -> Page<'a> {
        Page {
            url_input: "",
            result: None,
            error: None,
            source: None,
            count: 5,
            panel,
            model: "test-model",
        }
    }

    #[test]
    fn empty_page_has_title_and_hint() {
        let html = render(&page(HeadlinePanel::NoSource));
        assert!(html.contains("<title>AI News Summarizer</title>"));
        assert!(html.contains(SELECT_SOURCE_HINT));
        assert!(html.contains("<option value=\"\" selected>Select a source</option>"));
        assert!(html.contains(">Hacker News</option>"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut p = page(HeadlinePanel::Unavailable);
        p.url_input = "\"><script>alert(1)</script>";
        p.error = Some("<b>bad</b>".into());
        let html = render(&p);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(html.contains(NO_HEADLINES));
    }

    #[test]
    fn cards_show_outcome_or_placeholder() {
        let summary = ArticleSummary {
            url: "https://example.com/a".into(),
            title: "A".into(),
            summary: "Rates <held>.".into(),
            model: "m".into(),
            chars: 300,
            published_at: None,
        };
        let mut p = page(HeadlinePanel::Cards(vec![
            HeadlineCard {
                headline: Headline {
                    title: "A".into(),
                    link: "https://example.com/a".into(),
                },
                outcome: Some(CardOutcome::Summarized(summary)),
            },
            HeadlineCard {
                headline: Headline {
                    title: "B & C".into(),
                    link: "https://example.com/b".into(),
                },
                outcome: None,
            },
        ]));
        p.source = Some(HeadlineSource::HackerNews);
        let html = render(&p);
        assert!(html.contains("Latest Headlines from Hacker News"));
        assert!(html.contains("<strong>AI Summary:</strong> Rates &lt;held&gt;."));
        assert!(html.contains("B &amp; C"));
        assert!(html.contains(CARD_PLACEHOLDER));
        assert!(html.contains("name=\"source\" value=\"hacker-news\""));
    }

    #[test]
    fn url_form_carries_sidebar_selection() {
        let mut p = page(HeadlinePanel::NoSource);
        p.source = Some(HeadlineSource::HackerNews);
        p.count = 7;
        let html = render(&p);
        let form = html
            .split("action=\"/summarize\">")
            .nth(1)
            .and_then(|rest| rest.split("</form>").next())
            .expect("url form");
        assert!(form.contains("name=\"source\" value=\"hacker-news\""));
        assert!(form.contains("name=\"count\" value=\"7\""));
    }
}
