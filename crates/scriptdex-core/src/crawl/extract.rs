//! Link and script discovery in a fetched page.

use scraper::{Html, Selector};
use url::Url;

/// What a page points at.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageScripts {
    /// Absolute `a[href]` targets, fragments stripped.
    pub links: Vec<Url>,
    /// Non-empty bodies of `script` elements without `src`.
    pub inline: Vec<String>,
    /// Absolute `script[src]` URLs.
    pub external: Vec<Url>,
}

fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!(css, "invalid selector: {:?}", e);
            None
        }
    }
}

/// Resolves `href` against `base`; keeps http(s) only.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let mut url = match base.join(href.trim()) {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(base = %base, href, "url parse: {}", e);
            return None;
        }
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

pub fn extract_page(base: &Url, html: &str) -> PageScripts {
    let doc = Html::parse_document(html);
    let mut found = PageScripts::default();

    if let Some(links) = selector("a[href]") {
        found.links = doc
            .select(&links)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| resolve(base, href))
            .collect();
    }

    if let Some(scripts) = selector("script") {
        for el in doc.select(&scripts) {
            match el.value().attr("src") {
                Some(src) if !src.is_empty() => {
                    if let Some(url) = resolve(base, src) {
                        found.external.push(url);
                    }
                }
                _ => {
                    let text: String = el.text().collect();
                    if !text.is_empty() {
                        found.inline.push(text);
                    }
                }
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head>
<script src="/static/app.js"></script>
<script src="https://cdn.example.net/lib.js#v2"></script>
<script>var inline = 1;</script>
<script></script>
<script src=""></script>
</head><body>
<a href="/about#team">About</a>
<a href="contact">Contact</a>
<a href="mailto:someone@example.com">Mail</a>
<a href="javascript:void(0)">Nothing</a>
</body></html>"#;

    #[test]
    fn finds_links_and_scripts() {
        let base = Url::parse("https://example.com/docs/index.html").unwrap();
        let found = extract_page(&base, PAGE);

        let links: Vec<&str> = found.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec!["https://example.com/about", "https://example.com/docs/contact"]
        );

        let external: Vec<&str> = found.external.iter().map(Url::as_str).collect();
        assert_eq!(
            external,
            vec![
                "https://example.com/static/app.js",
                "https://cdn.example.net/lib.js"
            ]
        );

        assert_eq!(found.inline, vec!["var inline = 1;".to_string()]);
    }

    #[test]
    fn resolve_rejects_non_http() {
        let base = Url::parse("http://example.com/").unwrap();
        assert!(resolve(&base, "ftp://example.com/x").is_none());
        assert!(resolve(&base, "http://[::1").is_none());
        assert_eq!(
            resolve(&base, " /a#b ").unwrap().as_str(),
            "http://example.com/a"
        );
    }
}
