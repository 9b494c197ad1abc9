// src/news/rss.rs
//! RSS 2.0 and Atom documents into `RawFeed`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{
    format_description::well_known::{Rfc2822, Rfc3339},
    OffsetDateTime,
};

use crate::news::types::{RawEntry, RawFeed};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

impl AtomText {
    fn into_value(self) -> Option<String> {
        self.value
    }
}

/// Parse a syndication document. Atom is detected by its `<feed>` root,
/// everything else is read as RSS 2.0.
pub fn parse_feed(xml: &str) -> Result<RawFeed> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    if looks_like_atom(&xml_clean) {
        parse_atom(&xml_clean)
    } else {
        parse_rss(&xml_clean)
    }
}

fn parse_rss(xml: &str) -> Result<RawFeed> {
    let rss: Rss = from_str(xml).context("parsing rss xml")?;
    let entries = rss
        .channel
        .item
        .into_iter()
        .map(|it| RawEntry {
            title: it.title,
            link: it.link,
            description: it.description,
            published: it.pub_date,
        })
        .collect();

    Ok(RawFeed {
        title: rss.channel.title,
        entries,
    })
}

fn parse_atom(xml: &str) -> Result<RawFeed> {
    let feed: AtomFeed = from_str(xml).context("parsing atom xml")?;
    let entries = feed
        .entry
        .into_iter()
        .map(|e| {
            let link = pick_atom_link(&e.link);
            RawEntry {
                title: e.title.and_then(AtomText::into_value),
                link,
                description: e
                    .summary
                    .and_then(AtomText::into_value)
                    .or_else(|| e.content.and_then(AtomText::into_value)),
                published: e.published.or(e.updated),
            }
        })
        .collect();

    Ok(RawFeed {
        title: feed.title.and_then(AtomText::into_value),
        entries,
    })
}

// Prefer rel="alternate" (or no rel, which means alternate) over self/edit links.
fn pick_atom_link(links: &[AtomLink]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .and_then(|l| l.href.clone())
}

fn looks_like_atom(xml: &str) -> bool {
    let Some(feed_at) = xml.find("<feed") else {
        return false;
    };
    match xml.find("<rss") {
        Some(rss_at) => feed_at < rss_at,
        None => true,
    }
}

/// Publication date as UTC. Accepts RFC 2822 (RSS `pubDate`) and RFC 3339
/// (Atom); anything else yields `None`.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let ts = raw.trim();
    if ts.is_empty() {
        return None;
    }
    OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond()))
        // chrono is more lenient with obsolete zone names ("GMT", "EST").
        .or_else(|| {
            DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

// XML only knows five named entities; feeds routinely ship HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_and_rfc3339_dates_parse() {
        let a = parse_published("Tue, 14 Oct 2025 08:30:00 +0200").unwrap();
        assert_eq!(a.to_rfc3339(), "2025-10-14T06:30:00+00:00");

        let b = parse_published("2025-10-14T06:30:00Z").unwrap();
        assert_eq!(a, b);

        let c = parse_published("Tue, 14 Oct 2025 06:30:00 GMT").unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn garbage_date_is_none() {
        assert!(parse_published("yesterday-ish").is_none());
        assert!(parse_published("   ").is_none());
    }

    #[test]
    fn atom_detection_prefers_root() {
        assert!(looks_like_atom(r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"></feed>"#));
        assert!(!looks_like_atom(r#"<rss version="2.0"><channel></channel></rss>"#));
    }

    #[test]
    fn rss_with_html_entities_parses() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Wire</title>
<item><title>Court&nbsp;rules</title><link>https://x.test/a</link></item>
</channel></rss>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Wire"));
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].title.as_deref(), Some("Court rules"));
    }
}
