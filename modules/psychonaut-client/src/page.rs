//! Abstract and image derivation from `action=parse` payloads.

use std::sync::LazyLock;

use md5::{Digest, Md5};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

static PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<p[^>]*>(.*?)</p>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*\]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    pub thumb: String,
    pub image: String,
}

/// First two paragraphs of the page's lead section as plain text, or None
/// when the payload has no usable HTML.
pub fn extract_abstract(payload: &Value) -> Option<String> {
    let html = payload.pointer("/parse/text/*").and_then(Value::as_str)?;

    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(html)
        .map(|caps| decode_entities(&TAG.replace_all(&caps[1], "")))
        .collect();
    if paragraphs.is_empty() {
        debug!("lead section has no paragraphs");
        return None;
    }

    let text = paragraphs.join("\n");
    let text = REFERENCE.replace(text.trim(), "");
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(2)
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = WHITESPACE.replace_all(&joined, " ").trim().to_string();

    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// CDN URLs for every file on the page, or None when the upstream field is
/// absent or not an array.
pub fn derive_images(payload: &Value, cdn_url: &str, thumb_size: u32) -> Option<Vec<PageImage>> {
    let files = payload.pointer("/parse/images")?.as_array()?;
    Some(
        files
            .iter()
            .filter_map(Value::as_str)
            .map(|name| image_urls(name, cdn_url, thumb_size))
            .collect(),
    )
}

/// MediaWiki shards originals into `images/{h0}/{h0}{h1}/` directories by
/// the MD5 of the file name; thumbnails go through `thumb.php`.
pub fn image_urls(name: &str, cdn_url: &str, thumb_size: u32) -> PageImage {
    let digest = hex::encode(Md5::digest(name.as_bytes()));
    PageImage {
        thumb: format!("{cdn_url}w/thumb.php?f={name}&width={thumb_size}"),
        image: format!("{cdn_url}w/images/{}/{}/{name}", &digest[0..1], &digest[0..2]),
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_payload(html: &str) -> Value {
        json!({"parse": {"text": {"*": html}}})
    }

    #[test]
    fn abstract_takes_the_first_two_paragraphs() {
        let html = "<div class=\"mw-parser-output\">\
            <p>LSD is a <a href=\"/wiki/Psychedelic\">psychedelic</a> substance.[1]</p>\n\
            <p>It was first synthesized in 1938.</p>\n\
            <p>A third paragraph that must not appear.</p></div>";

        let summary = extract_abstract(&parse_payload(html)).unwrap();
        assert_eq!(
            summary,
            "LSD is a psychedelic substance. It was first synthesized in 1938."
        );
    }

    #[test]
    fn abstract_collapses_whitespace_and_decodes_entities() {
        let html = "<p>Dosage   varies &amp; depends\non the <b>route</b>.</p>";
        let summary = extract_abstract(&parse_payload(html)).unwrap();
        assert_eq!(summary, "Dosage varies & depends on the route.");
    }

    #[test]
    fn abstract_is_none_on_malformed_payloads() {
        assert_eq!(extract_abstract(&json!({})), None);
        assert_eq!(extract_abstract(&json!({"parse": {"text": {}}})), None);
        assert_eq!(extract_abstract(&parse_payload("<div>no paragraphs</div>")), None);
    }

    #[test]
    fn image_urls_follow_the_md5_sharding_scheme() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        let image = image_urls("abc", "https://psychonautwiki.org/", 100);
        assert_eq!(
            image.thumb,
            "https://psychonautwiki.org/w/thumb.php?f=abc&width=100"
        );
        assert_eq!(image.image, "https://psychonautwiki.org/w/images/9/90/abc");
    }

    #[test]
    fn image_shard_prefix_matches_the_digest() {
        let image = image_urls("File:LSD.svg", "https://psychonautwiki.org/", 100);
        let digest = hex::encode(Md5::digest("File:LSD.svg".as_bytes()));
        assert_eq!(
            image.image,
            format!(
                "https://psychonautwiki.org/w/images/{}/{}/File:LSD.svg",
                &digest[0..1],
                &digest[0..2]
            )
        );
    }

    #[test]
    fn images_require_an_array_field() {
        assert_eq!(derive_images(&json!({}), "https://cdn/", 100), None);
        assert_eq!(
            derive_images(&json!({"parse": {"images": "nope"}}), "https://cdn/", 100),
            None
        );

        let payload = json!({"parse": {"images": ["A.png", "B.png"]}});
        let images = derive_images(&payload, "https://cdn/", 100).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].thumb.contains("f=A.png&width=100"));
    }
}
