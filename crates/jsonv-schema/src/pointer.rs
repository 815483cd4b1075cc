use std::fmt::Display;

use serde_json::Value;

/// A parsed `$ref` target: an optional document URL plus the JSON Pointer
/// segments addressing a node inside that document.
///
/// `url == None` means the reference points into the document currently
/// being processed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SchemaRef {
    pub url: Option<String>,
    pub segments: Vec<String>,
}

impl SchemaRef {
    /// Parse a raw reference string such as `#/definitions/foo` or
    /// `https://example.com/schema.json#/a/b`.
    pub fn parse(text: &str) -> Self {
        match text.split_once('#') {
            Some((url, fragment)) => {
                let url = if url.is_empty() {
                    None
                } else {
                    Some(url.to_string())
                };
                let fragment = urlencoding::decode(fragment)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| fragment.to_string());
                Self {
                    url,
                    segments: parse_segments(&fragment),
                }
            }
            None => {
                if text.contains("://") {
                    Self {
                        url: Some(text.to_string()),
                        segments: Vec::new(),
                    }
                } else {
                    // Legacy non-fragment references are bare pointers.
                    Self {
                        url: None,
                        segments: parse_segments(text),
                    }
                }
            }
        }
    }

    /// Walk `doc` by the parsed segments. `None` means the target is
    /// missing, not that the pointer is malformed.
    pub fn resolve<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment.as_str())?,
                Value::Array(items) => {
                    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                        return None;
                    }
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

impl Display for SchemaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(url) = &self.url {
            write!(f, "{}", url)?;
        }
        write!(f, "#")?;
        for segment in &self.segments {
            write!(f, "/{}", segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

fn parse_segments(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    match text.strip_prefix('/') {
        Some(rest) => rest.split('/').map(unescape_segment).collect(),
        None => vec![unescape_segment(text)],
    }
}

// `~1` before `~0`, each applied once over the whole segment, so `~01`
// decodes to `~1` and never to `/`.
fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
