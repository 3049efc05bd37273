//! Portable rich-text body: typed blocks and their HTML rendering
//!
//! The store delivers the body as an array of loosely typed JSON blocks.
//! They are decoded once into [`Block`] and rendered through a
//! [`Serializers`] table, so every block kind has exactly one rendering
//! function and adding a kind is a compile error until it is handled.

use serde::{Deserialize, Serialize};

use super::image::ImageUrlBuilder;
use super::ImageRef;
use crate::config::BlogConfig;
use crate::helpers::html_escape;

/// Inline formatting applied to a span of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    Strong,
    Em,
    Code,
    Underline,
    StrikeThrough,
    Link { href: String },
}

/// A run of text with its marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl Span {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            marks: Vec::new(),
        }
    }
}

/// Bullet or numbered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    Bullet,
    Number,
}

/// A single block of body content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock")]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Paragraph { spans: Vec<Span> },
    ListItem { kind: ListKind, level: u8, spans: Vec<Span> },
    Image(ImageRef),
    /// A block type this renderer does not know about
    Unsupported { kind: String },
}

// Wire format

#[derive(Deserialize)]
struct RawBlock {
    #[serde(rename = "_type", default)]
    kind: String,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    children: Option<Vec<RawChild>>,
    #[serde(rename = "markDefs", default)]
    mark_defs: Option<Vec<MarkDef>>,
    #[serde(rename = "listItem", default)]
    list_item: Option<String>,
    #[serde(default)]
    level: Option<u8>,
    #[serde(default)]
    asset: Option<super::Reference>,
    #[serde(default)]
    alt: Option<String>,
}

#[derive(Deserialize)]
struct RawChild {
    #[serde(rename = "_type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    marks: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct MarkDef {
    #[serde(rename = "_key", default)]
    key: String,
    #[serde(rename = "_type", default)]
    kind: String,
    #[serde(default)]
    href: Option<String>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        match raw.kind.as_str() {
            "block" => {
                let defs = raw.mark_defs.unwrap_or_default();
                let spans = raw
                    .children
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|child| child.kind.as_deref().unwrap_or("span") == "span")
                    .map(|child| Span {
                        text: child.text.unwrap_or_default(),
                        marks: child
                            .marks
                            .unwrap_or_default()
                            .iter()
                            .filter_map(|mark| resolve_mark(mark, &defs))
                            .collect(),
                    })
                    .collect();

                if let Some(list) = raw.list_item {
                    let kind = if list == "number" {
                        ListKind::Number
                    } else {
                        ListKind::Bullet
                    };
                    return Block::ListItem {
                        kind,
                        level: raw.level.unwrap_or(1),
                        spans,
                    };
                }

                match raw.style.as_deref().and_then(heading_level) {
                    Some(level) => Block::Heading { level, spans },
                    None => Block::Paragraph { spans },
                }
            }
            "image" => Block::Image(ImageRef {
                asset: raw.asset,
                alt: raw.alt,
            }),
            other => Block::Unsupported {
                kind: other.to_string(),
            },
        }
    }
}

fn heading_level(style: &str) -> Option<u8> {
    let level = style.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn resolve_mark(mark: &str, defs: &[MarkDef]) -> Option<Mark> {
    match mark {
        "strong" => Some(Mark::Strong),
        "em" => Some(Mark::Em),
        "code" => Some(Mark::Code),
        "underline" => Some(Mark::Underline),
        "strike-through" => Some(Mark::StrikeThrough),
        key => {
            let def = defs.iter().find(|d| d.key == key)?;
            match (def.kind.as_str(), &def.href) {
                ("link", Some(href)) => Some(Mark::Link { href: href.clone() }),
                _ => None,
            }
        }
    }
}

/// Rendering functions for each block and mark kind.
///
/// Inputs named `children` are already-rendered HTML; `href`, `src` and
/// `alt` are raw and must be escaped by the serializer.
#[derive(Clone, Copy)]
pub struct Serializers {
    pub heading: fn(level: u8, children: &str) -> String,
    pub normal: fn(children: &str) -> String,
    pub list: fn(kind: ListKind, items: &str) -> String,
    pub li: fn(children: &str) -> String,
    pub link: fn(href: &str, children: &str) -> String,
    pub image: fn(src: &str, alt: &str) -> String,
}

impl Default for Serializers {
    fn default() -> Self {
        Self {
            heading: |level, children| match level {
                1 => format!(r#"<h1 class="my-5 text-2xl font-bold">{}</h1>"#, children),
                n => format!("<h{n}>{}</h{n}>", children),
            },
            normal: |children| format!(r#"<p class="my-5 text-2xl">{}</p>"#, children),
            list: |kind, items| match kind {
                ListKind::Bullet => format!("<ul>{}</ul>", items),
                ListKind::Number => format!("<ol>{}</ol>", items),
            },
            li: |children| format!(r#"<li class="ml-4 list-disc">{}</li>"#, children),
            link: |href, children| {
                format!(
                    r#"<a href="{}" class="text-blue-500 hover:underline">{}</a>"#,
                    html_escape(href),
                    children
                )
            },
            image: |src, alt| {
                format!(
                    r#"<figure><img src="{}" alt="{}"></figure>"#,
                    html_escape(src),
                    html_escape(alt)
                )
            },
        }
    }
}

/// Renders body blocks to HTML
pub struct BodyRenderer {
    serializers: Serializers,
    images: ImageUrlBuilder,
}

impl BodyRenderer {
    /// Create a renderer with the default serializers
    pub fn new(config: &BlogConfig) -> Self {
        Self::with_serializers(config, Serializers::default())
    }

    pub fn with_serializers(config: &BlogConfig, serializers: Serializers) -> Self {
        Self {
            serializers,
            images: ImageUrlBuilder::new(config),
        }
    }

    /// Render a whole body
    pub fn render(&self, blocks: &[Block]) -> String {
        let mut html = String::new();
        let mut list: Option<(ListKind, String)> = None;

        for block in blocks {
            // Consecutive list items of the same kind share one list element
            if let Block::ListItem { kind, spans, .. } = block {
                let item = (self.serializers.li)(&self.render_spans(spans));
                if let Some((current, items)) = &mut list {
                    if *current == *kind {
                        items.push_str(&item);
                        continue;
                    }
                }
                self.flush_list(&mut html, list.take());
                list = Some((*kind, item));
                continue;
            }

            self.flush_list(&mut html, list.take());

            match block {
                Block::Heading { level, spans } => {
                    let text = self.render_spans(spans);
                    html.push_str(&(self.serializers.heading)(*level, &text));
                }
                Block::Paragraph { spans } => {
                    html.push_str(&(self.serializers.normal)(&self.render_spans(spans)));
                }
                Block::Image(image) => match self.images.url(image) {
                    Some(src) => {
                        let alt = image.alt.as_deref().unwrap_or("");
                        html.push_str(&(self.serializers.image)(&src, alt));
                    }
                    None => tracing::debug!("Skipping image block without a usable asset"),
                },
                Block::Unsupported { kind } => {
                    tracing::debug!("Skipping unsupported block type {:?}", kind);
                }
                Block::ListItem { .. } => unreachable!("list items are handled above"),
            }
        }

        self.flush_list(&mut html, list);
        html
    }

    fn flush_list(&self, html: &mut String, list: Option<(ListKind, String)>) {
        if let Some((kind, items)) = list {
            html.push_str(&(self.serializers.list)(kind, &items));
        }
    }

    fn render_spans(&self, spans: &[Span]) -> String {
        spans.iter().map(|span| self.render_span(span)).collect()
    }

    fn render_span(&self, span: &Span) -> String {
        let mut html = html_escape(&span.text);
        for mark in &span.marks {
            html = match mark {
                Mark::Strong => format!("<strong>{}</strong>", html),
                Mark::Em => format!("<em>{}</em>", html),
                Mark::Code => format!("<code>{}</code>", html),
                Mark::Underline => format!("<u>{}</u>", html),
                Mark::StrikeThrough => format!("<s>{}</s>", html),
                Mark::Link { href } if is_safe_href(href) => (self.serializers.link)(href, &html),
                Mark::Link { href } => {
                    tracing::warn!("Dropping link with disallowed scheme: {:?}", href);
                    html
                }
            };
        }
        html
    }
}

/// Relative links and `http`, `https` and `mailto` URLs
fn is_safe_href(href: &str) -> bool {
    let href = href.trim();
    match href.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(i) if href[i..].starts_with(':') => {
            let scheme = href[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}
