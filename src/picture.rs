//! Breakpoint math and `<picture>` rendering.
//!
//! Pure functions, no collaborators. Given the variants of one image, sort
//! them by width and give each one a media query covering the viewport range
//! between the previous width and its own:
//!
//! ```text
//! widths 800, 1400, 2080
//!   (max-width:800px)
//!   (max-width:1400px) and (min-width:800px)
//!   (max-width:2080px) and (min-width:1400px)
//! ```
//!
//! N widths always yield N `<source>` elements.

use crate::media::AdaptiveMedia;

/// One `<source>` worth of data: a width range and the URI serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub max_width: u32,
    /// Width of the next-smaller variant; `None` for the smallest.
    pub min_width: Option<u32>,
    pub uri: String,
}

impl Breakpoint {
    pub fn media_query(&self) -> String {
        match self.min_width {
            None => format!("(max-width:{}px)", self.max_width),
            Some(min) => format!("(max-width:{}px) and (min-width:{}px)", self.max_width, min),
        }
    }
}

/// Turn variants into ascending breakpoints.
///
/// Variants without a width are dropped. Equal widths keep their input order.
pub fn breakpoints<I>(variants: I) -> Vec<Breakpoint>
where
    I: IntoIterator<Item = AdaptiveMedia>,
{
    let mut sized: Vec<(u32, String)> = variants
        .into_iter()
        .filter_map(|m| m.width().map(|w| (w, m.uri().to_string())))
        .collect();
    sized.sort_by_key(|(w, _)| *w);

    let mut previous = None;
    sized
        .into_iter()
        .map(|(width, uri)| {
            let bp = Breakpoint {
                max_width: width,
                min_width: previous,
                uri,
            };
            previous = Some(width);
            bp
        })
        .collect()
}

/// Escape a value for use inside a double-quoted attribute.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_source(bp: &Breakpoint) -> String {
    format!(
        "<source media=\"{}\" srcset=\"{}\"/>",
        bp.media_query(),
        escape_attribute(&bp.uri)
    )
}

/// Wrap `img_tag` in a `<picture>` preceded by one source per breakpoint.
///
/// `img_tag` is inserted verbatim.
pub fn render_picture(img_tag: &str, breakpoints: &[Breakpoint]) -> String {
    let mut out = String::from("<picture>");
    for bp in breakpoints {
        out.push_str(&render_source(bp));
    }
    out.push_str(img_tag);
    out.push_str("</picture>");
    out
}
