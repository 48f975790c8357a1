//! Static vector icons used by the page (OCR button, result header).
//!
//! The set is closed: [`render_icon`] returns `None` for any other name so a
//! renderer can simply skip the slot.

use std::fmt::Write as _;
use std::str::FromStr;

/// Names accepted by [`render_icon`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconName {
    /// "magic-wand" — shown on the OCR button.
    MagicWand,
    /// "document" — shown next to the extracted-text header.
    Document,
}

impl IconName {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconName::MagicWand => "magic-wand",
            IconName::Document => "document",
        }
    }

    fn shapes(&self) -> &'static [Shape] {
        match self {
            IconName::MagicWand => MAGIC_WAND,
            IconName::Document => DOCUMENT,
        }
    }
}

impl FromStr for IconName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "magic-wand" => Ok(IconName::MagicWand),
            "document" => Ok(IconName::Document),
            _ => Err(()),
        }
    }
}

struct Shape {
    tag: &'static str,
    attrs: &'static [(&'static str, &'static str)],
}

macro_rules! p {
    ($d:literal) => {
        Shape {
            tag: "path",
            attrs: &[("d", $d)],
        }
    };
}

const MAGIC_WAND: &[Shape] = &[
    p!("M15 4V2"),
    p!("M15 10V8"),
    p!("M12.3 7.7 11 9"),
    p!("M5 4v2"),
    p!("M5 10v2"),
    p!("M7.7 7.7 9 9"),
    p!("m15 12.3-1.3-1.3"),
    p!("M2 5h2"),
    p!("M8 5h2"),
    p!("m7.7 12.3-1.3 1.3"),
    p!("M19 13c-1.5-1.5-3-1.5-3-3 0-1.5 1.5-3 3-3s3 1.5 3 3c0 1.5-1.5 1.5-3 3Z"),
    p!("M3 21 12 12"),
];

const DOCUMENT: &[Shape] = &[
    p!("M14.5 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V7.5L14.5 2z"),
    Shape {
        tag: "polyline",
        attrs: &[("points", "14 2 14 8 20 8")],
    },
    Shape {
        tag: "line",
        attrs: &[("x1", "16"), ("y1", "13"), ("x2", "8"), ("y2", "13")],
    },
    Shape {
        tag: "line",
        attrs: &[("x1", "16"), ("y1", "17"), ("x2", "8"), ("y2", "17")],
    },
    Shape {
        tag: "line",
        attrs: &[("x1", "10"), ("y1", "9"), ("x2", "8"), ("y2", "9")],
    },
];

const SVG_DEFAULTS: &[(&str, &str)] = &[
    ("xmlns", "http://www.w3.org/2000/svg"),
    ("width", "24"),
    ("height", "24"),
    ("viewBox", "0 0 24 24"),
    ("fill", "none"),
    ("stroke", "currentColor"),
    ("stroke-width", "2"),
    ("stroke-linecap", "round"),
    ("stroke-linejoin", "round"),
];

/// Render the named icon as SVG markup.
///
/// `attrs` are passed through onto the `<svg>` element: an attribute whose
/// (normalised) name matches a default replaces it in place, any other is
/// appended in the order given. Names are normalised the way JSX props map
/// to DOM attributes (`className` → `class`, `strokeWidth` → `stroke-width`).
///
/// Returns `None` for names outside the icon set.
pub fn render_icon(name: &str, attrs: &[(&str, &str)]) -> Option<String> {
    let icon = IconName::from_str(name).ok()?;
    Some(render(icon, attrs))
}

/// Render a known icon. Infallible counterpart of [`render_icon`].
pub fn render(icon: IconName, attrs: &[(&str, &str)]) -> String {
    let mut merged: Vec<(String, String)> = SVG_DEFAULTS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for (key, value) in attrs {
        let key = normalise_attr(key);
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => merged.push((key, value.to_string())),
        }
    }

    let mut out = String::from("<svg");
    for (k, v) in &merged {
        let _ = write!(out, " {}=\"{}\"", k, escape_attr(v));
    }
    out.push('>');
    for shape in icon.shapes() {
        let _ = write!(out, "<{}", shape.tag);
        for (k, v) in shape.attrs {
            let _ = write!(out, " {}=\"{}\"", k, v);
        }
        out.push_str(" />");
    }
    out.push_str("</svg>");
    out
}

/// Map a JSX-style prop name onto its SVG attribute name.
fn normalise_attr(name: &str) -> String {
    match name {
        "className" => return "class".to_string(),
        "htmlFor" => return "for".to_string(),
        "viewBox" => return name.to_string(),
        _ => {}
    }
    // ariaLabel → aria-label, strokeLinecap → stroke-linecap
    kebab(name)
}

fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_renders_nothing() {
        assert!(render_icon("rocket", &[]).is_none());
        assert!(render_icon("", &[]).is_none());
        assert!(render_icon("Magic-Wand", &[]).is_none());
    }

    #[test]
    fn magic_wand_has_all_paths() {
        let svg = render_icon("magic-wand", &[]).unwrap();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert_eq!(svg.matches("<path").count(), 12);
        assert!(svg.contains("d=\"M3 21 12 12\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn document_shapes() {
        let svg = render_icon("document", &[]).unwrap();
        assert_eq!(svg.matches("<path").count(), 1);
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert_eq!(svg.matches("<line").count(), 3);
        assert!(svg.contains("points=\"14 2 14 8 20 8\""));
    }

    #[test]
    fn pass_through_attrs_override_defaults() {
        let svg = render_icon(
            "document",
            &[("className", "w-7 h-7"), ("strokeWidth", "1.5"), ("width", "32")],
        )
        .unwrap();
        assert!(svg.contains("stroke-width=\"1.5\""));
        assert!(!svg.contains("stroke-width=\"2\""));
        assert!(svg.contains("width=\"32\""));
        assert!(svg.contains("class=\"w-7 h-7\""));
        // Overrides keep their original position.
        let w = svg.find("width=\"32\"").unwrap();
        let h = svg.find("height=").unwrap();
        assert!(w < h);
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render(IconName::MagicWand, &[("ariaLabel", "ocr")]);
        let b = render(IconName::MagicWand, &[("ariaLabel", "ocr")]);
        assert_eq!(a, b);
        assert!(a.contains("aria-label=\"ocr\""));
    }

    #[test]
    fn attribute_values_are_escaped() {
        let svg = render(IconName::Document, &[("title", "a \"b\" <c>")]);
        assert!(svg.contains("title=\"a &quot;b&quot; &lt;c&gt;\""));
    }

    #[test]
    fn name_round_trip() {
        for icon in [IconName::MagicWand, IconName::Document] {
            assert_eq!(icon.as_str().parse::<IconName>(), Ok(icon));
        }
    }
}
