//! Structural parsing of sanitized SVG markup.
//!
//! Walks the element tree, resolving inherited fill and transforms, and
//! turns every drawable element into a lyon path in document coordinates.

use extrudekit_settings::Rgb;
use lyon::math::{point, Transform};
use lyon::path::Path;
use roxmltree::{Document, Node};

use crate::error::{ConvertError, ConvertResult};
use crate::path_data::parse_path_data;
use crate::svg_transform::parse_transform;

/// Extent used when the root carries neither a viewBox nor a size
pub const DEFAULT_EXTENT: f32 = 100.0;

/// Cubic approximation constant for quarter ellipses
const KAPPA: f32 = 0.552_284_8;

/// How overlapping contours of one path decide what is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// One drawable element
#[derive(Debug, Clone)]
pub struct SvgPath {
    /// Outline in document coordinates, transforms applied
    pub path: Path,
    /// The element's own fill colour, if it has one
    pub fill: Option<Rgb>,
    pub fill_rule: FillRule,
    /// Element name and id, for logging
    pub label: String,
}

/// A parsed document
#[derive(Debug, Clone)]
pub struct SvgDocument {
    /// Source width in document units
    pub width: f32,
    /// Source height in document units
    pub height: f32,
    pub paths: Vec<SvgPath>,
}

#[derive(Debug, Clone, Copy)]
enum Fill {
    Inherit,
    None,
    Unresolved,
    Color(Rgb),
}

#[derive(Debug, Clone, Copy)]
struct Style {
    fill: Fill,
    fill_rule: FillRule,
    transform: Transform,
}

const NON_RENDERED: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "symbol",
    "pattern",
    "marker",
    "linearGradient",
    "radialGradient",
    "filter",
    "style",
    "script",
    "title",
    "desc",
    "metadata",
    "text",
    "foreignObject",
];

/// Parse sanitized markup into drawable paths.
pub fn parse_document(markup: &str) -> ConvertResult<SvgDocument> {
    let doc = Document::parse(markup).map_err(|e| ConvertError::Malformed(e.to_string()))?;
    let root = doc
        .root()
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "svg")
        .ok_or(ConvertError::MissingRoot)?;

    let (width, height) = extent(&root);
    let mut paths = Vec::new();
    let style = Style {
        fill: Fill::Inherit,
        fill_rule: FillRule::NonZero,
        transform: Transform::identity(),
    };
    for child in root.children() {
        visit(child, style, &mut paths);
    }

    tracing::debug!(
        "Parsed SVG document {}x{} with {} drawable elements",
        width,
        height,
        paths.len()
    );
    Ok(SvgDocument {
        width,
        height,
        paths,
    })
}

/// Source extent: viewBox size, else width/height, else 100 x 100
fn extent(root: &Node) -> (f32, f32) {
    if let Some(vb) = root.attribute("viewBox") {
        let nums: Vec<f32> = vb
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        if let [_, _, w, h] = nums.as_slice() {
            if *w > 0.0 && *h > 0.0 {
                return (*w, *h);
            }
        }
    }
    let dim = |name: &str| {
        root.attribute(name)
            .and_then(parse_length)
            .filter(|v| *v > 0.0)
            .unwrap_or(DEFAULT_EXTENT)
    };
    (dim("width"), dim("height"))
}

/// Leading number of a length, ignoring any unit suffix
fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(i, c)| {
            !(c.is_ascii_digit()
                || *c == '.'
                || ((*c == '-' || *c == '+') && *i == 0)
                || ((*c == 'e' || *c == 'E')
                    && value[i + 1..].starts_with(|n: char| n.is_ascii_digit() || n == '-')))
        })
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse().ok().filter(|v: &f32| v.is_finite())
}

/// Look up a presentation property, `style` winning over the attribute
fn property<'a>(node: &Node<'a, 'a>, name: &str) -> Option<&'a str> {
    let from_style = node.attribute("style").and_then(|style| {
        style.split(';').rev().find_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            (key.trim() == name).then(|| value.trim())
        })
    });
    from_style.or_else(|| node.attribute(name)).map(str::trim)
}

fn resolve_style(node: &Node, parent: Style) -> ConvertResult<Style> {
    let fill = match property(node, "fill") {
        None | Some("inherit") => parent.fill,
        Some("none") | Some("transparent") => Fill::None,
        Some(value) => match Rgb::parse(value) {
            Ok(c) => Fill::Color(c),
            Err(_) => Fill::Unresolved,
        },
    };
    let fill_rule = match property(node, "fill-rule") {
        Some("evenodd") => FillRule::EvenOdd,
        Some("nonzero") => FillRule::NonZero,
        _ => parent.fill_rule,
    };
    let transform = match node.attribute("transform") {
        Some(t) => parse_transform(t)?.then(&parent.transform),
        None => parent.transform,
    };
    Ok(Style {
        fill,
        fill_rule,
        transform,
    })
}

fn label(node: &Node) -> String {
    match node.attribute("id") {
        Some(id) => format!("<{} id=\"{}\">", node.tag_name().name(), id),
        None => format!("<{}>", node.tag_name().name()),
    }
}

fn visit(node: Node, parent: Style, out: &mut Vec<SvgPath>) {
    if !node.is_element() {
        return;
    }
    let name = node.tag_name().name();
    if NON_RENDERED.contains(&name) || property(&node, "display") == Some("none") {
        return;
    }

    let style = match resolve_style(&node, parent) {
        Ok(style) => style,
        Err(err) => {
            tracing::warn!("Skipping {}: {}", label(&node), err);
            return;
        }
    };

    match name {
        "svg" | "g" | "a" | "switch" => {
            for child in node.children() {
                visit(child, style, out);
            }
        }
        "path" | "rect" | "circle" | "ellipse" | "polygon" | "polyline" => {
            match element_path(&node) {
                Ok(Some(path)) => out.push(SvgPath {
                    path: path.transformed(&style.transform),
                    fill: match style.fill {
                        Fill::Color(c) => Some(c),
                        _ => None,
                    },
                    fill_rule: style.fill_rule,
                    label: label(&node),
                }),
                Ok(None) => tracing::debug!("{} has no drawable outline", label(&node)),
                Err(err) => tracing::warn!("Skipping {}: {}", label(&node), err),
            }
        }
        other => tracing::debug!("Ignoring unsupported element <{}>", other),
    }
}

fn number_attr(node: &Node, name: &str) -> Option<f32> {
    node.attribute(name).and_then(parse_length)
}

fn element_path(node: &Node) -> ConvertResult<Option<Path>> {
    let attr = |name: &str| number_attr(node, name).unwrap_or(0.0);
    match node.tag_name().name() {
        "path" => match node.attribute("d") {
            Some(d) => parse_path_data(d).map(Some),
            None => Ok(None),
        },
        "rect" => {
            let (w, h) = (attr("width"), attr("height"));
            if w <= 0.0 || h <= 0.0 {
                return Ok(None);
            }
            let (rx, ry) = match (number_attr(node, "rx"), number_attr(node, "ry")) {
                (Some(rx), Some(ry)) => (rx, ry),
                (Some(r), None) | (None, Some(r)) => (r, r),
                (None, None) => (0.0, 0.0),
            };
            Ok(Some(rect_path(
                attr("x"),
                attr("y"),
                w,
                h,
                rx.clamp(0.0, w / 2.0),
                ry.clamp(0.0, h / 2.0),
            )))
        }
        "circle" => {
            let r = attr("r");
            Ok((r > 0.0).then(|| ellipse_path(attr("cx"), attr("cy"), r, r)))
        }
        "ellipse" => {
            let (rx, ry) = (attr("rx"), attr("ry"));
            Ok((rx > 0.0 && ry > 0.0).then(|| ellipse_path(attr("cx"), attr("cy"), rx, ry)))
        }
        "polygon" | "polyline" => {
            let nums: Vec<f32> = node
                .attribute("points")
                .unwrap_or_default()
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map_while(|s| s.parse().ok())
                .collect();
            if nums.len() < 6 {
                return Ok(None);
            }
            let mut builder = Path::builder();
            builder.begin(point(nums[0], nums[1]));
            for pair in nums[2..].chunks_exact(2) {
                builder.line_to(point(pair[0], pair[1]));
            }
            // Fill closes polylines implicitly
            builder.close();
            Ok(Some(builder.build()))
        }
        _ => Ok(None),
    }
}

fn rect_path(x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Path {
    let mut b = Path::builder();
    if rx <= 0.0 || ry <= 0.0 {
        b.begin(point(x, y));
        b.line_to(point(x + w, y));
        b.line_to(point(x + w, y + h));
        b.line_to(point(x, y + h));
        b.close();
        return b.build();
    }
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    b.begin(point(x + rx, y));
    b.line_to(point(x + w - rx, y));
    b.cubic_bezier_to(
        point(x + w - rx + kx, y),
        point(x + w, y + ry - ky),
        point(x + w, y + ry),
    );
    b.line_to(point(x + w, y + h - ry));
    b.cubic_bezier_to(
        point(x + w, y + h - ry + ky),
        point(x + w - rx + kx, y + h),
        point(x + w - rx, y + h),
    );
    b.line_to(point(x + rx, y + h));
    b.cubic_bezier_to(
        point(x + rx - kx, y + h),
        point(x, y + h - ry + ky),
        point(x, y + h - ry),
    );
    b.line_to(point(x, y + ry));
    b.cubic_bezier_to(point(x, y + ry - ky), point(x + rx - kx, y), point(x + rx, y));
    b.close();
    b.build()
}

fn ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Path {
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let mut b = Path::builder();
    b.begin(point(cx + rx, cy));
    b.cubic_bezier_to(
        point(cx + rx, cy + ky),
        point(cx + kx, cy + ry),
        point(cx, cy + ry),
    );
    b.cubic_bezier_to(
        point(cx - kx, cy + ry),
        point(cx - rx, cy + ky),
        point(cx - rx, cy),
    );
    b.cubic_bezier_to(
        point(cx - rx, cy - ky),
        point(cx - kx, cy - ry),
        point(cx, cy - ry),
    );
    b.cubic_bezier_to(
        point(cx + kx, cy - ry),
        point(cx + rx, cy - ky),
        point(cx + rx, cy),
    );
    b.close();
    b.build()
}
