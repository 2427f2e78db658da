//! Path-based serialization of a render list.

use std::sync::LazyLock;

use extrudekit_settings::Background;
use regex::Regex;

use crate::projector::RenderList;
use crate::shading::Shade;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Stroke width, in pixels, drawn around each triangle in its own colour
/// to close the hairline gaps between neighbours
pub const OVERDRAW: f32 = 1.0;

static STYLE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="([^"]*)""#).expect("invalid style regex"));

/// Round to `precision` decimals and print without trailing zeros
fn fmt_num(value: f32, precision: usize) -> String {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value as f64 * factor).round() / factor;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

fn hex(shade: &Shade) -> String {
    let [r, g, b, _] = shade.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Serialize triangles as `<path>` elements, farthest first.
///
/// Style attributes are written in spaced `property: value;` form; run
/// [`normalize_styles`] over the result before handing it out.
pub fn render_svg(list: &RenderList, background: &Background, precision: usize) -> String {
    let (w, h) = (list.width, list.height);
    let mut out = String::with_capacity(128 + list.len() * 96);

    out.push_str(&format!(
        r#"<svg xmlns="{}" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        SVG_NAMESPACE, w, h, w, h
    ));
    if let Some(color) = background.color() {
        out.push_str(&format!(
            r#"<rect x="0" y="0" width="{}" height="{}" style="fill: {}; stroke: none;"/>"#,
            w,
            h,
            color.to_hex()
        ));
    }

    for poly in &list.polygons {
        let [a, b, c] = poly.points;
        let color = hex(&poly.shade);
        out.push_str(&format!(
            r#"<path d="M{},{}L{},{}L{},{}Z" style="fill: {}; "#,
            fmt_num(a.x, precision),
            fmt_num(a.y, precision),
            fmt_num(b.x, precision),
            fmt_num(b.y, precision),
            fmt_num(c.x, precision),
            fmt_num(c.y, precision),
            color
        ));
        if poly.shade.alpha < 1.0 {
            out.push_str(&format!("fill-opacity: {}; ", fmt_num(poly.shade.alpha, 2)));
        }
        out.push_str(&format!(
            r#"stroke: {}; stroke-width: {}; stroke-linejoin: round; stroke-linecap: round;"/>"#,
            color,
            fmt_num(OVERDRAW, precision)
        ));
    }

    out.push_str("</svg>");
    out
}

/// Compact every `style` attribute to `property:value;property:value`.
///
/// Only whitespace and the trailing separator are removed, so the rendering
/// is unchanged; `fill: none;` becomes `fill:none` and
/// `stroke-linecap: round;` becomes `stroke-linecap:round`.
pub fn normalize_styles(markup: &str) -> String {
    STYLE_ATTRIBUTE
        .replace_all(markup, |caps: &regex::Captures| {
            let compact: Vec<String> = caps[1]
                .split(';')
                .filter_map(|decl| {
                    let (name, value) = decl.split_once(':')?;
                    Some(format!("{}:{}", name.trim(), value.trim()))
                })
                .collect();
            format!(r#"style="{}""#, compact.join(";"))
        })
        .into_owned()
}
