//! `transform` attribute parsing.

use lyon::math::Transform;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ConvertError, ConvertResult};

static TRANSFORM_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(matrix|translate|scale|rotate|skewX|skewY)\s*\(([^)]*)\)")
        .expect("invalid transform regex")
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("invalid number regex")
});

/// Parse an SVG transform list.
///
/// The list applies right to left: `translate(10) scale(2)` scales first.
pub fn parse_transform(value: &str) -> ConvertResult<Transform> {
    let invalid = || ConvertError::Transform(value.to_string());
    let mut parts = Vec::new();
    let mut consumed = 0usize;

    for caps in TRANSFORM_FN.captures_iter(value) {
        let (Some(whole), Some(name), Some(args)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        if !value[consumed..whole.start()]
            .chars()
            .all(|c| c.is_whitespace() || c == ',')
        {
            return Err(invalid());
        }
        consumed = whole.end();

        let nums: Vec<f32> = NUMBER
            .find_iter(args.as_str())
            .map(|m| m.as_str().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;

        let t = match (name.as_str(), nums.as_slice()) {
            ("matrix", [a, b, c, d, e, f]) => Transform::new(*a, *b, *c, *d, *e, *f),
            ("translate", [tx]) => Transform::translation(*tx, 0.0),
            ("translate", [tx, ty]) => Transform::translation(*tx, *ty),
            ("scale", [s]) => Transform::scale(*s, *s),
            ("scale", [sx, sy]) => Transform::scale(*sx, *sy),
            ("rotate", [a]) => rotation(*a),
            ("rotate", [a, cx, cy]) => Transform::translation(-cx, -cy)
                .then(&rotation(*a))
                .then(&Transform::translation(*cx, *cy)),
            ("skewX", [a]) => Transform::new(1.0, 0.0, a.to_radians().tan(), 1.0, 0.0, 0.0),
            ("skewY", [a]) => Transform::new(1.0, a.to_radians().tan(), 0.0, 1.0, 0.0, 0.0),
            _ => return Err(invalid()),
        };
        parts.push(t);
    }

    if !value[consumed..].trim().is_empty() {
        return Err(invalid());
    }

    Ok(parts
        .into_iter()
        .rev()
        .fold(Transform::identity(), |acc, t| acc.then(&t)))
}

fn rotation(degrees: f32) -> Transform {
    let (s, c) = degrees.to_radians().sin_cos();
    Transform::new(c, s, -s, c, 0.0, 0.0)
}
