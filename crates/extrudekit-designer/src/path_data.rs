//! SVG path data (`d` attribute) parsing into lyon paths.
//!
//! Supports `M L H V C S Q T A Z` in absolute and relative form, implicit
//! command repetition, exponents, sign-separated and dot-separated compact
//! numbers (`10-5`, `0.5.5`) and compact arc flags (`a1 1 0 0010 10`).

use lyon::math::point;
use lyon::path::Path;

use crate::error::{ConvertError, ConvertResult};

type Pt = (f32, f32);

/// Parse a `d` attribute into a lyon path.
///
/// A syntax error ends parsing. Whatever was built up to that point is kept,
/// matching how browsers render erroneous path data; an error is returned
/// only when nothing drawable was read before it.
pub fn parse_path_data(data: &str) -> ConvertResult<Path> {
    let mut parser = PathDataParser::new(data);
    match parser.run() {
        Ok(()) => Ok(parser.finish()),
        Err(err) if parser.segments > 0 => {
            tracing::warn!("Truncated path data: {}", err);
            Ok(parser.finish())
        }
        Err(err) => Err(err),
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn skip_separators(&mut self) {
        while let Some(b) = self.bytes.get(self.pos) {
            if b.is_ascii_whitespace() || *b == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.bytes.len()
    }

    /// Next command letter, if the next token is one
    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        let b = *self.bytes.get(self.pos)?;
        if b.is_ascii_alphabetic() && b != b'e' && b != b'E' {
            self.pos += 1;
            Some(b)
        } else {
            None
        }
    }

    /// True when the next token starts a number
    fn has_number(&mut self) -> bool {
        self.skip_separators();
        matches!(
            self.bytes.get(self.pos),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.')
        )
    }

    fn error(&self, reason: &str) -> ConvertError {
        ConvertError::PathData {
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn number(&mut self) -> ConvertResult<f32> {
        self.skip_separators();
        let start = self.pos;
        let bytes = self.bytes;
        let mut i = self.pos;

        if matches!(bytes.get(i), Some(b'-' | b'+')) {
            i += 1;
        }
        let mut digits = 0;
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
            digits += 1;
        }
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
                digits += 1;
            }
        }
        if digits == 0 {
            return Err(self.error("expected number"));
        }
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'-' | b'+')) {
                j += 1;
            }
            if matches!(bytes.get(j), Some(b'0'..=b'9')) {
                while matches!(bytes.get(j), Some(b'0'..=b'9')) {
                    j += 1;
                }
                i = j;
            }
        }

        let text = std::str::from_utf8(&bytes[start..i]).map_err(|_| self.error("invalid text"))?;
        let value: f32 = text.parse().map_err(|_| self.error("invalid number"))?;
        if !value.is_finite() {
            return Err(self.error("number out of range"));
        }
        self.pos = i;
        Ok(value)
    }

    /// Arc flags are single `0`/`1` characters and may be unseparated
    fn flag(&mut self) -> ConvertResult<bool> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error("expected arc flag")),
        }
    }

    fn pair(&mut self) -> ConvertResult<Pt> {
        Ok((self.number()?, self.number()?))
    }
}

struct PathDataParser<'a> {
    cursor: Cursor<'a>,
    builder: lyon::path::path::Builder,
    current: Pt,
    start: Pt,
    subpath_active: bool,
    prev_cubic_ctrl: Option<Pt>,
    prev_quad_ctrl: Option<Pt>,
    segments: usize,
}

fn reflect(p: Pt, around: Pt) -> Pt {
    (2.0 * around.0 - p.0, 2.0 * around.1 - p.1)
}

impl<'a> PathDataParser<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            cursor: Cursor {
                bytes: data.as_bytes(),
                pos: 0,
            },
            builder: Path::builder(),
            current: (0.0, 0.0),
            start: (0.0, 0.0),
            subpath_active: false,
            prev_cubic_ctrl: None,
            prev_quad_ctrl: None,
            segments: 0,
        }
    }

    fn finish(mut self) -> Path {
        if self.subpath_active {
            self.builder.end(false);
        }
        self.builder.build()
    }

    fn resolve(&self, relative: bool, p: Pt) -> Pt {
        if relative {
            (self.current.0 + p.0, self.current.1 + p.1)
        } else {
            p
        }
    }

    fn ensure_subpath(&mut self) {
        if !self.subpath_active {
            self.builder.begin(point(self.current.0, self.current.1));
            self.subpath_active = true;
            self.start = self.current;
        }
    }

    fn line_to(&mut self, p: Pt) {
        self.ensure_subpath();
        self.builder.line_to(point(p.0, p.1));
        self.current = p;
        self.segments += 1;
    }

    fn cubic_to(&mut self, c1: Pt, c2: Pt, p: Pt) {
        self.ensure_subpath();
        self.builder
            .cubic_bezier_to(point(c1.0, c1.1), point(c2.0, c2.1), point(p.0, p.1));
        self.current = p;
        self.segments += 1;
    }

    fn quad_to(&mut self, c: Pt, p: Pt) {
        self.ensure_subpath();
        self.builder.quadratic_bezier_to(point(c.0, c.1), point(p.0, p.1));
        self.current = p;
        self.segments += 1;
    }

    fn run(&mut self) -> ConvertResult<()> {
        let mut prev_cmd: Option<u8> = None;

        while !self.cursor.at_end() {
            let cmd = self
                .cursor
                .command()
                .ok_or_else(|| self.cursor.error("expected command"))?;
            let relative = cmd.is_ascii_lowercase();

            match cmd.to_ascii_uppercase() {
                b'M' => {
                    let p = self.cursor.pair()?;
                    let p = self.resolve(relative, p);
                    if self.subpath_active {
                        self.builder.end(false);
                    }
                    self.builder.begin(point(p.0, p.1));
                    self.subpath_active = true;
                    self.start = p;
                    self.current = p;
                    // Extra pairs are implicit lineto
                    while self.cursor.has_number() {
                        let p = self.cursor.pair()?;
                        let p = self.resolve(relative, p);
                        self.line_to(p);
                    }
                    self.prev_cubic_ctrl = None;
                    self.prev_quad_ctrl = None;
                }
                b'L' => {
                    loop {
                        let p = self.cursor.pair()?;
                        let p = self.resolve(relative, p);
                        self.line_to(p);
                        if !self.cursor.has_number() {
                            break;
                        }
                    }
                    self.prev_cubic_ctrl = None;
                    self.prev_quad_ctrl = None;
                }
                b'H' => {
                    loop {
                        let x = self.cursor.number()?;
                        let nx = if relative { self.current.0 + x } else { x };
                        self.line_to((nx, self.current.1));
                        if !self.cursor.has_number() {
                            break;
                        }
                    }
                    self.prev_cubic_ctrl = None;
                    self.prev_quad_ctrl = None;
                }
                b'V' => {
                    loop {
                        let y = self.cursor.number()?;
                        let ny = if relative { self.current.1 + y } else { y };
                        self.line_to((self.current.0, ny));
                        if !self.cursor.has_number() {
                            break;
                        }
                    }
                    self.prev_cubic_ctrl = None;
                    self.prev_quad_ctrl = None;
                }
                b'C' => loop {
                    let c1 = self.cursor.pair()?;
                    let c2 = self.cursor.pair()?;
                    let p = self.cursor.pair()?;
                    let (c1, c2, p) = (
                        self.resolve(relative, c1),
                        self.resolve(relative, c2),
                        self.resolve(relative, p),
                    );
                    self.cubic_to(c1, c2, p);
                    self.prev_cubic_ctrl = Some(c2);
                    self.prev_quad_ctrl = None;
                    if !self.cursor.has_number() {
                        break;
                    }
                },
                b'S' => {
                    let mut smooth_after = prev_cmd;
                    loop {
                        let c2 = self.cursor.pair()?;
                        let p = self.cursor.pair()?;
                        let c1 = match (smooth_after, self.prev_cubic_ctrl) {
                            (Some(b'C' | b'c' | b'S' | b's'), Some(prev)) => {
                                reflect(prev, self.current)
                            }
                            _ => self.current,
                        };
                        let (c2, p) = (self.resolve(relative, c2), self.resolve(relative, p));
                        self.cubic_to(c1, c2, p);
                        self.prev_cubic_ctrl = Some(c2);
                        self.prev_quad_ctrl = None;
                        smooth_after = Some(cmd);
                        if !self.cursor.has_number() {
                            break;
                        }
                    }
                }
                b'Q' => loop {
                    let c = self.cursor.pair()?;
                    let p = self.cursor.pair()?;
                    let (c, p) = (self.resolve(relative, c), self.resolve(relative, p));
                    self.quad_to(c, p);
                    self.prev_quad_ctrl = Some(c);
                    self.prev_cubic_ctrl = None;
                    if !self.cursor.has_number() {
                        break;
                    }
                },
                b'T' => {
                    let mut smooth_after = prev_cmd;
                    loop {
                        let p = self.cursor.pair()?;
                        let c = match (smooth_after, self.prev_quad_ctrl) {
                            (Some(b'Q' | b'q' | b'T' | b't'), Some(prev)) => {
                                reflect(prev, self.current)
                            }
                            _ => self.current,
                        };
                        let p = self.resolve(relative, p);
                        self.quad_to(c, p);
                        self.prev_quad_ctrl = Some(c);
                        self.prev_cubic_ctrl = None;
                        smooth_after = Some(cmd);
                        if !self.cursor.has_number() {
                            break;
                        }
                    }
                }
                b'A' => {
                    loop {
                        let rx = self.cursor.number()?;
                        let ry = self.cursor.number()?;
                        let rotation = self.cursor.number()?;
                        let large_arc = self.cursor.flag()?;
                        let sweep = self.cursor.flag()?;
                        let p = self.cursor.pair()?;
                        let end = self.resolve(relative, p);

                        match arc_to_cubics(self.current, end, rx, ry, rotation, large_arc, sweep)
                        {
                            Some(cubics) => {
                                for (c1, c2, p) in cubics {
                                    self.cubic_to(c1, c2, p);
                                }
                            }
                            None => self.line_to(end),
                        }
                        self.current = end;
                        if !self.cursor.has_number() {
                            break;
                        }
                    }
                    self.prev_cubic_ctrl = None;
                    self.prev_quad_ctrl = None;
                }
                b'Z' => {
                    if self.subpath_active {
                        self.builder.close();
                        self.subpath_active = false;
                    }
                    self.current = self.start;
                    self.prev_cubic_ctrl = None;
                    self.prev_quad_ctrl = None;
                }
                _ => return Err(self.cursor.error("unsupported command")),
            }

            prev_cmd = Some(cmd);
        }

        Ok(())
    }
}

fn angle_between(u: Pt, v: Pt) -> f32 {
    let dot = u.0 * v.0 + u.1 * v.1;
    let det = u.0 * v.1 - u.1 * v.0;
    det.atan2(dot)
}

/// Convert an endpoint-parameterized elliptical arc into cubic segments of
/// at most 90 degrees each. Returns `None` when the arc degenerates to a
/// straight line.
#[allow(clippy::too_many_arguments)]
pub(crate) fn arc_to_cubics(
    from: Pt,
    to: Pt,
    rx: f32,
    ry: f32,
    phi_deg: f32,
    large_arc: bool,
    sweep: bool,
) -> Option<Vec<(Pt, Pt, Pt)>> {
    let (x1, y1) = from;
    let (x2, y2) = to;
    if (x1 - x2).abs() < f32::EPSILON && (y1 - y2).abs() < f32::EPSILON {
        return Some(Vec::new());
    }
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx < f32::EPSILON || ry < f32::EPSILON {
        return None;
    }

    let phi = phi_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // Endpoint to center parameterization
    let dx2 = (x1 - x2) / 2.0;
    let dy2 = (y1 - y2) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let denom = rx2 * y1p * y1p + ry2 * x1p * x1p;
    if denom.abs() < f32::EPSILON {
        return None;
    }
    let numer = (rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p).max(0.0);

    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coef = sign * (numer / denom).sqrt();
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let cx = cos_phi * cxp - sin_phi * cyp + (x1 + x2) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (y1 + y2) / 2.0;

    let u = ((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = ((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let mut theta = angle_between((1.0, 0.0), u);
    let mut delta = angle_between(u, v);
    if !sweep && delta > 0.0 {
        delta -= std::f32::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f32::consts::TAU;
    }

    let segment_count = ((delta.abs() / std::f32::consts::FRAC_PI_2).ceil() as usize).max(1);
    let step = delta / segment_count as f32;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let on_ellipse = |u: f32, v: f32| -> Pt {
        (
            cx + cos_phi * (rx * u) - sin_phi * (ry * v),
            cy + sin_phi * (rx * u) + cos_phi * (ry * v),
        )
    };

    let mut cubics = Vec::with_capacity(segment_count);
    for i in 0..segment_count {
        let t0 = theta;
        let t1 = theta + step;
        let (s0, c0) = t0.sin_cos();
        let (s1, c1) = t1.sin_cos();
        let cp1 = on_ellipse(c0 - k * s0, s0 + k * c0);
        let cp2 = on_ellipse(c1 + k * s1, s1 - k * c1);
        // Land exactly on the requested endpoint
        let end = if i + 1 == segment_count {
            to
        } else {
            on_ellipse(c1, s1)
        };
        cubics.push((cp1, cp2, end));
        theta = t1;
    }
    Some(cubics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon::path::PathEvent;

    fn endpoints(path: &Path) -> Vec<(f32, f32)> {
        path.iter()
            .filter_map(|e| match e {
                PathEvent::Begin { at } => Some((at.x, at.y)),
                PathEvent::Line { to, .. }
                | PathEvent::Quadratic { to, .. }
                | PathEvent::Cubic { to, .. } => Some((to.x, to.y)),
                PathEvent::End { .. } => None,
            })
            .collect()
    }

    fn closed_count(path: &Path) -> usize {
        path.iter()
            .filter(|e| matches!(e, PathEvent::End { close: true, .. }))
            .count()
    }

    #[test]
    fn test_absolute_and_relative_lines() {
        let path = parse_path_data("M10 10 L20 10 l0 10 H10 v-10 z").unwrap();
        assert_eq!(
            endpoints(&path),
            vec![(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0), (10.0, 10.0)]
        );
        assert_eq!(closed_count(&path), 1);
    }

    #[test]
    fn test_implicit_lineto_after_move() {
        let path = parse_path_data("m0,0 10,0 0,10z").unwrap();
        assert_eq!(endpoints(&path), vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    }

    #[test]
    fn test_compact_numbers() {
        let path = parse_path_data("M0-5L1e1-5L.5.5").unwrap();
        assert_eq!(endpoints(&path), vec![(0.0, -5.0), (10.0, -5.0), (0.5, 0.5)]);
    }

    #[test]
    fn test_smooth_curves_reflect_controls() {
        let path = parse_path_data("M0 0 C0 10 10 10 10 0 S20 -10 20 0").unwrap();
        let cubics: Vec<_> = path
            .iter()
            .filter_map(|e| match e {
                PathEvent::Cubic { ctrl1, .. } => Some((ctrl1.x, ctrl1.y)),
                _ => None,
            })
            .collect();
        assert_eq!(cubics, vec![(0.0, 10.0), (10.0, -10.0)]);
    }

    #[test]
    fn test_compact_arc_flags() {
        let path = parse_path_data("M0 0 a5 5 0 0010 0z").unwrap();
        let last = *endpoints(&path).last().unwrap();
        assert!((last.0 - 10.0).abs() < 1e-4 && last.1.abs() < 1e-4);
    }

    #[test]
    fn test_arc_splits_into_quarter_segments() {
        let cubics = arc_to_cubics((0.0, 0.0), (20.0, 0.0), 10.0, 10.0, 0.0, false, true).unwrap();
        assert_eq!(cubics.len(), 2);
        assert_eq!(cubics[1].2, (20.0, 0.0));
        assert!(arc_to_cubics((0.0, 0.0), (5.0, 0.0), 0.0, 3.0, 0.0, false, true).is_none());
    }

    #[test]
    fn test_errors() {
        assert!(parse_path_data("L10").is_err());
        assert!(parse_path_data("X 1 2").is_err());
        // Partial data is kept once a segment exists
        let path = parse_path_data("M0 0 L10 0 L10 10 L").unwrap();
        assert_eq!(endpoints(&path).len(), 3);
    }

    #[test]
    fn test_empty_data_yields_empty_path() {
        let path = parse_path_data("   ").unwrap();
        assert_eq!(path.iter().count(), 0);
    }
}
