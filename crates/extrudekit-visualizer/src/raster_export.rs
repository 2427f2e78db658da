//! Anti-aliased rasterization of a render list and PNG encoding.

use std::io::Cursor;

use extrudekit_settings::Background;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tiny_skia::{
    Color, FillRule, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::error::{ExportError, ExportResult};
use crate::projector::RenderList;
use crate::svg_export::OVERDRAW;

/// Rasterize the list onto a fresh pixmap of the list's size.
///
/// `scale` is the surface's pixels per viewport pixel; it widens the
/// overdraw stroke so seams close at any resolution.
pub fn rasterize(list: &RenderList, background: &Background, scale: f32) -> ExportResult<Pixmap> {
    let mut pixmap = Pixmap::new(list.width, list.height).ok_or(ExportError::Surface {
        width: list.width,
        height: list.height,
    })?;

    match background.color() {
        Some(c) => pixmap.fill(Color::from_rgba8(c.r, c.g, c.b, 255)),
        None => pixmap.fill(Color::TRANSPARENT),
    }

    let stroke = Stroke {
        width: OVERDRAW * scale.max(1.0),
        line_join: LineJoin::Round,
        ..Default::default()
    };

    for poly in &list.polygons {
        let [a, b, c] = poly.points;
        let mut pb = PathBuilder::new();
        pb.move_to(a.x, a.y);
        pb.line_to(b.x, b.y);
        pb.line_to(c.x, c.y);
        pb.close();
        let Some(path) = pb.finish() else {
            continue;
        };

        let [r, g, bl, alpha] = poly.shade.to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, bl, alpha);
        paint.anti_alias = true;

        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        if alpha == 255 {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    Ok(pixmap)
}

/// Un-premultiply the pixmap and encode it as PNG
pub fn encode_png(pixmap: &Pixmap) -> ExportResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let image = RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or_else(|| ExportError::Encode("pixel buffer size mismatch".into()))?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(bytes)
}
