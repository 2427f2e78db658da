//! Render surface dimensions.

use extrudekit_settings::ViewportSettings;
use serde::{Deserialize, Serialize};

/// The live render surface, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &ViewportSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            pixel_ratio: settings.pixel_ratio,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// A separate surface `scale` times the size, at pixel ratio 1
    pub fn offscreen(&self, scale: u32) -> OffscreenSurface {
        OffscreenSurface {
            width: self.width.saturating_mul(scale),
            height: self.height.saturating_mul(scale),
            scale: scale as f32,
        }
    }
}

/// Dimensions of an off-screen export target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffscreenSurface {
    pub width: u32,
    pub height: u32,
    /// Pixels per viewport pixel
    pub scale: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offscreen_is_scaled_copy() {
        let viewport = Viewport::new(640, 480);
        let surface = viewport.offscreen(2);
        assert_eq!((surface.width, surface.height), (1280, 960));
        assert_eq!(viewport, Viewport::new(640, 480));
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(Viewport::new(800, 400).aspect_ratio(), 2.0);
        assert_eq!(Viewport::new(800, 0).aspect_ratio(), 1.0);
        assert!(Viewport::new(0, 10).is_empty());
    }
}
