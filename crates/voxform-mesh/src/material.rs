//! Materials and texture colour sampling.

use std::path::Path;

use glam::Vec2;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use voxform_core::Rgba;

use crate::error::Result;

/// Texture filtering mode used when sampling surface colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFiltering {
    /// Sample the nearest texel.
    #[default]
    Nearest,
    /// Blend the four surrounding texels.
    Bilinear,
}

/// A decoded texture image sampled by UV coordinate.
#[derive(Clone, Debug)]
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    /// Wrap an already-decoded image
    pub const fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode a texture from a file
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)?.to_rgba8();
        Ok(Self::from_image(image))
    }

    /// Texture dimensions in texels
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn texel(&self, x: u32, y: u32) -> Rgba {
        let p = self.image.get_pixel(x, y).0;
        Rgba::from_bytes(p[0], p[1], p[2], p[3])
    }

    /// Sample the texture at a UV coordinate.
    ///
    /// UVs wrap on both axes; V points up (image rows run top-down).
    /// Bilinear filtering clamps at texture edges.
    pub fn sample(&self, uv: Vec2, filtering: TextureFiltering) -> Rgba {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return Rgba::FALLBACK;
        }

        let u = uv.x - uv.x.floor();
        let v = 1.0 - (uv.y - uv.y.floor());

        match filtering {
            TextureFiltering::Nearest => {
                let x = ((u * w as f32) as u32).min(w - 1);
                let y = ((v * h as f32) as u32).min(h - 1);
                self.texel(x, y)
            }
            TextureFiltering::Bilinear => {
                let fx = (u * w as f32 - 0.5).max(0.0);
                let fy = (v * h as f32 - 0.5).max(0.0);
                let x0 = (fx as u32).min(w - 1);
                let y0 = (fy as u32).min(h - 1);
                let x1 = (x0 + 1).min(w - 1);
                let y1 = (y0 + 1).min(h - 1);
                let tx = fx - fx.floor();
                let ty = fy - fy.floor();

                let top = self.texel(x0, y0).lerp(self.texel(x1, y0), tx);
                let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), tx);
                top.lerp(bottom, ty)
            }
        }
    }
}

/// Surface appearance of a mesh material.
#[derive(Clone, Debug)]
pub enum Material {
    /// Uniform colour with no texture.
    Solid(Rgba),
    /// Colour sampled from a texture image.
    Textured(Texture),
}

impl Material {
    /// Sample the material's colour at a UV coordinate
    pub fn sample(&self, uv: Vec2, filtering: TextureFiltering) -> Rgba {
        match self {
            Self::Solid(colour) => *colour,
            Self::Textured(texture) => texture.sample(uv, filtering),
        }
    }
}
