//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around a `GL_TEXTURE_2D`
//! object. Every texture uses the same sampling setup: repeat wrapping,
//! trilinear minification over generated mipmaps and linear magnification.

use anyhow::{anyhow, ensure};
use glow::{HasContext, PixelUnpackData};
use image::{RgbaImage, imageops};

/// Number of texture units a state may bind to. OpenGL 3.3 guarantees at
/// least 16 combined units for the fragment stage.
pub const MAX_TEXTURE_UNITS: u32 = 16;

/// A 2D texture handle and its dimensions.
#[derive(Debug, Clone, Copy)]
pub struct Texture {
    pub texture: glow::Texture,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Load a texture from raw byte data (image file contents).
    ///
    /// # Arguments
    ///
    /// * `bytes` represent raw image file data (PNG, JPEG, BMP)
    /// * `label` names the source in errors and logs
    pub fn from_bytes(gl: &glow::Context, bytes: &[u8], label: &str) -> anyhow::Result<Self> {
        let img = decode_rgba(bytes).map_err(|e| anyhow!("Cannot decode texture {label}: {e}"))?;
        log::debug!("Decoded texture {label} ({}x{})", img.width(), img.height());
        Self::from_image(gl, &img)
    }

    /// Upload an RGBA image. Rows are expected bottom-up, as produced by
    /// [`decode_rgba`].
    pub fn from_image(gl: &glow::Context, img: &RgbaImage) -> anyhow::Result<Self> {
        let (width, height) = img.dimensions();
        unsafe {
            let texture = gl.create_texture().map_err(|e| anyhow!(e))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);

            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(img.as_raw())),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                texture,
                width,
                height,
            })
        }
    }

    /// Create a grey/white checkerboard, used when an image asset is missing
    /// so that states don't need a second shader path.
    pub fn create_checkerboard(gl: &glow::Context, size: u32, cell: u32) -> anyhow::Result<Self> {
        Self::from_image(gl, &checkerboard(size, cell))
    }

    /// Bind to `TEXTURE0 + unit`.
    pub fn bind(&self, gl: &glow::Context, unit: u32) -> anyhow::Result<()> {
        let unit = texture_unit(unit)?;
        unsafe {
            gl.active_texture(unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
        Ok(())
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.texture) };
    }
}

/// Map a unit index to its `GL_TEXTUREi` enum.
pub fn texture_unit(unit: u32) -> anyhow::Result<u32> {
    ensure!(
        unit < MAX_TEXTURE_UNITS,
        "Texture unit {unit} is outside 0..{MAX_TEXTURE_UNITS}"
    );
    Ok(glow::TEXTURE0 + unit)
}

/// Decode image file bytes into RGBA8 with the first row at the bottom, which
/// is where OpenGL expects texture coordinate v = 0.
pub fn decode_rgba(bytes: &[u8]) -> image::ImageResult<RgbaImage> {
    let mut rgba = image::load_from_memory(bytes)?.to_rgba8();
    imageops::flip_vertical_in_place(&mut rgba);
    Ok(rgba)
}

fn checkerboard(size: u32, cell: u32) -> RgbaImage {
    let size = size.max(1);
    let cell = cell.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([96, 96, 96, 255])
        }
    })
}
