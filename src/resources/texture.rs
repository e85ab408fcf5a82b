use crate::data_structures::texture::Texture;

use super::{asset_path, load_binary};

pub fn load_texture(gl: &glow::Context, file_name: &str) -> anyhow::Result<Texture> {
    let data = load_binary(file_name)?;
    Texture::from_bytes(gl, &data, file_name)
}

/// Like [`load_texture`], but falls back to a checkerboard when the file is
/// missing. Decode errors are still reported.
pub fn load_texture_or_checkerboard(
    gl: &glow::Context,
    file_name: &str,
) -> anyhow::Result<Texture> {
    if asset_path(file_name).exists() {
        return load_texture(gl, file_name);
    }
    log::warn!("Texture {file_name} not found, using a checkerboard instead");
    Texture::create_checkerboard(gl, 64, 8)
}
