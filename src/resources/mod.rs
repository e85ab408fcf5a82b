use std::path::{Path, PathBuf};

use anyhow::Context as _;

/**
 * This module contains all logic for loading shaders/textures/scripts from external files.
 */
pub mod shader;
pub mod texture;

pub use shader::load_shader;
pub use texture::load_texture;

/// Directory every asset name is resolved against.
pub const ASSET_DIR: &str = "assets";

pub fn asset_path(file_name: &str) -> PathBuf {
    Path::new("./").join(ASSET_DIR).join(file_name)
}

pub fn load_string(file_name: &str) -> anyhow::Result<String> {
    let path = asset_path(file_name);
    std::fs::read_to_string(&path).with_context(|| format!("Cannot read {}", path.display()))
}

pub fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = asset_path(file_name);
    std::fs::read(&path).with_context(|| format!("Cannot read {}", path.display()))
}
