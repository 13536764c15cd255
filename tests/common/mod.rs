#![allow(dead_code)]

pub mod recording;

use std::fs;
use std::path::PathBuf;

use sector_walk::{ImageData, TEXTURE_FILE, WORLD_FILE, World};

pub const ONE_TRIANGLE: &str = "\
// one triangle facing the camera
NUMPOLLIES 1
0.0 0.0 -5.0 0.0 0.0
1.0 0.0 -5.0 1.0 0.0
0.0 1.0 -5.0 0.0 1.0
";

pub fn one_triangle() -> World {
    World::parse(ONE_TRIANGLE).unwrap()
}

/// A 4x4 checker, enough for a three level mip chain.
pub fn checker() -> ImageData {
    let mut pixels = Vec::with_capacity(4 * 4 * 4);
    for y in 0..4 {
        for x in 0..4 {
            let shade = if (x + y) % 2 == 0 { 255 } else { 32 };
            pixels.extend_from_slice(&[shade, shade, shade, 255]);
        }
    }
    ImageData::from_rgba(4, 4, pixels)
}

/// A resource root holding `world` and the bundled texture.
pub fn resource_root(name: &str, world: &str) -> PathBuf {
    let root = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    let data = root.join("Data");
    fs::create_dir_all(&data).unwrap();
    fs::write(root.join(WORLD_FILE), world).unwrap();
    fs::copy(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(TEXTURE_FILE),
        root.join(TEXTURE_FILE),
    )
    .unwrap();
    root
}
