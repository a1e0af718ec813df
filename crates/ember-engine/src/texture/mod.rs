//! Name-keyed texture cache and image decoding.

mod cache;
mod decode;

pub use cache::{Texture, TextureCache, TextureHandle};
pub use decode::{decode_file, ImageData};
