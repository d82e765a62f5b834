mod assets;
mod image_cache;
mod source;

pub use assets::{Asset, FsAssetLoader};
pub use image_cache::{ImageCache, ImageError, ImageStatus};
pub use source::{decode_texture, DecodingImageSource};
