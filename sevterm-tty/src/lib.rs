mod input;
mod kitty;
mod paint;

pub use input::{CellMapper, EventMapper, HitMap, HitTarget, UiEvent};
pub use kitty::{DrawParams, KittyRenderer};
pub use paint::{ImageCell, Painter};
