///! Page image decoding and canvas compositing

pub mod compositor;
pub mod decoder;

pub use compositor::{Canvas, Placement};
pub use decoder::decode_image;
