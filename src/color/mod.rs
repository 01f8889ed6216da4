use smart_leds::RGB8;

/// 8-bit RGB pixel, the element type of frames and chains.
pub type Rgb = RGB8;

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
