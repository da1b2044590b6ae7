//! Attribute byte packing: foreground bits 0-3, background bits 4-6.

use kestrel_core::Color;

/// Pack foreground and background palette indices into one attribute byte.
pub const fn make_attr(fg: Color, bg: Color) -> u8 {
    (fg.index() & 0x0F) | ((bg.index() & 0x07) << 4)
}

/// Extract the foreground index from an attribute.
pub const fn attr_fg(attr: u8) -> u8 {
    attr & 0x0F
}

/// Extract the background index from an attribute.
pub const fn attr_bg(attr: u8) -> u8 {
    (attr >> 4) & 0x07
}

/// Default attribute: light gray on black.
pub const DEFAULT_ATTR: u8 = make_attr(Color::LightGray, Color::Black);
