//! Character-cell display driver for the Kestrel board.
//!
//! The board's video hardware is a text-mode surface: a grid of cells, each
//! one glyph byte plus one attribute byte. This crate provides the cursor
//! tracking, scrolling, and attribute handling on top of any such surface,
//! and implements the terminal contract the rest of the firmware renders
//! through. The firmware supplies the real VRAM-backed surface; tests
//! supply an in-memory one.

#![no_std]

pub mod attr;
pub mod console;
pub mod surface;

pub use console::TextConsole;
pub use surface::CellSurface;
