//! Word-frame rendering.
//!
//! `layout` owns the geometry; `cpu` rasterizes it with `vello_cpu` and `terminal` draws
//! it in character cells.

pub mod backend;
pub mod cpu;
pub mod fonts;
pub mod layout;
pub mod terminal;
