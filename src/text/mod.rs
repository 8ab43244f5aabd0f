/// Word segmentation and focal-point selection.
pub mod segment;
