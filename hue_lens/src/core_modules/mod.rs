#[allow(non_snake_case)]
pub mod D1;

pub mod classifier;
pub mod color_matrix;
pub mod cvd_engine;
pub mod deficiency;
pub mod filter_descriptor;
pub mod frame;
pub mod hue_band;
pub mod mode_state;
pub mod palette;
