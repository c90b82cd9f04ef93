//! Interpolation on ordered grids.
//!
//! Rate paths and forward curves are interpolated piecewise-linearly
//! with flat extension past the grid ends.

mod linear;

pub use linear::interp;
