//! Tabulated BRDFs and BTDFs, their arrangement and their export to the DDR
//! format.
//!
//! The usual path of a BRDF through this crate is:
//!
//! 1. [`convert::to_specular_coords`] resamples any [`brdf::Brdf`] onto a
//!    grid in specular offset coordinates;
//! 2. [`arrange::arrange`] completes and repairs that grid;
//! 3. [`ddr::write_ddr_to`] serializes it.
//!
//! [`ddr::write_ddr`] and [`ddr::write_ddr_btdf`] chain the three steps.

pub mod arrange;
pub mod brdf;
pub mod btdf;
pub mod convert;
pub mod ddr;
pub mod model;
