//! Core library for the taxa-workbook command line application.
//!
//! The crate merges QIIME2 collapsed level tables into one spreadsheet. The
//! modules keep responsibilities narrow: directory discovery lives in
//! [`layout`], file adapters under [`io`], the in-memory representation in
//! [`model`], and the end-to-end orchestration in [`merge`].

pub mod error;
pub mod io;
pub mod layout;
pub mod merge;
pub mod model;

pub use error::{Result, ToolError};
