//! Provides input/output functionality for Gromacs data files.
//!
//! Gromacs analysis tools write their time series in the XVG (Grace) text format. This
//! module reads and writes that format behind the [`traits::DataFile`] trait and can export
//! parsed data as CSV tables.

pub mod export;
pub mod traits;
pub mod xvg;
