//! Batch file formats used by the command line tool.

pub mod csv;
