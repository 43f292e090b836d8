//! CRAM I/O.

mod options;
pub mod reader;
pub mod writer;

pub use self::{
    options::{Options, Region, SessionOption},
    reader::Reader,
    writer::Writer,
};
