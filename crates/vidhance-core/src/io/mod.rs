pub mod image_io;
pub mod ser;
pub mod ser_writer;

pub use ser::{SerHeader, SerReader};
pub use ser_writer::SerWriter;
