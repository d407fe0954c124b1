//! Document I/O for the command-line tool

pub mod format;
pub mod reader;
pub mod resolver;
pub mod writer;

pub use format::Format;
pub use reader::{read_document, read_from, Document};
pub use resolver::{FileResolver, ResolverConfig};
pub use writer::{write_atomic, write_document, write_document_to, WriteOptions, WriteResult};
