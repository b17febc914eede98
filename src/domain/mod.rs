pub mod html_tag;
pub mod patent_record;
pub mod target;

pub use patent_record::*;
pub use target::*;
