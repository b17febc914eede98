pub mod droid;
pub mod errors;
pub mod extractor;
pub mod microdata;
pub mod patent_scraper;

pub use droid::*;
pub use errors::*;
pub use extractor::*;
pub use microdata::{parse_microdata, Node as MicrodataNode};
pub use patent_scraper::*;
