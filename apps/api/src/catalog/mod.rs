// Static course / project / internship listings and their keyword search.

pub mod handlers;
pub mod search;

pub use search::Catalog;
