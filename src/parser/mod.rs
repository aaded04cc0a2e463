pub mod listing;
pub mod product;

pub use listing::{ListingParser, ProductLinks};
pub use product::ProductParser;
