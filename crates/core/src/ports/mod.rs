mod breed_source;
mod favorites;
mod pagination;

pub use breed_source::*;
pub use favorites::*;
pub use pagination::*;
