pub mod categories;
pub mod diamond_ids;
pub mod health;

pub use categories::*;
pub use diamond_ids::*;
pub use health::*;
