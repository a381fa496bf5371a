pub use distance::*;
pub use list::*;
pub use replay::*;

mod distance;
mod list;
mod replay;
