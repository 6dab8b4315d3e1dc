pub mod icons;
pub mod progress;

pub use progress::{Status, with_status};
