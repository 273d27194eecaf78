mod bar;
mod tick;

pub use bar::Bar;
pub use tick::{Quote, Tick};
