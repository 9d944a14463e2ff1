mod time_utils;
pub use time_utils::*;

mod pattern;
pub use pattern::*;
