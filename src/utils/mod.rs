pub mod logging;
pub mod string_util;

pub use logging::init_logging;
pub use string_util::{StripCodeBlock, StripJsonComments};
