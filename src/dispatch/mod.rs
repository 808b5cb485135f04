pub mod handler;
pub mod registry;

pub use handler::ActionHandler;
pub use registry::DispatchTable;
