pub mod locator;
pub mod mapper;
pub mod source;
pub mod store;
pub mod types;

pub use locator::WindowLocator;
pub use mapper::CoordinateMapper;
pub use types::Region;
