pub mod annotator;
pub mod capture;
pub mod types;

pub use capture::{FrameCapture, FrameSource, XcapFrameSource};
pub use types::{Annotation, Frame};
