pub mod capture;
pub mod store;

pub use capture::{Capture, CaptureSource};
pub use store::Fixtures;
