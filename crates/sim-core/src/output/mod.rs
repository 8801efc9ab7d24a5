//! Output Generation
//!
//! Renderer views and the files a run leaves behind.

pub mod view;
pub mod writer;

pub use view::*;
pub use writer::*;
