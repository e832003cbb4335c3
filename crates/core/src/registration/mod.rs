//! Registration form: draft rules and the reconciler that drives them.

mod draft;
mod reconciler;

pub use draft::*;
pub use reconciler::*;
