//! Stream sessions: opening sequence and the response body.

pub mod body;
pub mod opener;

pub use body::SessionStream;
pub use opener::{OpenedStream, StreamOpener};
