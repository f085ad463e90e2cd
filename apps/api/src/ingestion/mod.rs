//! CV ingestion: file → PDF → text → structured profile → embedding → store.

pub mod convert;
pub mod extract;
pub mod github;
pub mod handlers;
pub mod pipeline;
