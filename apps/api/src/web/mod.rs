//! Server-rendered HTML pages: search form, ranked results, candidate profiles.

pub mod handlers;
pub mod pages;
pub mod presentation;
