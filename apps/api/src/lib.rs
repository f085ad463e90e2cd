pub mod config;
pub mod db;
pub mod embedding;
pub mod errors;
pub mod ingestion;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod profile;
pub mod routes;
pub mod state;
pub mod store;
pub mod uploads;
pub mod web;
