// src/goodboy/mod.rs

pub mod action_queue;
pub mod analysis;
pub mod api;
pub mod brain;
pub mod client_wrapper;
pub mod clients;
pub mod config;
pub mod documents;
pub mod error;
pub mod event;
pub mod evolution;
pub mod jsonl;
pub mod learning;
pub mod lessons;
pub mod memory;
pub mod minibots;
pub mod persona;
pub mod reflex;
pub mod router;
pub mod safety;
pub mod self_model;
pub mod synthesizer;

pub use brain::Brain;
pub use error::GoodBoyError;
