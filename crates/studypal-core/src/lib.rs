//! Core engine for StudyPal: flashcard extraction from question/answer pairs,
//! per-document aggregates, and the streak/badge progress model.
//!
//! This crate is deliberately free of database and CLI dependencies. Durable
//! storage is reached through [`gateway::PersistenceGateway`]; the composition
//! root builds one [`StudyEngine`] and passes it to whatever drives it.

pub mod answer;
pub mod auth;
pub mod badge;
pub mod clock;
pub mod codec;
pub mod concept;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod event;
pub mod flashcard;
pub mod gateway;
pub mod progress;
pub mod repository;
pub mod sets;
pub mod text;
pub mod user;

mod persist;

pub use engine::StudyEngine;
pub use error::{Error, Result};
