//! Nexus — AI-commissioned strategic intelligence reports for regional
//! economies.
//!
//! Two halves share this crate:
//!
//! - the proxy service (`routes`, `reports`, `llm_client`): a thin HTTP
//!   layer that forwards structured prompts to the generative backend and
//!   streams text back;
//! - the client core (`wizard`, `client`, `assembler`, `cache`, `chat`):
//!   explicit state machines behind the report-commissioning front end.

pub mod assembler;
pub mod cache;
pub mod chat;
pub mod client;
pub mod config;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod reports;
pub mod routes;
pub mod state;
pub mod wizard;
