//! Zansei Intake - Conversational Intake Engine
//!
//! This crate drives an LLM-backed intake conversation for business owners:
//! structured answers are extracted from free text, aggregated into a
//! progress score, and report components unlock progressively as enough
//! high-quality data accumulates.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
