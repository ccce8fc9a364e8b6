//! # Vitamin Scan
//!
//! Extracts the ingredient list of a prenatal vitamin label from a photo,
//! normalizes names against a nutrient knowledge base, checks amounts against
//! typical dosage ranges and attaches confidence scores and warnings.
//!
//! ## Pipeline
//!
//! 1. [`label_image`] loads and validates the photo
//! 2. [`vision_client`] asks a vision model for the label contents as JSON
//! 3. [`response_parser`] locates and validates that JSON
//! 4. [`strategy_merger`] reconciles several concurrent extractions (curved bottles)
//! 5. [`annotator`] and [`issue_detector`] score ingredients and flag problems
//!
//! [`label_analyzer::analyze_label`] ties these together; [`recovery`] adds
//! caller-side retries. Failures never surface as errors from the pipeline,
//! they come back as results with `success: false`.

pub mod amount_validator;
pub mod annotator;
pub mod circuit_breaker;
pub mod facts_parser;
pub mod issue_detector;
pub mod knowledge_base;
pub mod label_analyzer;
pub mod label_image;
pub mod name_resolver;
pub mod nutrient_model;
pub mod prompts;
pub mod recovery;
pub mod response_parser;
pub mod scan_config;
pub mod scan_errors;
pub mod strategy_merger;
pub mod vision_client;
