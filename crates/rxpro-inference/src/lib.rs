//! # rxpro-inference: Prescription Analysis for the RxPro POS
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         RX analysis flow                                │
//! │                                                                         │
//! │  RX text / photo  +  [RxInstruction]                                   │
//! │       │                    │                                            │
//! │       │                    ▼                                            │
//! │       │            instruction_text()  ← hidden safety lines appended  │
//! │       ▼                    │                                            │
//! │  InferenceRequest ◄────────┘                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dyn InferenceBackend  (GeminiClient in production)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  analyze_or_fallback() ── error? ──► "AI Inference failed: ..."        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InferenceReport ──► render_html() / render_pdf()                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod instructions;
pub mod report;

pub use client::{
    analyze_or_fallback, GeminiClient, GeminiConfig, InferenceBackend, InferenceRequest, RxImage,
};
pub use error::{InferenceError, InferenceResult};
pub use instructions::{instruction_text, RxInstruction, HIDDEN_INSTRUCTIONS};
pub use report::{rxpro_report_file_name, InferenceReport, TransactionSummary};
