//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types for the Trellis diagram
//! domain layer. It includes:
//!
//! - **Geometry**: Placement types for components ([`geometry`] module)
//! - **Style/Content**: Presentation-only properties ([`style`], [`content`])
//! - **Components**: The typed entity model ([`component`] module) — one
//!   shared envelope plus a closed union of kind-specific payloads
//! - **Factory**: The single authorized constructor per kind ([`factory`])
//! - **Portable form**: Flat serde records for persistence ([`portable`])
//!
//! Higher-level concerns — the identity-keyed store and the connector rule
//! engine — live in the `trellis` crate.

pub mod component;
pub mod content;
pub mod factory;
pub mod geometry;
pub mod portable;
pub mod style;
