//! Foundation types for colstore.
//!
//! This crate provides the element, value, and layout types shared by the
//! store implementations. Every other colstore crate depends on
//! `colstore-types`.
//!
//! # Key Types
//!
//! - [`ElementType`] -- Homogeneous column element type (`i64`, `f32`, ...)
//! - [`Value`] -- A dynamically typed cell, scalar or fixed-width row
//! - [`Literal`] -- Untyped configuration literal coerced into a [`Value`]
//! - [`MemberSpec`] -- Declaration of one named store member
//! - [`Layout`] -- Ordered, validated set of member declarations
//! - [`Selector`] -- Index request; rejects negative indices and slices

pub mod element;
pub mod error;
pub mod layout;
pub mod selector;
pub mod spec;
pub mod value;

pub use element::ElementType;
pub use error::TypeError;
pub use layout::{Layout, MemberDef};
pub use selector::Selector;
pub use spec::MemberSpec;
pub use value::{Literal, Value};
