//! Tracked concolic values.
//!
//! [`Value<T>`] carries a host scalar together with an optional symbolic
//! companion from the [`crate::expr`] DAG. The [`Primitive`] and [`Promote`]
//! tables fix which host scalars are supported and what type an arithmetic
//! operation yields. The [`Tracer`] records the path constraints produced when
//! symbolic booleans drive control flow.

mod primitive;
mod tracer;
#[allow(clippy::module_inception)]
mod value;

pub use primitive::{Primitive, Promote};
pub use tracer::Tracer;
pub use value::{Value, Version};
