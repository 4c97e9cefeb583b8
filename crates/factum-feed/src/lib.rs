// SPDX-License-Identifier: Apache-2.0
//! Feed skeleton extraction and inverse-specification derivation
//! (spec.md §4.6): the structural layer the observer (`factum-observable`)
//! and distribution engine (`factum-distribution`) build on.
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented
)]

mod decompose;
mod inverse;
mod skeleton;

pub use decompose::decompose;
pub use inverse::{derive_inverses, Inverse, InverseOperation};
pub use skeleton::{equivalent, skeleton_of, Edge, EdgeKind, FactNode, Skeleton};
