// SPDX-License-Identifier: Apache-2.0
//! Content-addressed fact model for Factum.
//!
//! A [`FactRecord`] is an immutable record with a type name, a set of
//! scalar fields and a set of predecessor references. Its identity is the
//! [`FactHash`] of its canonical byte form (see [`canonical`]). Facts are
//! dehydrated from application-authored [`FactInput`] trees, signed with
//! an [`Signer`], and carried around as [`Envelope`]s (fact + signatures).
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]

mod canonical;
mod dehydrate;
mod error;
mod record;
mod reference;
mod signature;
mod value;

pub use canonical::canonical_bytes;
pub use dehydrate::{dehydrate, hydrate, FactGraph, FactInput, PredecessorInput};
pub use error::{InvalidFactError, InvalidGraphError};
pub use record::{FactRecord, Predecessors};
pub use reference::{FactHash, FactReference};
pub use signature::{sign, verify_envelope, Envelope, PublicKey, Signature, SignatureBytes, Signer};
pub use value::FieldValue;
