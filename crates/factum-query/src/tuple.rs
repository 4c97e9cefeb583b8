// SPDX-License-Identifier: Apache-2.0
//! Named tuples of bound labels, the evaluator's working unit.

use factum_core::FactReference;
use std::collections::HashMap;

/// A binding from label name to the fact reference resolved for it.
pub type Tuple = HashMap<String, FactReference>;
