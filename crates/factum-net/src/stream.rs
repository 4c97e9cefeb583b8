// SPDX-License-Identifier: Apache-2.0
//! The graph-stream wire format (spec.md §6): a line-oriented encoding
//! used for subscription streaming. Facts are emitted in topological
//! order; predecessors are back-references by 0-based emission index.
//! Records occupy three lines (type, predecessors, fields) and are
//! separated by a blank line; `PK{n}` frames declare public keys ahead of
//! the record they sign, `SIG{n}` frames attach a signature by key index
//! to the record immediately preceding them. Control frames (`BM`, `ERR`,
//! `PING`, `PONG`) share the same blank-line-terminated framing.

use crate::error::WireError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use factum_core::{
    Envelope, FactRecord, FactReference, FieldValue, PublicKey, Predecessors, Signature,
    SignatureBytes,
};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One decoded unit of a graph-stream transport.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// A fact, with whatever signatures the stream attached to it.
    Record(Envelope),
    /// A bookmark advance for `subscription_id`.
    Bookmark {
        /// The subscription this bookmark belongs to.
        subscription_id: String,
        /// Opaque cursor value; resume point for the next `stream_feed`.
        bookmark: String,
    },
    /// A subscription-scoped error.
    Error {
        /// The subscription this error belongs to.
        subscription_id: String,
        /// Human-readable error detail.
        message: String,
    },
    /// Heartbeat request.
    Ping,
    /// Heartbeat reply.
    Pong,
}

/// Incrementally encodes envelopes and control frames into the
/// graph-stream text format, tracking the back-reference table as it
/// goes.
#[derive(Debug, Default)]
pub struct GraphStreamWriter {
    positions: BTreeMap<FactReference, usize>,
    known_keys: BTreeMap<PublicKey, usize>,
    out: String,
}

impl GraphStreamWriter {
    /// An empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fact, its predecessors (as back-references), its
    /// fields, and any signatures it carries. `envelope`'s predecessors
    /// must already have been pushed (callers supply topologically
    /// sorted input, as elsewhere in this system).
    pub fn push(&mut self, envelope: &Envelope) -> Result<(), WireError> {
        for signature in &envelope.signatures {
            self.declare_key(signature.public_key);
        }
        let fact_type_line =
            serde_json::to_string(&envelope.fact.fact_type).map_err(|e| WireError::Malformed(e.to_string()))?;
        let mut predecessors = BTreeMap::new();
        for (role, p) in &envelope.fact.predecessors {
            let indices = match p {
                Predecessors::One(r) => PredecessorIndices::One(self.index_of(r)?),
                Predecessors::Many(rs) => {
                    PredecessorIndices::Many(rs.iter().map(|r| self.index_of(r)).collect::<Result<_, _>>()?)
                }
            };
            predecessors.insert(role.clone(), indices);
        }
        let predecessors_line =
            serde_json::to_string(&predecessors).map_err(|e| WireError::Malformed(e.to_string()))?;
        let fields: BTreeMap<&str, &FieldValue> =
            envelope.fact.fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
        let fields_line = serde_json::to_string(&fields).map_err(|e| WireError::Malformed(e.to_string()))?;

        self.out.push_str(&fact_type_line);
        self.out.push('\n');
        self.out.push_str(&predecessors_line);
        self.out.push('\n');
        self.out.push_str(&fields_line);
        self.out.push('\n');
        for signature in &envelope.signatures {
            let key_index = self.known_keys[&signature.public_key];
            self.out.push_str(&format!("SIG{key_index}\n{}\n", STANDARD.encode(signature.signature.0)));
        }
        self.out.push('\n');
        self.positions.insert(envelope.fact.reference(), self.positions.len());
        Ok(())
    }

    /// Append a bookmark-advance control frame.
    pub fn push_bookmark(&mut self, subscription_id: &str, bookmark: &str) {
        self.out.push_str(&format!("BM{subscription_id} {bookmark}\n\n"));
    }

    /// Append an error control frame.
    pub fn push_error(&mut self, subscription_id: &str, message: &str) {
        self.out.push_str(&format!("ERR{subscription_id} {message}\n\n"));
    }

    /// Append a heartbeat request.
    pub fn push_ping(&mut self) {
        self.out.push_str("PING\n\n");
    }

    /// Append a heartbeat reply.
    pub fn push_pong(&mut self) {
        self.out.push_str("PONG\n\n");
    }

    /// Consume the writer, returning the accumulated text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn declare_key(&mut self, public_key: PublicKey) {
        if self.known_keys.contains_key(&public_key) {
            return;
        }
        let index = self.known_keys.len();
        self.known_keys.insert(public_key, index);
        self.out.push_str(&format!("PK{index} {}\n", public_key.to_base64()));
    }

    fn index_of(&self, reference: &FactReference) -> Result<usize, WireError> {
        self.positions
            .get(reference)
            .copied()
            .ok_or_else(|| WireError::UnemittedPredecessor(reference.clone()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PredecessorIndices {
    One(usize),
    Many(Vec<usize>),
}

impl serde::Serialize for PredecessorIndices {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PredecessorIndices::One(i) => serializer.serialize_u64(*i as u64),
            PredecessorIndices::Many(indices) => indices.serialize(serializer),
        }
    }
}

/// Decode a full graph-stream text into its frames, in order. Back
/// references resolve against facts emitted earlier in the same text.
pub fn decode_graph_stream(text: &str) -> Result<Vec<StreamFrame>, WireError> {
    let mut known_keys: BTreeMap<usize, PublicKey> = BTreeMap::new();
    let mut facts: Vec<FactReference> = Vec::new();
    let mut frames = Vec::new();

    for block in text.split("\n\n") {
        let lines: Vec<&str> = block.lines().filter(|l| !l.is_empty()).collect();
        if lines.is_empty() {
            continue;
        }
        if lines.len() == 1 {
            if let Some(frame) = parse_control_line(lines[0])? {
                frames.push(frame);
                continue;
            }
        }
        let envelope = parse_record_block(&lines, &mut known_keys, &facts)?;
        facts.push(envelope.fact.reference());
        frames.push(StreamFrame::Record(envelope));
    }
    Ok(frames)
}

fn parse_control_line(line: &str) -> Result<Option<StreamFrame>, WireError> {
    if line == "PING" {
        return Ok(Some(StreamFrame::Ping));
    }
    if line == "PONG" {
        return Ok(Some(StreamFrame::Pong));
    }
    if let Some(rest) = line.strip_prefix("BM") {
        let (subscription_id, bookmark) = split_once_space(rest)?;
        return Ok(Some(StreamFrame::Bookmark { subscription_id, bookmark }));
    }
    if let Some(rest) = line.strip_prefix("ERR") {
        let (subscription_id, message) = split_once_space(rest)?;
        return Ok(Some(StreamFrame::Error { subscription_id, message }));
    }
    Ok(None)
}

fn split_once_space(rest: &str) -> Result<(String, String), WireError> {
    rest.split_once(' ')
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .ok_or_else(|| WireError::Malformed(format!("control frame missing payload: {rest}")))
}

fn parse_record_block(
    lines: &[&str],
    known_keys: &mut BTreeMap<usize, PublicKey>,
    facts: &[FactReference],
) -> Result<Envelope, WireError> {
    let mut i = 0;
    while i < lines.len() {
        if let Some(rest) = lines[i].strip_prefix("PK") {
            let (index_str, key_str) =
                rest.split_once(' ').ok_or_else(|| WireError::Malformed(format!("malformed PK frame: {rest}")))?;
            let index: usize = index_str.parse().map_err(|_| WireError::Malformed(format!("bad PK index: {index_str}")))?;
            let public_key = PublicKey::from_base64(key_str).ok_or(WireError::InvalidBase64("PK public key"))?;
            known_keys.insert(index, public_key);
            i += 1;
        } else {
            break;
        }
    }
    if lines.get(i).is_some_and(|l| l.starts_with("SIG")) {
        return Err(WireError::DanglingSignature);
    }
    if i + 3 > lines.len() {
        return Err(WireError::Malformed("record block missing type/predecessors/fields lines".to_string()));
    }
    let fact_type: String =
        serde_json::from_str(lines[i]).map_err(|e| WireError::Malformed(e.to_string()))?;
    let predecessor_indices: BTreeMap<String, PredecessorIndices> =
        serde_json::from_str(lines[i + 1]).map_err(|e| WireError::Malformed(e.to_string()))?;
    let fields_map: BTreeMap<String, FieldValue> =
        serde_json::from_str(lines[i + 2]).map_err(|e| WireError::Malformed(e.to_string()))?;
    i += 3;

    let mut predecessors = Vec::new();
    for (role, indices) in predecessor_indices {
        let resolved = match indices {
            PredecessorIndices::One(idx) => Predecessors::One(resolve(facts, idx)?),
            PredecessorIndices::Many(idxs) => {
                Predecessors::Many(idxs.into_iter().map(|idx| resolve(facts, idx)).collect::<Result<_, _>>()?)
            }
        };
        predecessors.push((role, resolved));
    }
    let fields: Vec<(String, FieldValue)> = fields_map.into_iter().collect();
    let fact = FactRecord::new(fact_type, fields, predecessors);

    let mut signatures = Vec::new();
    while i + 1 < lines.len() {
        let Some(rest) = lines[i].strip_prefix("SIG") else { break };
        let key_index: usize = rest.parse().map_err(|_| WireError::Malformed(format!("bad SIG index: {rest}")))?;
        let public_key = *known_keys.get(&key_index).ok_or(WireError::UndeclaredKey(key_index))?;
        let bytes = STANDARD.decode(lines[i + 1]).map_err(|_| WireError::InvalidBase64("SIG bytes"))?;
        let array: [u8; 64] = bytes.try_into().map_err(|_| WireError::InvalidBase64("SIG bytes"))?;
        signatures.push(Signature { public_key, signature: SignatureBytes(array) });
        i += 2;
    }
    if i < lines.len() {
        return Err(WireError::Malformed("trailing lines in record block".to_string()));
    }
    Ok(Envelope { fact, signatures })
}

fn resolve(facts: &[FactReference], index: usize) -> Result<FactReference, WireError> {
    facts.get(index).cloned().ok_or(WireError::BadBackReference(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use factum_core::sign;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    #[test]
    fn round_trips_a_single_unsigned_fact() {
        let fact = FactRecord::new("Project", vec![("name".into(), FieldValue::String("Acme".into()))], vec![]);
        let envelope = Envelope { fact, signatures: vec![] };
        let mut writer = GraphStreamWriter::new();
        writer.push(&envelope).unwrap();
        let text = writer.finish();

        let frames = decode_graph_stream(&text).unwrap();
        assert_eq!(frames, vec![StreamFrame::Record(envelope)]);
    }

    #[test]
    fn back_references_resolve_across_records() {
        let parent = FactRecord::new("Parent", vec![], vec![]);
        let parent_envelope = Envelope { fact: parent.clone(), signatures: vec![] };
        let child = FactRecord::new("Child", vec![], vec![("parent".into(), Predecessors::One(parent.reference()))]);
        let child_envelope = Envelope { fact: child, signatures: vec![] };

        let mut writer = GraphStreamWriter::new();
        writer.push(&parent_envelope).unwrap();
        writer.push(&child_envelope).unwrap();
        let text = writer.finish();

        let frames = decode_graph_stream(&text).unwrap();
        assert_eq!(frames, vec![StreamFrame::Record(parent_envelope), StreamFrame::Record(child_envelope)]);
    }

    #[test]
    fn signed_fact_round_trips_with_key_declaration() {
        let fact = FactRecord::new("A", vec![], vec![]);
        let signing_key = SigningKey::generate(&mut OsRng);
        let signature = sign(&signing_key, &fact);
        let envelope = Envelope { fact, signatures: vec![signature] };

        let mut writer = GraphStreamWriter::new();
        writer.push(&envelope).unwrap();
        let text = writer.finish();
        assert!(text.starts_with("PK0 "));

        let frames = decode_graph_stream(&text).unwrap();
        assert_eq!(frames, vec![StreamFrame::Record(envelope)]);
    }

    #[test]
    fn emitting_a_predecessor_out_of_order_fails() {
        let parent = FactRecord::new("Parent", vec![], vec![]);
        let child = FactRecord::new("Child", vec![], vec![("parent".into(), Predecessors::One(parent.reference()))]);
        let mut writer = GraphStreamWriter::new();
        let result = writer.push(&Envelope { fact: child, signatures: vec![] });
        assert!(matches!(result, Err(WireError::UnemittedPredecessor(_))));
    }

    #[test]
    fn control_frames_round_trip() {
        let mut writer = GraphStreamWriter::new();
        writer.push_bookmark("sub1", "cursor-42");
        writer.push_ping();
        writer.push_error("sub1", "upstream unavailable");
        let text = writer.finish();

        let frames = decode_graph_stream(&text).unwrap();
        assert_eq!(
            frames,
            vec![
                StreamFrame::Bookmark { subscription_id: "sub1".into(), bookmark: "cursor-42".into() },
                StreamFrame::Ping,
                StreamFrame::Error { subscription_id: "sub1".into(), message: "upstream unavailable".into() },
            ]
        );
    }

    #[test]
    fn decoding_an_unresolved_back_reference_fails() {
        let text = "\"A\"\n{\"parent\":7}\n{}\n\n";
        let err = decode_graph_stream(text).unwrap_err();
        assert!(matches!(err, WireError::BadBackReference(7)));
    }

    #[test]
    fn a_signature_with_no_preceding_record_is_rejected() {
        let text = "SIG0\nYWJj\n\n";
        let err = decode_graph_stream(text).unwrap_err();
        assert!(matches!(err, WireError::DanglingSignature));
    }

    #[test]
    fn hash_is_recomputed_rather_than_transmitted() {
        let fact = FactRecord::new("A", vec![], vec![]);
        let envelope = Envelope { fact, signatures: vec![] };
        let mut writer = GraphStreamWriter::new();
        writer.push(&envelope).unwrap();
        let text = writer.finish();
        assert!(!text.contains("hash"));
    }
}
