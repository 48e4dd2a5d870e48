//! JSON encoding and decoding of protocol messages.

use crate::error::{DecodeError, EncodeError};
use crate::snapshot::{EntitySnapshot, SnapshotBatch};

/// Encodes one snapshot as an outbound position message.
///
/// Produces `{"id":..,"content":{"x":..,"y":..,"z":..}}`. Non-finite
/// coordinates are rejected because JSON cannot represent them.
pub fn encode_snapshot(snapshot: &EntitySnapshot) -> Result<String, EncodeError> {
    if !snapshot.position.is_finite() {
        return Err(EncodeError::NonFinite {
            id: snapshot.id.clone(),
        });
    }
    Ok(serde_json::to_string(snapshot)?)
}

/// Decodes an inbound frame payload into a snapshot batch.
///
/// The payload must be UTF-8 JSON with a `players` array. Unknown fields
/// are ignored. Every snapshot needs an `id` and all three coordinates: a
/// missing coordinate is rejected rather than defaulted to zero, so a
/// truncated server payload never teleports an entity to an axis origin.
pub fn decode_batch(bytes: &[u8]) -> Result<SnapshotBatch, DecodeError> {
    let text = std::str::from_utf8(bytes)?;
    decode_batch_str(text)
}

/// Decodes an inbound text frame into a snapshot batch.
pub fn decode_batch_str(text: &str) -> Result<SnapshotBatch, DecodeError> {
    let batch: SnapshotBatch = serde_json::from_str(text)?;

    for (index, snapshot) in batch.iter().enumerate() {
        if snapshot.id.is_empty() {
            return Err(DecodeError::EmptyId { index });
        }
        // Numbers beyond f32 range narrow to infinity.
        if !snapshot.position.is_finite() {
            return Err(DecodeError::NonFinite { index });
        }
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Position;
    use proptest::prelude::*;

    #[test]
    fn decode_single_player() {
        let batch =
            decode_batch_str(r#"{"players":[{"id":"p1","content":{"x":1,"y":0,"z":2}}]}"#).unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.snapshots[0].id, "p1");
        assert_eq!(batch.snapshots[0].position, Position::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn decode_empty_players() {
        let batch = decode_batch_str(r#"{"players":[]}"#).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let batch = decode_batch_str(
            r#"{"players":[{"id":"p1","content":{"x":1,"y":2,"z":3,"w":4},"hp":9}],"tick":7}"#,
        )
        .unwrap();
        assert_eq!(batch.snapshots[0].position, Position::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn decode_rejects_missing_players() {
        let err = decode_batch_str(r#"{"id":"p1"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn decode_rejects_missing_coordinate() {
        let err = decode_batch_str(r#"{"players":[{"id":"p1","content":{"x":1,"y":0}}]}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn decode_rejects_string_coordinate() {
        let err = decode_batch_str(r#"{"players":[{"id":"p1","content":{"x":"1","y":0,"z":0}}]}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn decode_rejects_empty_id() {
        let err = decode_batch_str(
            r#"{"players":[{"id":"a","content":{"x":0,"y":0,"z":0}},{"id":"","content":{"x":0,"y":0,"z":0}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::EmptyId { index: 1 }));
    }

    #[test]
    fn decode_rejects_out_of_range_coordinate() {
        let err = decode_batch_str(
            r#"{"players":[{"id":"p1","content":{"x":0,"y":0,"z":0}},{"id":"p2","content":{"x":1e39,"y":0,"z":0}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::NonFinite { index: 1 }));

        let err = decode_batch_str(r#"{"players":[{"id":"p1","content":{"x":0,"y":-1e300,"z":0}}]}"#)
            .unwrap_err();
        assert!(matches!(err, DecodeError::NonFinite { index: 0 }));
    }

    #[test]
    fn decode_accepts_f32_extremes() {
        let batch =
            decode_batch_str(r#"{"players":[{"id":"p1","content":{"x":3.4e38,"y":-3.4e38,"z":0}}]}"#)
                .unwrap();
        assert!(batch.snapshots[0].position.is_finite());
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = decode_batch(&[0x7b, 0xff, 0xfe, 0x7d]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidUtf8(_)));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_batch(b"not json").is_err());
        assert!(decode_batch(b"").is_err());
    }

    #[test]
    fn encode_outbound_shape() {
        let snapshot = EntitySnapshot::new("me", Position::new(1.5, 0.0, -2.0));
        let json = encode_snapshot(&snapshot).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], "me");
        assert_eq!(value["content"]["x"], 1.5);
        assert_eq!(value["content"]["y"], 0.0);
        assert_eq!(value["content"]["z"], -2.0);
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn encode_rejects_nan() {
        let snapshot = EntitySnapshot::new("me", Position::new(f32::NAN, 0.0, 0.0));
        assert!(matches!(
            encode_snapshot(&snapshot),
            Err(EncodeError::NonFinite { .. })
        ));
    }

    proptest! {
        #[test]
        fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode_batch(&bytes);
        }

        #[test]
        fn encoded_snapshot_decodes_inside_batch(
            id in "[a-zA-Z0-9_-]{1,16}",
            x in -400_000i32..400_000,
            y in -400_000i32..400_000,
            z in -400_000i32..400_000,
        ) {
            // Quarter steps are exact in both f32 and decimal.
            let position = Position::new(x as f32 / 4.0, y as f32 / 4.0, z as f32 / 4.0);
            let snapshot = EntitySnapshot::new(id, position);
            let frame = format!(r#"{{"players":[{}]}}"#, encode_snapshot(&snapshot).unwrap());
            let batch = decode_batch_str(&frame).unwrap();
            prop_assert_eq!(&batch.snapshots[0], &snapshot);
        }
    }
}
