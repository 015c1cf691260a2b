#![allow(missing_docs)]

use std::sync::Arc;
use std::thread;
use tagcode::{ByteBuf, DecodeError, Tagcode, TagcodeError, WireEntity, WireShape};

#[derive(Debug, Clone, PartialEq, WireEntity)]
struct Sample {
    #[wire(index = 0)]
    id: u64,
    #[wire(index = 1)]
    label: String,
    #[wire(index = 2)]
    readings: Vec<f64>,
    #[wire(index = 4)]
    payload: ByteBuf,
    #[wire(index = 6)]
    origin: Option<Station>,
}

#[derive(Debug, Clone, PartialEq, WireEntity)]
struct Station {
    #[wire(index = 0)]
    code: String,
    #[wire(index = 1)]
    elevation: i16,
}

fn sample(id: u64) -> Sample {
    Sample {
        id,
        label: format!("sample-{id}"),
        readings: (0..id % 7).map(|i| i as f64 * 0.5).collect(),
        payload: ByteBuf(vec![id as u8; (id % 5) as usize]),
        origin: (id % 2 == 0).then(|| Station {
            code: "ZRH".into(),
            elevation: -12,
        }),
    }
}

fn codec() -> Tagcode {
    let mut codec = Tagcode::new();
    codec.register::<Sample>().expect("register");
    codec
}

// --- TESTS ---

/// Registering the root type pulls in every entity it references.
#[test]
fn test_register_discovers_nested_entities() -> tagcode::Result<()> {
    let codec = codec();
    assert_eq!(codec.registry().len(), 2);
    let station = codec.schema("Station")?;
    assert_eq!(station.fingerprint(), codec.schema("Station")?.fingerprint());
    Ok(())
}

#[test]
fn test_typed_round_trip() -> tagcode::Result<()> {
    let codec = codec();
    for id in [0, 1, 2, 9, 10] {
        let value = sample(id);
        let bytes = codec.to_bytes(&value)?;
        assert_eq!(codec.from_bytes::<Sample>(&bytes)?, value);
    }
    Ok(())
}

#[test]
fn test_unregistered_type_is_reported() {
    let codec = Tagcode::new();
    assert!(matches!(
        codec.to_bytes(&sample(1)),
        Err(TagcodeError::Schema(tagcode::SchemaError::UnknownEntity(ref name))) if name == "Sample"
    ));
}

#[test]
fn test_batch_matches_sequential() -> tagcode::Result<()> {
    let codec = codec();
    let values: Vec<Sample> = (0..256).map(sample).collect();

    let encoded = codec.to_bytes_batch(&values)?;
    for (value, bytes) in values.iter().zip(&encoded) {
        assert_eq!(&codec.to_bytes(value)?, bytes);
    }
    let decoded: Vec<Sample> = codec.from_bytes_batch(&encoded)?;
    assert_eq!(decoded, values);
    Ok(())
}

#[test]
fn test_dynamic_batch_keeps_per_item_errors() -> tagcode::Result<()> {
    let codec = codec();
    let schema = codec.schema("Sample")?;
    let streams = vec![codec.to_bytes(&sample(3))?, vec![0x00], codec.to_bytes(&sample(4))?];

    let results = codec.decode_batch(&streams, schema);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(TagcodeError::Decode(DecodeError::UnexpectedEof { .. }))
    ));
    assert_eq!(results[2].as_ref().map(|i| i.len()), Ok(5));

    let instances: Vec<_> = results.into_iter().filter_map(|r| r.ok()).collect();
    let reencoded = codec.encode_batch(&instances, schema);
    assert!(reencoded.iter().all(|r| r.is_ok()));
    Ok(())
}

#[test]
fn test_shared_across_threads() {
    let codec = Arc::new(codec());
    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                for id in (t * 50)..(t * 50 + 50) {
                    let value = sample(id);
                    let bytes = codec.to_bytes(&value).expect("encode");
                    assert_eq!(codec.from_bytes::<Sample>(&bytes).expect("decode"), value);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker");
    }
}

#[test]
fn test_inspect_report() -> tagcode::Result<()> {
    let codec = codec();
    let bytes = codec.to_bytes(&sample(2))?;
    let report = codec.inspect(&bytes, codec.schema("Sample")?)?;

    assert_eq!(report.total_bytes, bytes.len());
    let indices: Vec<u32> = report.fields.iter().map(|f| f.index).collect();
    assert_eq!(indices, [0, 1, 2, 4, 6]);

    let origin = &report.fields[4];
    assert_eq!(origin.shape, WireShape::OptLen);
    assert_eq!(origin.present, Some(true));
    let station = origin.nested.as_ref().expect("nested report");
    assert_eq!(station.entity, "Station");
    assert_eq!(station.fields.len(), 2);

    let json = serde_json::to_string(&report).expect("json");
    assert!(json.contains("\"Station\""));
    Ok(())
}

#[test]
fn test_builder_limits_apply() {
    let mut codec = Tagcode::builder().max_depth(1).build();
    codec.register::<Sample>().expect("register");
    assert!(matches!(
        codec.to_bytes(&sample(2)),
        Err(TagcodeError::Encode(tagcode::EncodeError::DepthExceeded { limit: 1 }))
    ));
    // No nested entity present, so one level is enough.
    assert!(codec.to_bytes(&sample(1)).is_ok());
}
