// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Persistence tests: models survive save/load with bit-identical outputs,
//! and bad documents fail without producing a model.

use layer_graph::layers::{Coordinatewise, Operation, Sum};
use layer_graph::{
    Activations, Coordinate, CoordinateIterator, Layer, LayerError, LayerRegistry, Model,
    RecordReader, RecordWriter, RegisteredLayer,
};

// ── Helpers ────────────────────────────────────────────────────

/// Input(4) → scale → shift → skip-connected sum over both and the input.
fn sample_model() -> Model {
    let mut model = Model::with_input_size(4);
    let scaled = model
        .add_layer(Box::new(
            Coordinatewise::new(
                Operation::Multiply,
                vec![0.1, -2.5, 3.0e-7, 1.0 / 3.0],
                Coordinate::range(0, 4),
            )
            .unwrap(),
        ))
        .unwrap();
    let shifted = model
        .add_layer(Box::new(
            Coordinatewise::new(
                Operation::Add,
                vec![0.7, 1e10, -0.3],
                vec![
                    Coordinate::new(scaled, 3),
                    Coordinate::new(scaled, 0),
                    Coordinate::new(0, 2),
                ],
            )
            .unwrap(),
        ))
        .unwrap();
    model
        .add_layer(Box::new(Sum::new(vec![
            vec![Coordinate::new(shifted, 0), Coordinate::new(scaled, 1)],
            vec![
                Coordinate::new(shifted, 1),
                Coordinate::new(shifted, 2),
                Coordinate::new(0, 3),
            ],
        ])))
        .unwrap();
    model
}

fn all_coordinates(model: &Model) -> Vec<Coordinate> {
    (0..model.num_layers())
        .flat_map(|i| Coordinate::range(i, model.layer_size(i).unwrap()))
        .collect()
}

// ── Round-trip ─────────────────────────────────────────────────

#[test]
fn test_roundtrip_outputs_bit_identical() {
    let model = sample_model();
    let restored = Model::from_json(&model.to_json().unwrap()).unwrap();

    let coords = all_coordinates(&model);
    assert_eq!(coords, all_coordinates(&restored));

    for features in [
        vec![1.0, 2.0, 3.0, 4.0],
        vec![-0.1, 1e-300, f64::MAX / 4.0, 0.3],
        vec![7.0],
    ] {
        let expected = model.compute(&features, &coords).unwrap();
        let actual = restored.compute(&features, &coords).unwrap();
        let expected_bits: Vec<u64> = expected.iter().map(|v| v.to_bits()).collect();
        let actual_bits: Vec<u64> = actual.iter().map(|v| v.to_bits()).collect();
        assert_eq!(expected_bits, actual_bits);
    }
}

#[test]
fn test_pretty_and_compact_agree() {
    let model = sample_model();
    let a = Model::from_json(&model.to_json().unwrap()).unwrap();
    let b = Model::from_json(&model.to_json_pretty().unwrap()).unwrap();
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let model = sample_model();
    model.save(&path).unwrap();
    let restored = Model::from_file(&path).unwrap();

    assert_eq!(restored.to_json().unwrap(), model.to_json().unwrap());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Model::from_file(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(LayerError::Io(_))));
}

// ── Failure atomicity ──────────────────────────────────────────

#[test]
fn test_unknown_layer_version_fails_whole_load() {
    let model = sample_model();
    let mut doc: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
    doc["layers"][2]["version"] = serde_json::json!(99);

    let result = Model::from_json(&doc.to_string());
    assert!(matches!(
        result,
        Err(LayerError::UnsupportedVersion { ref layer_type, version: 99 }) if layer_type == "Coordinatewise"
    ));
}

#[test]
fn test_unknown_input_version_fails() {
    let json = r#"{ "format_version": 1, "layers": [{ "type": "Input", "version": 0, "size": 1 }] }"#;
    assert!(matches!(
        Model::from_json(json),
        Err(LayerError::UnsupportedVersion { version: 0, .. })
    ));
}

#[test]
fn test_unknown_layer_type_fails() {
    let json = r#"{
        "format_version": 1,
        "layers": [
            { "type": "Input", "version": 1, "size": 1 },
            { "type": "Convolution", "version": 1 }
        ]
    }"#;
    assert!(matches!(
        Model::from_json(json),
        Err(LayerError::UnknownLayerType(name)) if name == "Convolution"
    ));
}

#[test]
fn test_coordinate_beyond_element_range_fails() {
    let json = r#"{
        "format_version": 1,
        "layers": [
            { "type": "Input", "version": 1, "size": 2 },
            { "type": "Sum", "version": 1,
              "coordinates": [[{ "layer_index": 0, "element_index": 2 }]] }
        ]
    }"#;
    assert!(matches!(
        Model::from_json(json),
        Err(LayerError::IndexOutOfRange { what: "coordinate element", index: 2, bound: 2 })
    ));
}

#[test]
fn test_missing_field_fails() {
    let json = r#"{
        "format_version": 1,
        "layers": [
            { "type": "Input", "version": 1, "size": 2 },
            { "type": "Coordinatewise", "version": 1, "operation": "add", "values": [1.0] }
        ]
    }"#;
    assert!(matches!(
        Model::from_json(json),
        Err(LayerError::MissingField { field }) if field == "coordinates"
    ));
}

#[test]
fn test_malformed_json_fails() {
    assert!(matches!(Model::from_json("{ not json"), Err(LayerError::Json(_))));
}

// ── Custom registry ────────────────────────────────────────────

/// Test-only layer: clamps each input to `[0, ceiling]`. Version 2 added the
/// ceiling; version 1 records imply a ceiling of 1.0.
#[derive(Debug)]
struct Clamp {
    ceiling: f64,
    coordinates: Vec<Coordinate>,
}

impl Layer for Clamp {
    fn size(&self) -> usize {
        self.coordinates.len()
    }

    fn compute(&self, inputs: &Activations<'_>, outputs: &mut [f64]) -> Result<(), LayerError> {
        for (out, &c) in outputs.iter_mut().zip(&self.coordinates) {
            *out = inputs.value(c)?.clamp(0.0, self.ceiling);
        }
        Ok(())
    }

    fn input_coordinates(&self, index: usize) -> Result<CoordinateIterator<'_>, LayerError> {
        let c = self.coordinates.get(index).copied().ok_or(LayerError::IndexOutOfRange {
            what: "element",
            index,
            bound: self.coordinates.len(),
        })?;
        Ok(Box::new(std::iter::once(c)))
    }

    fn runtime_type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn write(&self, writer: &mut RecordWriter) -> Result<(), LayerError> {
        writer.write_version(Self::CURRENT_VERSION)?;
        writer.write("ceiling", &self.ceiling)?;
        writer.write("coordinates", &self.coordinates)
    }
}

impl RegisteredLayer for Clamp {
    const TYPE_NAME: &'static str = "Clamp";
    const CURRENT_VERSION: u32 = 2;

    fn read(reader: &RecordReader) -> Result<Self, LayerError> {
        match reader.read_version()? {
            1 => Ok(Self {
                ceiling: 1.0,
                coordinates: reader.read("coordinates")?,
            }),
            2 => Ok(Self {
                ceiling: reader.read("ceiling")?,
                coordinates: reader.read("coordinates")?,
            }),
            version => Err(LayerError::UnsupportedVersion {
                layer_type: Self::TYPE_NAME.into(),
                version,
            }),
        }
    }
}

fn clamp_registry() -> LayerRegistry {
    let mut registry = LayerRegistry::with_builtin_layers();
    registry.register::<Clamp>();
    registry
}

#[test]
fn test_custom_layer_roundtrip() {
    let mut model = Model::with_input_size(2);
    let clamp = model
        .add_layer(Box::new(Clamp {
            ceiling: 5.0,
            coordinates: Coordinate::range(0, 2),
        }))
        .unwrap();
    model
        .add_layer(Box::new(Sum::single(Coordinate::range(clamp, 2))))
        .unwrap();

    let json = model.to_json().unwrap();

    // The global registry only knows the built-ins.
    assert!(matches!(
        Model::from_json(&json),
        Err(LayerError::UnknownLayerType(name)) if name == "Clamp"
    ));

    let restored = Model::from_json_with(&json, &clamp_registry()).unwrap();
    let out = restored.compute(&[-3.0, 9.0], &restored.output_coordinates()).unwrap();
    assert_eq!(out, vec![5.0]);
}

#[test]
fn test_custom_layer_reads_old_version() {
    let json = r#"{
        "format_version": 1,
        "layers": [
            { "type": "Input", "version": 1, "size": 1 },
            { "type": "Clamp", "version": 1,
              "coordinates": [{ "layer_index": 0, "element_index": 0 }] }
        ]
    }"#;
    let model = Model::from_json_with(json, &clamp_registry()).unwrap();
    assert_eq!(model.compute(&[4.0], &[Coordinate::new(1, 0)]).unwrap(), vec![1.0]);
}
