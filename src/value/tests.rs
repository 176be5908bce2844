mod value_tests {
    use crate::builder::FlatBuilder;
    use crate::error::{FlatError, SchemaError};
    use crate::schema::{FieldDef, ScalarType, Schema, SchemaRegistry};
    use crate::value::*;
    use crate::view::TableView;
    use cbor4ii::core::Value as Cbor;
    use serde_json::json;

    const SCHEMAS: &str = r#"[
      { "name": "Monster", "file_identifier": "MONS", "fields": [
          { "name": "name", "type": "string", "required": true },
          { "name": "hp", "type": "short", "default": 100 },
          { "name": "mana", "type": "ushort", "default": 150 },
          { "name": "inventory", "type": { "vector": "ubyte" } },
          { "name": "pos", "type": { "table": "Vec3" } },
          { "name": "friendly", "type": "bool", "deprecated": true },
          { "name": "score", "type": "double" },
          { "name": "path", "type": { "vector": "int" } }
      ]},
      { "name": "Vec3", "fields": [
          { "name": "x", "type": "float" },
          { "name": "y", "type": "float" },
          { "name": "z", "type": "float" }
      ]}
    ]"#;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_json(SCHEMAS).unwrap()
    }

    fn encode_json(reg: &SchemaRegistry, value: serde_json::Value) -> Result<Vec<u8>, SchemaError> {
        let mut b = FlatBuilder::new();
        encode_value(&mut b, reg, "Monster", &value)?;
        Ok(b.into_bytes()?)
    }

    fn cbor_get<'a>(value: &'a Cbor, key: &str) -> Option<&'a Cbor> {
        let Cbor::Map(map) = value else { return None };
        map.iter()
            .find(|(k, _)| matches!(k, Cbor::Text(t) if t == key))
            .map(|(_, v)| v)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // JSON
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_json_roundtrip() {
        let reg = registry();
        let buf = encode_json(
            &reg,
            json!({
                "name": "Orc",
                "hp": 80,
                "inventory": [1, 2, 3],
                "pos": { "x": 1.0, "y": 2.5, "z": -3.0 },
                "score": 12.5,
                "path": [-1, 2]
            }),
        )
        .unwrap();

        let back: serde_json::Value = decode_value(&buf, &reg, "Monster").unwrap();
        assert_eq!(
            back,
            json!({
                "name": "Orc",
                "hp": 80,
                "mana": 150,
                "inventory": [1, 2, 3],
                "pos": { "x": 1.0, "y": 2.5, "z": -3.0 },
                "score": 12.5,
                "path": [-1, 2]
            })
        );
    }

    #[test]
    fn test_json_text_helpers() {
        let reg = registry();
        let buf = encode_json_str(&reg, "Monster", r#"{"name": "Imp", "mana": 3}"#).unwrap();
        let text = decode_to_json(&buf, &reg, "Monster").unwrap();
        let back: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, json!({ "name": "Imp", "hp": 100, "mana": 3, "score": 0.0 }));
    }

    #[test]
    fn test_default_values_are_not_written() {
        let reg = registry();
        let explicit = encode_json(&reg, json!({ "name": "Orc", "hp": 100, "mana": 150 })).unwrap();
        let omitted = encode_json(&reg, json!({ "name": "Orc" })).unwrap();
        assert_eq!(explicit, omitted);

        let view = TableView::root(&explicit, &reg, "Monster").unwrap();
        assert!(!view.is_present("hp").unwrap());
        assert!(view.is_present("name").unwrap());
    }

    #[test]
    fn test_null_member_is_absent() {
        let reg = registry();
        let with_null = encode_json(&reg, json!({ "name": "Orc", "pos": null })).unwrap();
        let without = encode_json(&reg, json!({ "name": "Orc" })).unwrap();
        assert_eq!(with_null, without);
    }

    #[test]
    fn test_file_identifier_written() {
        let reg = registry();
        let buf = encode_json(&reg, json!({ "name": "Orc" })).unwrap();
        assert_eq!(&buf[4..8], b"MONS");
    }

    #[test]
    fn test_deprecated_field_is_skipped() {
        let reg = registry();
        let buf = encode_json(&reg, json!({ "name": "Orc", "friendly": true })).unwrap();
        let view = TableView::root(&buf, &reg, "Monster").unwrap();
        assert!(!view.is_present("friendly").unwrap());

        let back: serde_json::Value = decode_value(&buf, &reg, "Monster").unwrap();
        assert!(back.get("friendly").is_none());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Errors
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_missing_required() {
        let reg = registry();
        let err = encode_json(&reg, json!({ "hp": 1 })).unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequired(name) if name == "name"));
    }

    #[test]
    fn test_unknown_member() {
        let reg = registry();
        let err = encode_json(&reg, json!({ "name": "Orc", "colour": "red" })).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { field, .. } if field == "colour"));
    }

    #[test]
    fn test_type_mismatch() {
        let reg = registry();
        for bad in [
            json!({ "name": "Orc", "hp": "lots" }),
            json!({ "name": "Orc", "hp": true }),
            json!({ "name": 7 }),
            json!({ "name": "Orc", "path": 3 }),
            json!({ "name": "Orc", "pos": [1, 2, 3] }),
        ] {
            let err = encode_json(&reg, bad.clone()).unwrap_err();
            assert!(matches!(err, SchemaError::TypeMismatch { .. }), "{bad}: {err}");
        }
        assert!(matches!(
            encode_json(&reg, json!(["not", "an", "object"])),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_value_out_of_range() {
        let reg = registry();
        for bad in [
            json!({ "name": "Orc", "hp": 40000 }),
            json!({ "name": "Orc", "mana": -1 }),
            json!({ "name": "Orc", "inventory": [1, 256] }),
            json!({ "name": "Orc", "path": [1.5] }),
            json!({ "name": "Orc", "pos": { "x": 1e300 } }),
        ] {
            let err = encode_json(&reg, bad.clone()).unwrap_err();
            assert!(matches!(err, SchemaError::ValueOutOfRange(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn test_unknown_nested_table() {
        let mut reg = SchemaRegistry::new();
        reg.register(registry().get("Monster").unwrap().clone());
        let err = encode_json(&reg, json!({ "name": "Orc", "pos": { "x": 1.0 } })).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTable(name) if name == "Vec3"));
    }

    #[test]
    fn test_decode_depth_limit() {
        let mut reg = SchemaRegistry::new();
        reg.register(
            Schema::new(
                "Node",
                vec![FieldDef::scalar("id", ScalarType::UInt), FieldDef::table("next", "Node")],
            )
            .unwrap(),
        );
        let chain = |len: u32| {
            let mut b = FlatBuilder::new();
            let mut next = None;
            for id in 0..len {
                b.start_object(2).unwrap();
                b.add_field(0, id, 0u32).unwrap();
                if let Some(next) = next {
                    b.add_offset_field(1, next).unwrap();
                }
                next = Some(b.end_object().unwrap());
            }
            b.finish(next.unwrap()).unwrap();
            b.into_bytes().unwrap()
        };

        // A chain far deeper than any encoder would produce.
        let deep = chain(5000);
        let err = decode_value::<serde_json::Value>(&deep, &reg, "Node").unwrap_err();
        assert!(matches!(err, SchemaError::Flat(FlatError::Nesting(_))), "{err}");
        assert!(matches!(
            decode_value::<Cbor>(&deep, &reg, "Node"),
            Err(SchemaError::Flat(FlatError::Nesting(_)))
        ));

        let short = chain(3);
        let back: serde_json::Value = decode_value(&short, &reg, "Node").unwrap();
        assert_eq!(back, json!({ "id": 2, "next": { "id": 1, "next": { "id": 0 } } }));

        let view = TableView::root(&short, &reg, "Node").unwrap();
        assert!(matches!(
            decode_table_with_depth::<serde_json::Value>(&view, 2),
            Err(SchemaError::Flat(FlatError::Nesting(_)))
        ));
        assert!(decode_table_with_depth::<serde_json::Value>(&view, 3).is_ok());
    }

    #[test]
    fn test_unknown_root_table() {
        let reg = registry();
        assert!(matches!(
            encode_json_str(&reg, "Dragon", "{}"),
            Err(SchemaError::UnknownTable(_))
        ));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CBOR
    // ═══════════════════════════════════════════════════════════════════════

    fn cbor_monster() -> Cbor {
        Cbor::Map(vec![
            (Cbor::Text("hp".into()), Cbor::Integer(-5)),
            (Cbor::Text("inventory".into()), Cbor::Bytes(vec![9, 8, 7])),
            (Cbor::Text("name".into()), Cbor::Text("Troll".into())),
            (
                Cbor::Text("pos".into()),
                Cbor::Map(vec![(Cbor::Text("y".into()), Cbor::Float(0.25))]),
            ),
        ])
    }

    #[test]
    fn test_cbor_roundtrip() {
        let reg = registry();
        let mut b = FlatBuilder::new();
        encode_value(&mut b, &reg, "Monster", &cbor_monster()).unwrap();
        let buf = b.into_bytes().unwrap();

        let back: Cbor = decode_value(&buf, &reg, "Monster").unwrap();
        assert_eq!(cbor_get(&back, "name"), Some(&Cbor::Text("Troll".into())));
        assert_eq!(cbor_get(&back, "hp"), Some(&Cbor::Integer(-5)));
        assert_eq!(cbor_get(&back, "mana"), Some(&Cbor::Integer(150)));
        assert_eq!(cbor_get(&back, "inventory"), Some(&Cbor::Bytes(vec![9, 8, 7])));
        let pos = cbor_get(&back, "pos").unwrap();
        assert_eq!(cbor_get(pos, "x"), Some(&Cbor::Float(0.0)));
        assert_eq!(cbor_get(pos, "y"), Some(&Cbor::Float(0.25)));
        assert_eq!(cbor_get(&back, "path"), None);
    }

    #[test]
    fn test_cbor_bytes_helpers() {
        let reg = registry();
        let mut input = Vec::new();
        cbor4ii::serde::to_writer(&mut input, &cbor_monster()).unwrap();

        let buf = encode_cbor_bytes(&reg, "Monster", &input).unwrap();
        let out = decode_to_cbor(&buf, &reg, "Monster").unwrap();
        let back: Cbor = cbor4ii::serde::from_slice(&out).unwrap();
        assert_eq!(cbor_get(&back, "name"), Some(&Cbor::Text("Troll".into())));

        // Same members in the same order through JSON give the same buffer.
        let via_json = encode_json(
            &reg,
            json!({ "name": "Troll", "hp": -5, "inventory": [9, 8, 7], "pos": { "y": 0.25 } }),
        )
        .unwrap();
        assert_eq!(buf, via_json);
    }

    #[test]
    fn test_cbor_decode_error() {
        let reg = registry();
        assert!(matches!(
            encode_cbor_bytes(&reg, "Monster", &[]),
            Err(SchemaError::CborError(_))
        ));
    }

    #[test]
    fn test_cbor_duplicate_keys_rejected() {
        let reg = registry();
        let text = |s: &str| Cbor::Text(s.into());
        let mut b = FlatBuilder::new();
        let value = Cbor::Map(vec![
            (text("name"), text("Troll")),
            (text("hp"), Cbor::Integer(5)),
            (text("name"), text("Ogre")),
        ]);
        assert!(matches!(
            encode_value(&mut b, &reg, "Monster", &value),
            Err(SchemaError::DuplicateField { table, field }) if table == "Monster" && field == "name"
        ));

        // A repeated key in a nested table, even when one copy is null.
        let mut b = FlatBuilder::new();
        let value = Cbor::Map(vec![
            (text("name"), text("Troll")),
            (
                text("pos"),
                Cbor::Map(vec![(text("x"), Cbor::Null), (text("x"), Cbor::Float(1.0))]),
            ),
        ]);
        assert!(matches!(
            encode_value(&mut b, &reg, "Monster", &value),
            Err(SchemaError::DuplicateField { table, .. }) if table == "Vec3"
        ));
    }

    #[test]
    fn test_cbor_non_text_keys_rejected() {
        let reg = registry();
        let value = Cbor::Map(vec![(Cbor::Integer(1), Cbor::Text("x".into()))]);
        let mut b = FlatBuilder::new();
        assert!(matches!(
            encode_value(&mut b, &reg, "Monster", &value),
            Err(SchemaError::TypeMismatch { .. })
        ));
    }
}
