
use fixtures::*;

use pretty_assertions::assert_eq;
use uchr::{
    DecodeError, DecodeSettings, KeyStroke, KeyValue, KeyboardLayoutBundle, LayoutResource,
    Resolution,
};

#[test]
fn test_lists_layouts_from_file() {
    ensure_env_logger_initialized();
    let file = write_sample(&sample_container());
    let data = std::fs::read(sample_path(&file)).unwrap();

    let bundle = KeyboardLayoutBundle::parse(&data).unwrap();
    assert_eq!(bundle.names().collect::<Vec<_>>(), vec!["U.S.", "Accents"]);

    let accents = bundle.layout("Accents").unwrap();
    assert_eq!(accents.number, 16300);
    assert_eq!(accents.resource.entries.len(), 1);
    assert_eq!(
        accents.resource.feature_info.as_ref().unwrap().max_output_string_length,
        1
    );
}

#[test]
fn test_resolves_keys_in_embedded_layout() {
    ensure_env_logger_initialized();
    let data = sample_container();
    let bundle = KeyboardLayoutBundle::parse(&data).unwrap();
    let keyboard = bundle
        .layout("Accents")
        .unwrap()
        .resource
        .keyboard_type_for(0)
        .unwrap();

    assert_eq!(
        keyboard.resolve_key(KeyStroke::new(50, 0)).unwrap().as_char(),
        Some('`')
    );
    assert_eq!(
        keyboard.resolve_key(KeyStroke::new(3, 0)).unwrap(),
        Resolution::Action(3)
    );

    let composed = keyboard
        .resolve(
            KeyStroke::new(2, 0),
            [KeyStroke::new(1, 0), KeyStroke::new(0, 0)],
        )
        .unwrap();
    assert_eq!(composed.output.as_char(), Some('é'));
    assert_eq!(composed.consumed, 2);

    assert_eq!(
        keyboard
            .resolve(KeyStroke::new(2, 0), [KeyStroke::new(50, 0)])
            .unwrap()
            .output
            .as_char(),
        Some('´')
    );
    assert_eq!(keyboard.state_name(0), Some("acute"));
}

#[test]
fn test_classifies_code_table_values() {
    let data = sample_container();
    let bundle = KeyboardLayoutBundle::parse(&data).unwrap();
    let keyboard = &bundle.layout("Accents").unwrap().resource.entries[0];

    let values: Vec<KeyValue> = (0..4)
        .map(|code| KeyValue::classify(keyboard.raw_value(KeyStroke::new(code, 0)).unwrap()))
        .collect();

    assert_eq!(
        values,
        vec![
            KeyValue::Literal(0x61),
            KeyValue::Literal(0x65),
            KeyValue::DeadKey(0),
            KeyValue::SpecialAction(3),
        ]
    );
}

#[test]
fn test_truncated_file_reports_offset() {
    let data = sample_container();
    let err = KeyboardLayoutBundle::parse(&data[..data.len() - 4]).unwrap_err();
    assert!(err.offset().is_some(), "{err}");
}

#[test]
fn test_standalone_resource_with_lossy_state_names() {
    // one entry, code table with a single literal, state names holding an unpaired surrogate
    let spec = KeyboardTypeSpec::single_table(&[0x41]);
    let mut data = build_layout(&[spec], false);

    let names_offset = data.len();
    for unit in [0x6001u16, 1, 6, 0xD800, 0x0041] {
        data.extend_from_slice(&unit.to_le_bytes());
    }
    // state names offset of entry 0
    data[12 + 24..12 + 28].copy_from_slice(&(names_offset as u32).to_le_bytes());

    assert!(matches!(
        LayoutResource::decode(&data),
        Err(DecodeError::InvalidText { .. })
    ));

    let resource =
        LayoutResource::decode_with_settings(&data, &DecodeSettings::new().lossy_text(true))
            .unwrap();
    assert_eq!(resource.entries[0].state_name(0), Some("\u{FFFD}A"));
}
