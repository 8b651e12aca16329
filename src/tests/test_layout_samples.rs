use super::fixtures::*;
use crate::{
    DecodeError, DecodeSettings, KeyStroke, KeyboardLayoutBundle, LayoutResource, Resolution,
    ResolveError, ensure_env_logger_initialized,
};
use pretty_assertions::assert_eq;

const ACUTE: u16 = 0x4000;
const CIRCUMFLEX: u16 = 0x4001;

/// Key codes 0..=3 produce `a`, `e`, acute dead key, circumflex dead key. Modifier code 2
/// selects an upper case table.
fn accented_keyboard() -> KeyboardTypeSpec {
    let mut spec = KeyboardTypeSpec::single_table(&[0x61, 0x65, ACUTE, CIRCUMFLEX]);
    spec.tables.push(vec![0x41, 0x45, ACUTE, CIRCUMFLEX]);
    spec.modifier_indices = vec![0, 0, 1];
    spec.states(vec![
        StateRecordSpec::with_transitions(0xB4, &[(0x61, 0xE1), (0x65, 0xE9), (0x45, 0xC9)]),
        StateRecordSpec::with_transitions(0x5E, &[(0x61, 0xE2), (0x65, 0xEA)]),
    ])
    .terminators(&[0xB4, 0x5E])
    .state_names(&["acute", "circumflex"])
}

#[test]
fn test_composes_accents_across_modifiers() {
    ensure_env_logger_initialized();
    let data = build_layout(&[accented_keyboard()], true);
    let resource = LayoutResource::decode(&data).unwrap();
    let keyboard = resource.keyboard_type_for(0).unwrap();

    let compose = |strokes: &[(u16, u8)]| {
        let mut strokes = strokes.iter().map(|&(k, m)| KeyStroke::new(k, m));
        let first = strokes.next().unwrap();
        keyboard.resolve(first, strokes).unwrap()
    };

    assert_eq!(compose(&[(2, 0), (1, 0)]).output.as_char(), Some('é'));
    assert_eq!(compose(&[(2, 0), (1, 2)]).output.as_char(), Some('É'));
    assert_eq!(compose(&[(3, 0), (0, 0)]).output.as_char(), Some('â'));
    // no upper case transition for `A` under the acute state
    assert_eq!(compose(&[(2, 2), (0, 2)]).output.as_char(), Some('´'));

    assert_eq!(keyboard.state_name(1), Some("circumflex"));
    assert_eq!(
        keyboard.state_terminators.as_ref().unwrap().terminators,
        vec![0xB4, 0x5E]
    );
}

#[test]
fn test_layout_inside_container_resolves_like_standalone() {
    ensure_env_logger_initialized();
    let resource = build_layout(&[accented_keyboard()], false);
    let container = build_container(&[
        NamedLayoutSpec::new("Plain", 1, build_layout(&[KeyboardTypeSpec::single_table(&[0x78])], false)),
        NamedLayoutSpec::new("Accents", 2, resource.clone()),
    ]);

    let bundle = KeyboardLayoutBundle::parse(&container).unwrap();
    let embedded = &bundle.layout("Accents").unwrap().resource;
    assert_eq!(embedded, &LayoutResource::decode(&resource).unwrap());

    let keyboard = &embedded.entries[0];
    assert_eq!(
        keyboard
            .resolve(KeyStroke::new(3, 0), [KeyStroke::new(1, 0)])
            .unwrap()
            .output,
        Resolution::Literal(0xEA)
    );
}

#[test]
fn test_follow_up_key_out_of_range_fails_the_composition() {
    let data = build_layout(&[accented_keyboard()], false);
    let resource = LayoutResource::decode(&data).unwrap();
    let keyboard = &resource.entries[0];

    assert_eq!(
        keyboard.resolve(KeyStroke::new(2, 0), [KeyStroke::new(4, 0)]),
        Err(ResolveError::KeyCodeOutOfRange {
            key_code: 4,
            code_count: 4
        })
    );
}

#[test]
fn test_strict_settings_reject_missing_state_names_in_container() {
    let spec = accented_keyboard().state_names(&["acute"]);
    let container = build_container(&[NamedLayoutSpec::new(
        "Accents",
        2,
        build_layout(&[spec], false),
    )]);

    assert!(KeyboardLayoutBundle::parse(&container).is_ok());

    let strict = DecodeSettings::new().strict_state_names(true);
    assert!(matches!(
        KeyboardLayoutBundle::parse_with_settings(&container, &strict),
        Err(DecodeError::StateNamesMismatch {
            index: 0,
            records: 2,
            names: 1
        })
    ));
}
