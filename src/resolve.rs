//! Turning key strokes into output using a decoded [`KeyboardType`].
//!
//! Code table entries (and state record outputs/targets) are 16-bit tagged values; the top two
//! bits select the interpretation, see [`KeyValue::classify`]. Dead-key values start a
//! composition which pulls further strokes until it settles on a literal or an action.

use hashbrown::HashSet;
use log::trace;
use serde::Serialize;

use crate::err::ResolveError;
use crate::layout::{KeyboardType, StateRecord};

const TAG_SHIFT: u16 = 14;
const INDEX_MASK: u16 = 0x3FFF;

/// A classified 16-bit code table value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeyValue {
    /// Tags `0` and `3`: the value itself is the code point (tag bits included).
    Literal(u16),
    /// Tag `1`: index into the state index.
    DeadKey(u16),
    /// Tag `2`: opaque action marker, not resolved any further.
    SpecialAction(u16),
}

impl KeyValue {
    pub fn classify(raw: u16) -> Self {
        match raw >> TAG_SHIFT {
            1 => KeyValue::DeadKey(raw & INDEX_MASK),
            2 => KeyValue::SpecialAction(raw & INDEX_MASK),
            _ => KeyValue::Literal(raw),
        }
    }
}

/// What a key (sequence) finally produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Resolution {
    Literal(u16),
    Action(u16),
}

impl Resolution {
    /// The literal as a `char`; `None` for actions and lone surrogates.
    pub fn as_char(&self) -> Option<char> {
        match *self {
            Resolution::Literal(cp) => char::from_u32(u32::from(cp)),
            Resolution::Action(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyStroke {
    pub key_code: u16,
    /// Modifier combination code, as used to index the modifier table.
    pub modifiers: u8,
}

impl KeyStroke {
    pub fn new(key_code: u16, modifiers: u8) -> Self {
        KeyStroke {
            key_code,
            modifiers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub output: Resolution,
    /// Number of strokes used, including the first one.
    pub consumed: usize,
}

impl KeyboardType {
    /// The raw tagged value `stroke` maps to, before classification.
    pub fn raw_value(&self, stroke: KeyStroke) -> Result<u16, ResolveError> {
        let table_index = self.modifier_table.table_index(stroke.modifiers);
        let table =
            self.code_table
                .table(table_index)
                .ok_or(ResolveError::CodeTableOutOfRange {
                    table_index,
                    table_count: self.code_table.tables.len(),
                })?;

        table
            .get(usize::from(stroke.key_code))
            .copied()
            .ok_or(ResolveError::KeyCodeOutOfRange {
                key_code: stroke.key_code,
                code_count: self.code_table.code_count,
            })
    }

    /// Resolve a single stroke. A dead key without a follow-up yields its default output.
    pub fn resolve_key(&self, stroke: KeyStroke) -> Result<Resolution, ResolveError> {
        self.resolve(stroke, None::<KeyStroke>).map(|c| c.output)
    }

    /// Resolve `first`, pulling strokes from `rest` only while a dead-key state needs one.
    pub fn resolve<I>(&self, first: KeyStroke, rest: I) -> Result<Composition, ResolveError>
    where
        I: IntoIterator<Item = KeyStroke>,
    {
        let raw = self.raw_value(first)?;
        self.compose(raw, rest).map(|mut c| {
            c.consumed += 1;
            c
        })
    }

    /// Resolve a tagged value directly; `consumed` counts only strokes taken from `rest`.
    pub fn resolve_value<I>(&self, raw: u16, rest: I) -> Result<Composition, ResolveError>
    where
        I: IntoIterator<Item = KeyStroke>,
    {
        self.compose(raw, rest)
    }

    fn compose<I>(&self, mut raw: u16, rest: I) -> Result<Composition, ResolveError>
    where
        I: IntoIterator<Item = KeyStroke>,
    {
        let mut rest = rest.into_iter().fuse();
        let mut visited = HashSet::new();
        let mut consumed = 0;

        loop {
            let state = match KeyValue::classify(raw) {
                KeyValue::Literal(cp) => {
                    return Ok(Composition {
                        output: Resolution::Literal(cp),
                        consumed,
                    });
                }
                KeyValue::SpecialAction(marker) => {
                    return Ok(Composition {
                        output: Resolution::Action(marker),
                        consumed,
                    });
                }
                KeyValue::DeadKey(state) => state,
            };

            let record = self.enter_state(state, &mut visited)?;
            raw = match rest.next() {
                Some(stroke) => {
                    consumed += 1;
                    let trigger = self.raw_value(stroke)?;
                    trace!("state {}: trigger {:#06x}", state, trigger);
                    self.transition(record, trigger, &mut visited)?
                }
                None => record.default_output,
            };
        }
    }

    /// Follow `record` (and its fallback chain) for `trigger`, returning the next tagged value.
    fn transition<'a>(
        &'a self,
        mut record: &'a StateRecord,
        trigger: u16,
        visited: &mut HashSet<u16>,
    ) -> Result<u16, ResolveError> {
        loop {
            if let Some(target) = record.target_for(trigger) {
                return Ok(target);
            }
            if record.fallback_state == 0 {
                return Ok(record.default_output);
            }
            trace!("no transition, falling back to state {}", record.fallback_state);
            record = self.enter_state(record.fallback_state, visited)?;
        }
    }

    fn enter_state(
        &self,
        index: u16,
        visited: &mut HashSet<u16>,
    ) -> Result<&StateRecord, ResolveError> {
        let states = self
            .state_index
            .as_ref()
            .ok_or(ResolveError::MissingStateIndex { index })?;
        let record = states.get(index).ok_or(ResolveError::StateIndexOutOfRange {
            index,
            len: states.len(),
        })?;
        if !visited.insert(index) {
            return Err(ResolveError::CompositionCycle { state: index });
        }
        Ok(record)
    }
}
