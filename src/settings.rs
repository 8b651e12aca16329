/// Knobs for the lenient corners of the format.
///
/// The defaults accept every resource shipped by the system while still rejecting anything that
/// is structurally broken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeSettings {
    lossy_text: bool,
    strict_state_names: bool,
}

impl DecodeSettings {
    pub fn new() -> Self {
        DecodeSettings::default()
    }

    /// Replace unpaired surrogates in state names with U+FFFD instead of failing.
    pub fn lossy_text(mut self, lossy_text: bool) -> Self {
        self.lossy_text = lossy_text;
        self
    }

    /// Fail (instead of logging a warning) when a keyboard type has a different number of state
    /// names than state records.
    pub fn strict_state_names(mut self, strict_state_names: bool) -> Self {
        self.strict_state_names = strict_state_names;
        self
    }

    pub fn should_decode_text_lossy(&self) -> bool {
        self.lossy_text
    }

    pub fn should_enforce_state_names(&self) -> bool {
        self.strict_state_names
    }
}
