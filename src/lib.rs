//! Decoder for keyboard layout resources: the `uchr` tables that map physical key codes and
//! modifier combinations to Unicode output, including multi-step dead-key composition.
//!
//! ```no_run
//! use uchr::{KeyStroke, KeyboardLayoutBundle};
//!
//! let data = std::fs::read("AppleKeyboardLayouts-L.dat").unwrap();
//! let bundle = KeyboardLayoutBundle::parse(&data).unwrap();
//! let dvorak = bundle.layout("Dvorak").unwrap();
//! let keyboard = &dvorak.resource.entries[0];
//! println!("{:?}", keyboard.resolve_key(KeyStroke::new(0, 0)).unwrap().as_char());
//! ```

#![deny(unused_must_use)]

pub mod err;
pub mod layout;

mod container;
mod resolve;
mod settings;
mod utils;

pub use crate::container::{
    CONTAINER_MAGIC, DIRECTORY_ENTRY_SIZE, KeyboardLayoutBundle, NamedLayout,
};
pub use crate::err::{DecodeError, ResolveError};
pub use crate::layout::{KeyboardType, LayoutResource};
pub use crate::resolve::{Composition, KeyStroke, KeyValue, Resolution};
pub use crate::settings::DecodeSettings;

#[cfg(test)]
mod tests;

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;
    use std::sync::Once;

    static LOGGER_INIT: Once = Once::new();

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .init();
    });
}
