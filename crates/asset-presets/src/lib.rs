//! Built-in bundler presets
//!
//! A preset is a named set of default webpack configuration fragments
//! tailored to one project archetype (browser app, UMD library, Vue
//! library, PWA, node CLI, node library). The host project's own
//! configuration is merged on top of these fragments.
//!
//! Fragments are plain JSON. Values JSON cannot express (regular
//! expressions, plugin instances, module references) are written as
//! descriptors, see [`descriptor`].

pub mod descriptor;
mod presets;
mod registry;

pub use descriptor::{is_descriptor, module_export, module_ref, plugin, plugin_export, regex};
pub use registry::{ConfigFragments, Preset, PresetError, PresetRegistry, PRESET_NAMES};
