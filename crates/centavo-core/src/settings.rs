//! Settings overlay: the singleton configuration object.
//!
//! Unlike record collections, the settings file holds one JSON object with
//! read-full / update-one-key semantics. Built-in defaults seed the file on
//! first access only — keys added to the defaults later are NOT merged into
//! an existing file. Callers that need forward compatibility resolve
//! defaults per key at the read site (see [`crate::json_ext`]).

use crate::store::Store;
use serde_json::{Map, Value, json};

/// A settings object: JSON map from setting name to value.
pub type Settings = Map<String, Value>;

/// Monthly budget, in minor-free currency units. Zero means "not set".
pub const SETTING_MONTHLY_BUDGET: &str = "presupuesto_mensual";

/// Display currency code.
pub const SETTING_CURRENCY: &str = "moneda";

/// IANA timezone name used for all period calculations.
pub const SETTING_TIMEZONE: &str = "timezone";

pub const DEFAULT_CURRENCY: &str = "COP";
pub const DEFAULT_TIMEZONE: &str = "America/Bogota";

/// The built-in defaults written when no settings file exists yet.
pub fn default_settings() -> Settings {
    let mut settings = Settings::new();
    settings.insert(SETTING_MONTHLY_BUDGET.to_string(), json!(0));
    settings.insert(SETTING_CURRENCY.to_string(), json!(DEFAULT_CURRENCY));
    settings.insert(SETTING_TIMEZONE.to_string(), json!(DEFAULT_TIMEZONE));
    settings
}

impl Store {
    /// The full settings object.
    ///
    /// Creates the settings file with [`default_settings`] if absent.
    /// Corrupted or non-object content goes through the usual recovery path
    /// and yields the defaults.
    pub fn settings(&self) -> Settings {
        self.load(&self.settings_path(), default_settings())
    }

    /// Set one key and persist the full object.
    ///
    /// Returns the updated settings on success, `None` when the save failed
    /// (the caller must treat that as "not persisted"). Two concurrent
    /// updates of different keys are serialized by the exclusive lock but
    /// the read-then-write is not one atomic transaction across callers —
    /// the later writer can overwrite the earlier one's key. Accepted
    /// lost-update hazard at this scale.
    pub fn update_setting(&self, key: &str, value: Value) -> Option<Settings> {
        let mut settings = self.settings();
        settings.insert(key.to_string(), value);
        if self.save(&self.settings_path(), &settings) {
            Some(settings)
        } else {
            None
        }
    }
}
