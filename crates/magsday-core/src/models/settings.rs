//! Per-identity user settings model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{DocumentSnapshot, Fields};
use crate::util::format_grouped;

/// Theme options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// Display currency. Amounts are stored without a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    #[serde(rename = "NGN")]
    Ngn,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    pub const ALL: [Self; 4] = [Self::Ngn, Self::Gbp, Self::Usd, Self::Eur];

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Ngn => "NGN",
            Self::Gbp => "GBP",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ngn => "₦",
            Self::Gbp => "£",
            Self::Usd => "$",
            Self::Eur => "€",
        }
    }

    /// Format an amount for display, e.g. `₦12,500.00`.
    #[must_use]
    pub fn format(self, amount: f64) -> String {
        format!("{}{}", self.symbol(), format_grouped(amount))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|currency| currency.code() == code)
            .ok_or_else(|| format!("unknown currency '{code}'"))
    }
}

/// Settings document for one identity.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserSettings {
    pub theme: Theme,
    pub currency: Currency,
    /// Secret guarding locked notes; `None` disables the lock gate
    pub note_pin: Option<String>,
}

impl fmt::Debug for UserSettings {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserSettings")
            .field("theme", &self.theme)
            .field("currency", &self.currency)
            .field("note_pin", &self.note_pin.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl UserSettings {
    /// Decode a document snapshot; absent settings are the defaults (dark, NGN, no PIN).
    #[must_use]
    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Self {
        match snapshot {
            DocumentSnapshot::Exists(fields) => Self::from_fields(fields),
            DocumentSnapshot::Absent => Self::default(),
        }
    }

    /// Lenient field decoding. An empty PIN counts as no PIN; numeric PINs are accepted.
    #[must_use]
    pub fn from_fields(fields: &Fields) -> Self {
        let theme = fields
            .get("theme")
            .and_then(Value::as_str)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let currency = fields
            .get("currency")
            .and_then(Value::as_str)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let note_pin = match fields.get("notePin") {
            Some(Value::String(pin)) if !pin.is_empty() => Some(pin.clone()),
            Some(Value::Number(pin)) => Some(pin.to_string()),
            _ => None,
        };

        Self {
            theme,
            currency,
            note_pin,
        }
    }

    #[must_use]
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(
            "theme".to_string(),
            Value::String(self.theme.as_str().to_string()),
        );
        fields.insert(
            "currency".to_string(),
            Value::String(self.currency.code().to_string()),
        );
        fields.insert(
            "notePin".to_string(),
            self.note_pin
                .clone()
                .map_or(Value::Null, Value::String),
        );
        fields
    }

    #[must_use]
    pub const fn has_pin(&self) -> bool {
        self.note_pin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            _ => unreachable!(),
        }
    }

    #[test]
    fn absent_settings_default_to_dark_ngn_without_pin() {
        let settings = UserSettings::from_snapshot(&DocumentSnapshot::Absent);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.currency, Currency::Ngn);
        assert_eq!(settings.note_pin, None);
    }

    #[test]
    fn settings_decode_known_values() {
        let settings = UserSettings::from_fields(&fields(
            json!({"theme": "light", "currency": "gbp", "notePin": "1234"}),
        ));
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.currency, Currency::Gbp);
        assert_eq!(settings.note_pin.as_deref(), Some("1234"));
    }

    #[test]
    fn settings_fall_back_on_unknown_values_and_empty_pin() {
        let settings = UserSettings::from_fields(&fields(
            json!({"theme": "sepia", "currency": "JPY", "notePin": ""}),
        ));
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn numeric_pin_is_accepted() {
        let settings = UserSettings::from_fields(&fields(json!({"notePin": 4321})));
        assert_eq!(settings.note_pin.as_deref(), Some("4321"));
    }

    #[test]
    fn settings_round_trip_through_fields() {
        let settings = UserSettings {
            theme: Theme::Light,
            currency: Currency::Eur,
            note_pin: Some("0000".to_string()),
        };
        assert_eq!(UserSettings::from_fields(&settings.to_fields()), settings);
    }

    #[test]
    fn currency_formats_with_symbol() {
        assert_eq!(Currency::Ngn.format(12_500.0), "₦12,500.00");
        assert_eq!(Currency::Usd.format(3.5), "$3.50");
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::Eur);
    }

    #[test]
    fn settings_debug_redacts_pin() {
        let settings = UserSettings {
            note_pin: Some("9876".to_string()),
            ..UserSettings::default()
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("9876"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
