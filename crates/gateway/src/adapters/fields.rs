//! Typed field access over raw JSON payloads

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use std::str::FromStr;
use tradebook_ports::NormalizeError;

/// Field reader for one exchange payload; errors name the exchange and field
pub(crate) struct Fields<'a> {
    exchange: &'a str,
    raw: &'a Value,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(exchange: &'a str, raw: &'a Value) -> Result<Self, NormalizeError> {
        if !raw.is_object() {
            return Err(NormalizeError::UnsupportedPayload(format!(
                "{exchange} trade must be a JSON object, got {raw}"
            )));
        }
        Ok(Self { exchange, raw })
    }

    /// Present and not null
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.raw.get(field).filter(|v| !v.is_null())
    }

    fn missing(&self, field: &str) -> NormalizeError {
        NormalizeError::MissingField {
            exchange: self.exchange.to_string(),
            field: field.to_string(),
        }
    }

    fn invalid(&self, field: &str, value: &Value) -> NormalizeError {
        NormalizeError::InvalidField {
            exchange: self.exchange.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Identifier fields: exchanges send them as strings or numbers
    pub(crate) fn id(&self, field: &str) -> Result<String, NormalizeError> {
        match self.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(other) => Err(self.invalid(field, other)),
            None => Err(self.missing(field)),
        }
    }

    /// First identifier field present among `fields`
    pub(crate) fn first_id(&self, fields: &[&str]) -> Result<String, NormalizeError> {
        fields
            .iter()
            .find(|f| self.get(f).is_some())
            .map(|f| self.id(f))
            .unwrap_or_else(|| Err(self.missing(fields.first().copied().unwrap_or("id"))))
    }

    pub(crate) fn str(&self, field: &str) -> Result<&'a str, NormalizeError> {
        match self.get(field) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(self.invalid(field, other)),
            None => Err(self.missing(field)),
        }
    }

    /// Optional text field, empty when absent
    pub(crate) fn str_or_empty(&self, field: &str) -> String {
        match self.get(field) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Decimal from a JSON number or numeric string
    pub(crate) fn decimal(&self, field: &str) -> Result<Decimal, NormalizeError> {
        self.opt_decimal(field)?.ok_or_else(|| self.missing(field))
    }

    pub(crate) fn opt_decimal(&self, field: &str) -> Result<Option<Decimal>, NormalizeError> {
        let Some(value) = self.get(field) else {
            return Ok(None);
        };
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => return Err(self.invalid(field, other)),
        };
        parse_decimal(&text)
            .map(Some)
            .ok_or_else(|| self.invalid(field, value))
    }

    /// Integer milliseconds
    pub(crate) fn millis(&self, field: &str) -> Result<i64, NormalizeError> {
        let value = self.get(field).ok_or_else(|| self.missing(field))?;
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| self.invalid(field, value)),
            Value::String(s) => s.trim().parse().map_err(|_| self.invalid(field, value)),
            other => Err(self.invalid(field, other)),
        }
    }

    /// Fractional seconds (e.g. `1688667796.6741`) converted to milliseconds
    pub(crate) fn seconds_as_millis(&self, field: &str) -> Result<i64, NormalizeError> {
        let seconds = self.decimal(field)?;
        (seconds * Decimal::ONE_THOUSAND)
            .trunc()
            .to_i64()
            .ok_or_else(|| self.invalid(field, &Value::String(seconds.to_string())))
    }

    /// Nested object field, e.g. ccxt's `fee: { cost, currency }`
    pub(crate) fn nested(&self, field: &str) -> Option<Fields<'a>> {
        self.get(field)
            .filter(|v| v.is_object())
            .map(|raw| Fields {
                exchange: self.exchange,
                raw,
            })
    }
}

/// Parse plain or scientific notation ("0.001", "1e-5")
fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}
