//! Cell model and the canonical string form of every cell kind

use std::sync::Arc;

use super::date_format::{format_serial, is_date_format};

/// Epoch used to interpret date serials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateSystem {
    #[default]
    Excel1900,
    Excel1904,
}

/// A numeric value together with the number format attached to its cell
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: f64,
    /// Format code; `None` means "General"
    pub format: Option<Arc<str>>,
    pub date_system: DateSystem,
}

impl Number {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            format: None,
            date_system: DateSystem::Excel1900,
        }
    }

    pub fn with_format(value: f64, format: impl Into<Arc<str>>) -> Self {
        Self {
            value,
            format: Some(format.into()),
            date_system: DateSystem::Excel1900,
        }
    }

    pub fn in_date_system(mut self, date_system: DateSystem) -> Self {
        self.date_system = date_system;
        self
    }

    pub fn is_date(&self) -> bool {
        self.format.as_deref().is_some_and(is_date_format)
    }

    fn render(&self) -> String {
        if let Some(format) = self.format.as_deref() {
            if is_date_format(format) {
                let date1904 = self.date_system == DateSystem::Excel1904;
                if let Some(text) = format_serial(self.value, format, date1904) {
                    return text;
                }
            }
        }
        number_to_string(self.value)
    }
}

/// Last computed value stored alongside a formula
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaResult {
    Numeric(Number),
    Boolean(bool),
    Text(String),
    Error(String),
}

/// A worksheet cell, tagged by its declared kind
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Numeric(Number),
    Boolean(bool),
    Text(String),
    Formula {
        expression: String,
        cached: Option<FormulaResult>,
    },
    Error(String),
    Blank,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        Cell::Numeric(Number::new(value))
    }

    pub fn formula(expression: impl Into<String>, cached: Option<FormulaResult>) -> Self {
        Cell::Formula {
            expression: expression.into(),
            cached,
        }
    }

    /// Canonical string form of this cell
    pub fn to_display_string(&self) -> String {
        match self {
            Cell::Numeric(number) => number.render(),
            Cell::Boolean(value) => value.to_string(),
            Cell::Text(text) => text.clone(),
            Cell::Formula { cached, .. } => match cached {
                Some(FormulaResult::Numeric(number)) => number.render(),
                Some(FormulaResult::Boolean(value)) => value.to_string(),
                Some(FormulaResult::Text(text)) => text.clone(),
                Some(FormulaResult::Error(_)) | None => String::new(),
            },
            Cell::Error(_) | Cell::Blank => String::new(),
        }
    }
}

/// Canonical string form of a possibly absent cell
pub fn serialize(cell: Option<&Cell>) -> String {
    cell.map(Cell::to_display_string).unwrap_or_default()
}

/// Decimal form of a double: shortest round-trip digits, always at least one
/// fractional digit, scientific notation outside [1e-3, 1e7)
///
/// Examples: 10 → "10.0", 0.5 → "0.5", 12345678 → "1.2345678E7", 0.0001 → "1.0E-4"
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    } else {
        let text = format!("{:e}", value);
        match text.split_once('e') {
            Some((mantissa, exponent)) if mantissa.contains('.') => {
                format!("{}E{}", mantissa, exponent)
            }
            Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
            None => text,
        }
    }
}
