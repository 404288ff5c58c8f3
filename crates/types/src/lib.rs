//! Validated primitives shared across the ward crates.
//!
//! Lifecycle transitions that produce a document (laboratory results, imaging reports,
//! pharmacy return reasons) carry a [`DocumentText`], and any transition that moves stock
//! carries a [`Quantity`]. Clinical and billing readings are [`Measurement`]s. All are checked
//! on construction, so holding one is proof the value is usable and survives a JSON round trip.

/// Errors that can occur when creating validated values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The named document was empty or contained only whitespace
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A quantity of zero units was supplied
    #[error("{field} must be greater than zero")]
    ZeroQuantity { field: &'static str },

    /// NaN or an infinity, which JSON cannot store
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// Trimmed, non-empty text belonging to a named document field.
///
/// The field name is kept only for error reporting and is not serialised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText(String);

impl DocumentText {
    /// Creates a new `DocumentText` for `field`.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, [`ValueError::Empty`] names the offending field.
    pub fn new(field: &'static str, input: impl AsRef<str>) -> Result<Self, ValueError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValueError::Empty { field });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DocumentText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for DocumentText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for DocumentText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DocumentText::new("document", &s).map_err(serde::de::Error::custom)
    }
}

/// A strictly positive number of dispensed units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(field: &'static str, units: u32) -> Result<Self, ValueError> {
        if units == 0 {
            return Err(ValueError::ZeroQuantity { field });
        }
        Ok(Self(units))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let units = u32::deserialize(deserializer)?;
        Quantity::new("quantity", units).map_err(serde::de::Error::custom)
    }
}

/// A finite reading such as a temperature, a fluid volume or a price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Measurement(f64);

impl Measurement {
    pub fn new(field: &'static str, value: f64) -> Result<Self, ValueError> {
        if !value.is_finite() {
            return Err(ValueError::NotFinite { field });
        }
        Ok(Self(value))
    }

    pub const fn zero() -> Self {
        Self(0.0)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Measurement {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Measurement {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValueError::NotFinite { field: "measurement" })?;
        Measurement::new("measurement", value)
    }
}

impl serde::Serialize for Measurement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Measurement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Measurement::new("measurement", value).map_err(serde::de::Error::custom)
    }
}
