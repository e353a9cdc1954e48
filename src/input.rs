use std::{error::Error, fmt};

/// The four features a prediction record is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    AreaSqft,
    Bedrooms,
    Stories,
    YearBuilt,
}

impl Feature {
    /// Every feature, in form order.
    pub const ALL: [Feature; 4] = [
        Feature::AreaSqft,
        Feature::Bedrooms,
        Feature::Stories,
        Feature::YearBuilt,
    ];

    /// Returns the field name used in the `/predict` body.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Feature::AreaSqft => "area_sqft",
            Feature::Bedrooms => "bedrooms",
            Feature::Stories => "stories",
            Feature::YearBuilt => "year_built",
        }
    }

    /// Returns the label shown next to the input.
    pub fn label(&self) -> &'static str {
        match self {
            Feature::AreaSqft => "area sqft",
            Feature::Bedrooms => "bedrooms",
            Feature::Stories => "stories",
            Feature::YearBuilt => "year built",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The record being edited in the prediction form.
///
/// Values are kept exactly as typed: a keystroke that does not parse as a
/// number leaves the field as NaN until it is edited again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionInput {
    pub area_sqft: f64,
    pub bedrooms: f64,
    pub stories: f64,
    pub year_built: f64,
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self {
            area_sqft: 1200.0,
            bedrooms: 3.0,
            stories: 1.0,
            year_built: 2010.0,
        }
    }
}

impl PredictionInput {
    /// Returns the current value of `feature`.
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::AreaSqft => self.area_sqft,
            Feature::Bedrooms => self.bedrooms,
            Feature::Stories => self.stories,
            Feature::YearBuilt => self.year_built,
        }
    }

    /// Overwrites `feature` with `value`.
    pub fn set(&mut self, feature: Feature, value: f64) {
        let slot = match feature {
            Feature::AreaSqft => &mut self.area_sqft,
            Feature::Bedrooms => &mut self.bedrooms,
            Feature::Stories => &mut self.stories,
            Feature::YearBuilt => &mut self.year_built,
        };
        *slot = value;
    }

    /// Applies the raw text of a number input to `feature`.
    ///
    /// Unparseable text stores NaN, which keeps the record unsubmittable.
    pub fn set_raw(&mut self, feature: Feature, raw: &str) {
        let value = raw.trim().parse::<f64>().unwrap_or(f64::NAN);
        self.set(feature, value);
    }
}

/// A record whose every field is a finite number.
///
/// Only [`validate`] builds one, so anything holding a `ValidatedInput`
/// is safe to send.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedInput(PredictionInput);

impl ValidatedInput {
    pub fn area_sqft(&self) -> f64 {
        self.0.area_sqft
    }

    pub fn bedrooms(&self) -> f64 {
        self.0.bedrooms
    }

    pub fn stories(&self) -> f64 {
        self.0.stories
    }

    pub fn year_built(&self) -> f64 {
        self.0.year_built
    }
}

/// A field that is NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationError {
    pub feature: Feature,
    pub value: f64,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must be a finite number, got {}", self.feature, self.value)
    }
}

impl Error for ValidationError {}

/// Checks that every field of `input` is finite.
///
/// Ranges are not checked: a negative area is passed through and left for
/// the backend to judge.
///
/// # Errors
/// Returns the first non-finite field, in form order.
pub fn validate(input: &PredictionInput) -> Result<ValidatedInput, ValidationError> {
    for feature in Feature::ALL {
        let value = input.get(feature);
        if !value.is_finite() {
            return Err(ValidationError { feature, value });
        }
    }
    Ok(ValidatedInput(*input))
}

/// Whether the submit trigger should be enabled for `input`.
pub fn is_submittable(input: &PredictionInput) -> bool {
    validate(input).is_ok()
}
