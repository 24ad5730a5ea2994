//! Straw configuration record, typed updates and order validation

mod color;
pub mod store;

pub use color::{ColorParseError, StrawColor};
pub use store::{ConfigStore, KeyValueStorage, MemoryStorage, PersistedConfig};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DIAMETER_MM, DEFAULT_LENGTH_MM, DIAMETER_TABLE, MAX_LENGTH_MM, MIN_LENGTH_MM,
    MIN_ORDER_QUANTITY,
};

/// Body shape of the straw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StrawType {
    Straight,
    #[default]
    Flexible,
    ExtraFlexible,
}

impl StrawType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            StrawType::Straight => "Straight",
            StrawType::Flexible => "Flexible",
            StrawType::ExtraFlexible => "Extra Flexible",
        }
    }

    /// Whether the body has a bendable joint
    pub fn is_bent(&self) -> bool {
        !matches!(self, StrawType::Straight)
    }

    /// All straw types for UI
    pub fn all() -> &'static [StrawType] {
        &[
            StrawType::Straight,
            StrawType::Flexible,
            StrawType::ExtraFlexible,
        ]
    }
}

/// Shape of the drinking end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EndType {
    #[default]
    Standard,
    Scoop,
    FortyFiveDegree,
}

impl EndType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            EndType::Standard => "Standard",
            EndType::Scoop => "Scoop (Spoon)",
            EndType::FortyFiveDegree => "45 Degree Angle",
        }
    }

    /// Scoop and angled ends only exist on straight bodies
    pub fn forces_straight(&self) -> bool {
        matches!(self, EndType::Scoop | EndType::FortyFiveDegree)
    }

    /// All end types for UI
    pub fn all() -> &'static [EndType] {
        &[EndType::Standard, EndType::Scoop, EndType::FortyFiveDegree]
    }
}

/// Individual wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WrapperType {
    #[default]
    Unwrapped,
    PaperWrapped,
    FilmWrapped,
}

impl WrapperType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            WrapperType::Unwrapped => "Unwrapped",
            WrapperType::PaperWrapped => "Paper Wrapped",
            WrapperType::FilmWrapped => "Film Wrapped",
        }
    }

    /// All wrapper types for UI
    pub fn all() -> &'static [WrapperType] {
        &[
            WrapperType::Unwrapped,
            WrapperType::PaperWrapped,
            WrapperType::FilmWrapped,
        ]
    }
}

/// Diameters offered by the interface, in millimeters
pub fn offered_diameters() -> impl Iterator<Item = f32> {
    DIAMETER_TABLE.iter().map(|(mm, _)| *mm)
}

/// The complete set of user-chosen straw parameters plus order volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub color: StrawColor,
    pub straw_type: StrawType,
    pub end_type: EndType,
    /// Straw length in millimeters
    pub length_mm: f32,
    /// Straw diameter in millimeters
    pub diameter_mm: f32,
    pub wrapper_type: WrapperType,
    pub comments: String,
    pub num_master_cartons: Option<u32>,
    pub qty_per_inner_box: Option<u32>,
    pub inner_boxes_per_carton: Option<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            color: StrawColor::RED,
            straw_type: StrawType::default(),
            end_type: EndType::default(),
            length_mm: DEFAULT_LENGTH_MM,
            diameter_mm: DEFAULT_DIAMETER_MM,
            wrapper_type: WrapperType::default(),
            comments: String::new(),
            num_master_cartons: None,
            qty_per_inner_box: None,
            inner_boxes_per_carton: None,
        }
    }
}

/// A single-field change to a [`Configuration`]
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigUpdate {
    Color(StrawColor),
    StrawType(StrawType),
    EndType(EndType),
    Length(f32),
    Diameter(f32),
    Wrapper(WrapperType),
    Comments(String),
    MasterCartons(Option<u32>),
    QtyPerInnerBox(Option<u32>),
    InnerBoxesPerCarton(Option<u32>),
}

impl Configuration {
    /// Return a new configuration with `update` applied.
    ///
    /// The result always satisfies the end-type invariant: scoop and angled
    /// ends force a straight body, and a bent body cannot be selected while
    /// such an end is active.
    pub fn apply(&self, update: ConfigUpdate) -> Configuration {
        let mut next = self.clone();
        match update {
            ConfigUpdate::Color(color) => next.color = color,
            ConfigUpdate::StrawType(straw_type) => next.straw_type = straw_type,
            ConfigUpdate::EndType(end_type) => next.end_type = end_type,
            ConfigUpdate::Length(length) => next.length_mm = length,
            ConfigUpdate::Diameter(diameter) => next.diameter_mm = diameter,
            ConfigUpdate::Wrapper(wrapper) => next.wrapper_type = wrapper,
            ConfigUpdate::Comments(comments) => next.comments = comments,
            ConfigUpdate::MasterCartons(n) => next.num_master_cartons = n,
            ConfigUpdate::QtyPerInnerBox(n) => next.qty_per_inner_box = n,
            ConfigUpdate::InnerBoxesPerCarton(n) => next.inner_boxes_per_carton = n,
        }
        next.normalized()
    }

    /// Enforce cross-field invariants
    pub fn normalized(mut self) -> Configuration {
        if self.end_type.forces_straight() {
            self.straw_type = StrawType::Straight;
        }
        self
    }

    /// Total straw quantity, derived from the three volume fields (empty = 0)
    pub fn total_qty(&self) -> u64 {
        let cartons = u64::from(self.num_master_cartons.unwrap_or(0));
        let per_box = u64::from(self.qty_per_inner_box.unwrap_or(0));
        let boxes = u64::from(self.inner_boxes_per_carton.unwrap_or(0));
        cartons.saturating_mul(per_box).saturating_mul(boxes)
    }

    /// Derived validation flags
    pub fn validation(&self) -> OrderValidation {
        OrderValidation {
            below_minimum_order: self.total_qty() < MIN_ORDER_QUANTITY,
            invalid_length: !is_valid_length(self.length_mm),
        }
    }
}

/// Whether a length (mm) may be ordered
pub fn is_valid_length(length_mm: f32) -> bool {
    length_mm.is_finite() && (MIN_LENGTH_MM..=MAX_LENGTH_MM).contains(&length_mm)
}

/// Validation state that gates the "submit for review" action.
///
/// Failing checks never block editing the configuration itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderValidation {
    pub below_minimum_order: bool,
    pub invalid_length: bool,
}

impl OrderValidation {
    /// Submission is allowed only when no check fails
    pub fn can_submit(&self) -> bool {
        !self.below_minimum_order && !self.invalid_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_volume(cartons: u32, per_box: u32, boxes: u32) -> Configuration {
        Configuration {
            num_master_cartons: Some(cartons),
            qty_per_inner_box: Some(per_box),
            inner_boxes_per_carton: Some(boxes),
            ..Configuration::default()
        }
    }

    #[test]
    fn test_scoop_forces_straight() {
        let config = Configuration::default();
        assert_eq!(config.straw_type, StrawType::Flexible);

        let config = config.apply(ConfigUpdate::EndType(EndType::Scoop));
        assert_eq!(config.straw_type, StrawType::Straight);

        // Bent bodies stay unavailable while the scoop end is active
        let config = config.apply(ConfigUpdate::StrawType(StrawType::ExtraFlexible));
        assert_eq!(config.straw_type, StrawType::Straight);
    }

    #[test]
    fn test_angled_end_forces_straight() {
        let config = Configuration {
            straw_type: StrawType::ExtraFlexible,
            ..Configuration::default()
        }
        .apply(ConfigUpdate::EndType(EndType::FortyFiveDegree));
        assert_eq!(config.straw_type, StrawType::Straight);

        let config = config.apply(ConfigUpdate::StrawType(StrawType::Flexible));
        assert_eq!(config.straw_type, StrawType::Straight);
    }

    #[test]
    fn test_standard_end_allows_bent_body() {
        let config = Configuration::default()
            .apply(ConfigUpdate::EndType(EndType::Scoop))
            .apply(ConfigUpdate::EndType(EndType::Standard))
            .apply(ConfigUpdate::StrawType(StrawType::ExtraFlexible));
        assert_eq!(config.straw_type, StrawType::ExtraFlexible);
    }

    #[test]
    fn test_total_qty_empty_fields_are_zero() {
        let config = Configuration::default();
        assert_eq!(config.total_qty(), 0);

        let config = config
            .apply(ConfigUpdate::MasterCartons(Some(10)))
            .apply(ConfigUpdate::QtyPerInnerBox(Some(500)));
        assert_eq!(config.total_qty(), 0);
    }

    #[test]
    fn test_total_qty_is_idempotent() {
        let config = with_volume(10, 500, 20);
        assert_eq!(config.total_qty(), 100_000);
        assert_eq!(config.total_qty(), config.total_qty());
    }

    #[test]
    fn test_minimum_order_boundary() {
        // 99_999 = 3 * 33_333 * 1
        let below = with_volume(3, 33_333, 1);
        assert_eq!(below.total_qty(), 99_999);
        assert!(below.validation().below_minimum_order);

        let exact = with_volume(1, 100_000, 1);
        assert!(!exact.validation().below_minimum_order);
    }

    #[test]
    fn test_length_boundaries() {
        assert!(!is_valid_length(49.0));
        assert!(is_valid_length(50.0));
        assert!(is_valid_length(999.0));
        assert!(!is_valid_length(1000.0));
        assert!(!is_valid_length(f32::NAN));
    }

    #[test]
    fn test_validation_gates_submit() {
        let config = with_volume(10, 500, 20);
        assert!(config.validation().can_submit());

        let config = config.apply(ConfigUpdate::Length(1000.0));
        let validation = config.validation();
        assert!(validation.invalid_length);
        assert!(!validation.can_submit());
        // The out-of-range value is still stored
        assert_eq!(config.length_mm, 1000.0);
    }

    #[test]
    fn test_total_qty_saturates() {
        let config = with_volume(u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(config.total_qty(), u64::MAX);
    }
}
