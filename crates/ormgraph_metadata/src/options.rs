//! Model-wide configuration.
//!
//! Per-type and per-member settings fall back to these defaults when
//! unset.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Name Comparison
// =============================================================================

/// How entity type names are compared when registering and looking up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NameComparison {
    /// Byte-wise comparison.
    #[default]
    Ordinal,
    /// Comparison after Unicode lower-casing.
    OrdinalIgnoreCase,
}

impl NameComparison {
    /// Returns the lookup key for `name` under this comparison.
    #[must_use]
    pub fn key(self, name: &str) -> String {
        match self {
            Self::Ordinal => name.to_owned(),
            Self::OrdinalIgnoreCase => name.to_lowercase(),
        }
    }
}

// =============================================================================
// Change Tracking
// =============================================================================

/// How instances of a type report changes to the tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeTrackingStrategy {
    /// Changes are found by comparing against a snapshot.
    #[default]
    Snapshot,
    /// Instances raise changed notifications.
    ChangedNotifications,
    /// Instances raise changing and changed notifications.
    ChangingAndChangedNotifications,
    /// Like [`Self::ChangingAndChangedNotifications`], but original values
    /// are still recorded.
    ChangingAndChangedNotificationsWithOriginalValues,
}

// =============================================================================
// Property Access
// =============================================================================

/// How member values are read and written on instances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PropertyAccessMode {
    /// Always use the backing field.
    Field,
    /// Use the field while materializing, the accessor otherwise.
    FieldDuringConstruction,
    /// Always use the accessor.
    Property,
    /// Prefer the field, fall back to the accessor.
    #[default]
    PreferField,
    /// Prefer the field while materializing.
    PreferFieldDuringConstruction,
    /// Prefer the accessor, fall back to the field.
    PreferProperty,
}

// =============================================================================
// Model Options
// =============================================================================

/// Configuration for a model.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelOptions {
    /// Entity type name comparison.
    pub name_comparison: NameComparison,
    /// Default change tracking strategy.
    pub change_tracking_strategy: ChangeTrackingStrategy,
    /// Default property access mode.
    pub property_access_mode: PropertyAccessMode,
    /// Whether automatic change detection is disabled.
    pub skip_detect_changes: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            name_comparison: NameComparison::Ordinal,
            change_tracking_strategy: ChangeTrackingStrategy::Snapshot,
            property_access_mode: PropertyAccessMode::PreferField,
            skip_detect_changes: false,
        }
    }
}

impl ModelOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name comparison.
    #[must_use]
    pub fn with_name_comparison(mut self, comparison: NameComparison) -> Self {
        self.name_comparison = comparison;
        self
    }

    /// Sets the default change tracking strategy.
    #[must_use]
    pub fn with_change_tracking_strategy(mut self, strategy: ChangeTrackingStrategy) -> Self {
        self.change_tracking_strategy = strategy;
        self
    }

    /// Sets the default property access mode.
    #[must_use]
    pub fn with_property_access_mode(mut self, mode: PropertyAccessMode) -> Self {
        self.property_access_mode = mode;
        self
    }

    /// Sets whether automatic change detection is disabled.
    #[must_use]
    pub fn with_skip_detect_changes(mut self, skip: bool) -> Self {
        self.skip_detect_changes = skip;
        self
    }
}
