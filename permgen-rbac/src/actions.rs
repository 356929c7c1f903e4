//! # Actions
//!
//! Defines the actions a resource declaration can list.
//! An action is declared as a bare string, a constant from the standard
//! vocabulary, or an opaque caller-supplied value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix that marks an action as scoped.
///
/// A scoped action expands into an "any" permission and a plain permission.
pub const SCOPED_SUFFIX: &str = "_scoped";

/// Standard action vocabulary.
///
/// The vocabulary groups into three families:
/// - **CRUD**: View, Create, Update, Delete
/// - **Scoped**: expand into `{base}_any` and `{base}` permissions
/// - **Explicit scope**: already name their scope (`view_any`, `view_own`, ...)
///
/// A standard action behaves exactly like the bare string it stands for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StandardAction {
    /// View a single resource.
    View,
    /// Create a resource.
    Create,
    /// Update a resource.
    Update,
    /// Delete a resource.
    Delete,

    /// View, in both the "any" and the limited scope.
    ViewScoped,
    /// Update, in both the "any" and the limited scope.
    UpdateScoped,
    /// Delete, in both the "any" and the limited scope.
    DeleteScoped,
    /// Control, in both the "any" and the limited scope.
    ControlScoped,
    /// View usage, in both the "any" and the limited scope.
    ViewUsageScoped,

    /// View any resource regardless of ownership.
    ViewAny,
    /// View only owned resources.
    ViewOwn,
    /// Update any resource regardless of ownership.
    UpdateAny,
    /// Update only owned resources.
    UpdateOwn,
    /// Delete any resource regardless of ownership.
    DeleteAny,
    /// Delete only owned resources.
    DeleteOwn,

    /// Administer the resource.
    Manage,
}

impl StandardAction {
    /// Get the string value of the action.
    ///
    /// # Returns
    ///
    /// The snake_case value the action expands from.
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardAction::View => "view",
            StandardAction::Create => "create",
            StandardAction::Update => "update",
            StandardAction::Delete => "delete",
            StandardAction::ViewScoped => "view_scoped",
            StandardAction::UpdateScoped => "update_scoped",
            StandardAction::DeleteScoped => "delete_scoped",
            StandardAction::ControlScoped => "control_scoped",
            StandardAction::ViewUsageScoped => "view_usage_scoped",
            StandardAction::ViewAny => "view_any",
            StandardAction::ViewOwn => "view_own",
            StandardAction::UpdateAny => "update_any",
            StandardAction::UpdateOwn => "update_own",
            StandardAction::DeleteAny => "delete_any",
            StandardAction::DeleteOwn => "delete_own",
            StandardAction::Manage => "manage",
        }
    }

    /// Parse a standard action from its string value.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(StandardAction)` if the value is part of the vocabulary, `None` otherwise
    ///
    /// # Example
    ///
    /// ```
    /// use permgen_rbac::actions::StandardAction;
    ///
    /// assert_eq!(StandardAction::parse("view_scoped"), Some(StandardAction::ViewScoped));
    /// assert_eq!(StandardAction::parse("MANAGE"), Some(StandardAction::Manage));
    /// assert_eq!(StandardAction::parse("publish"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.to_lowercase();
        Self::all().into_iter().find(|action| action.as_str() == lowered)
    }

    /// Get all standard actions, in vocabulary order.
    pub fn all() -> Vec<Self> {
        vec![
            StandardAction::View,
            StandardAction::Create,
            StandardAction::Update,
            StandardAction::Delete,
            StandardAction::ViewScoped,
            StandardAction::UpdateScoped,
            StandardAction::DeleteScoped,
            StandardAction::ControlScoped,
            StandardAction::ViewUsageScoped,
            StandardAction::ViewAny,
            StandardAction::ViewOwn,
            StandardAction::UpdateAny,
            StandardAction::UpdateOwn,
            StandardAction::DeleteAny,
            StandardAction::DeleteOwn,
            StandardAction::Manage,
        ]
    }

    /// Check if this action expands into an "any" and a plain permission.
    pub fn is_scoped(&self) -> bool {
        self.as_str().ends_with(SCOPED_SUFFIX)
    }
}

impl fmt::Display for StandardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried by an opaque, caller-supplied action constant.
///
/// Opaque values come from the caller's own action enums, backed either by
/// strings or by integers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum OpaqueValue {
    /// Integer-backed constant.
    Int(i64),
    /// String-backed constant.
    Str(String),
}

impl fmt::Display for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpaqueValue::Int(value) => write!(f, "{}", value),
            OpaqueValue::Str(value) => f.write_str(value),
        }
    }
}

/// An action listed under a resource declaration.
///
/// Only [`ActionSpec::Plain`] and [`ActionSpec::Standard`] take part in
/// scoped expansion. An [`ActionSpec::Opaque`] value is always expanded into a
/// single permission, even when its value ends in `_scoped`.
///
/// In configuration files the variants are written as:
/// - `"view_scoped"` for a plain action
/// - `{ standard = "view_scoped" }` for a standard action
/// - `{ custom = "approve_scoped" }` or `{ custom = 7 }` for an opaque action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ActionSpec {
    /// Bare string action name.
    Plain(String),
    /// Constant from the standard vocabulary.
    Standard {
        /// The vocabulary entry.
        standard: StandardAction,
    },
    /// Caller-supplied constant, treated as an opaque value.
    Opaque {
        /// The constant's backing value.
        custom: OpaqueValue,
    },
}

impl ActionSpec {
    /// Create a plain action.
    pub fn plain(action: impl Into<String>) -> Self {
        ActionSpec::Plain(action.into())
    }

    /// Create a standard action.
    pub fn standard(action: StandardAction) -> Self {
        ActionSpec::Standard { standard: action }
    }

    /// Create an opaque action backed by a string.
    pub fn opaque(value: impl Into<String>) -> Self {
        ActionSpec::Opaque {
            custom: OpaqueValue::Str(value.into()),
        }
    }

    /// Create an opaque action backed by an integer.
    pub fn opaque_int(value: i64) -> Self {
        ActionSpec::Opaque {
            custom: OpaqueValue::Int(value),
        }
    }

    /// Resolve the action to its string value.
    ///
    /// # Returns
    ///
    /// `None` when the resolved value is empty, the string value otherwise.
    pub fn resolve(&self) -> Option<String> {
        let value = match self {
            ActionSpec::Plain(value) => value.clone(),
            ActionSpec::Standard { standard } => standard.as_str().to_string(),
            ActionSpec::Opaque { custom } => custom.to_string(),
        };

        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Check if this action may be split into scoped permissions.
    pub fn is_scope_eligible(&self) -> bool {
        matches!(self, ActionSpec::Plain(_) | ActionSpec::Standard { .. })
    }

    /// Get the base action when this action is scoped.
    ///
    /// # Returns
    ///
    /// `Some(base)` when the action is scope-eligible and its value ends with
    /// `_scoped`; `None` otherwise.
    ///
    /// # Example
    ///
    /// ```
    /// use permgen_rbac::actions::ActionSpec;
    ///
    /// assert_eq!(ActionSpec::plain("view_scoped").scoped_base(), Some("view".to_string()));
    /// assert_eq!(ActionSpec::plain("publish").scoped_base(), None);
    /// assert_eq!(ActionSpec::opaque("approve_scoped").scoped_base(), None);
    /// ```
    pub fn scoped_base(&self) -> Option<String> {
        if !self.is_scope_eligible() {
            return None;
        }
        let value = self.resolve()?;
        value.strip_suffix(SCOPED_SUFFIX).map(str::to_string)
    }
}

impl From<StandardAction> for ActionSpec {
    fn from(action: StandardAction) -> Self {
        ActionSpec::standard(action)
    }
}

impl From<&str> for ActionSpec {
    fn from(action: &str) -> Self {
        ActionSpec::plain(action)
    }
}

/// An action entry as it appears in configuration.
///
/// Entries of a type that cannot describe an action (booleans, floats,
/// arrays, malformed tables) are kept as [`DeclaredAction::Unsupported`] so
/// the expander can skip them with a warning instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredAction {
    /// A well-formed action.
    Spec(ActionSpec),
    /// An entry of an unsupported type.
    Unsupported {
        /// Name of the offending value's type.
        kind: String,
    },
}

impl DeclaredAction {
    /// Create an unsupported entry.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        DeclaredAction::Unsupported { kind: kind.into() }
    }
}

impl From<ActionSpec> for DeclaredAction {
    fn from(action: ActionSpec) -> Self {
        DeclaredAction::Spec(action)
    }
}

impl From<StandardAction> for DeclaredAction {
    fn from(action: StandardAction) -> Self {
        DeclaredAction::Spec(action.into())
    }
}

impl From<&str> for DeclaredAction {
    fn from(action: &str) -> Self {
        DeclaredAction::Spec(action.into())
    }
}
