//! Renders a permission map into enum source text.

use permgen_rbac::PermissionMap;

use crate::target::ArtifactTarget;
use crate::template::{Template, CASES_PLACEHOLDER, CLASS_PLACEHOLDER, NAMESPACE_PLACEHOLDER};

/// Line emitted in place of cases when the permission set is empty.
pub const EMPTY_CASES_MARKER: &str = "// No permissions defined or generated from the permission configuration";

/// Case indentation inside the macro invocation.
const CASE_INDENT: &str = "    ";

/// Format permissions as `NAME = "value";` lines, one per permission, in
/// symbolic-name order.
///
/// Each line ends with a newline. An empty map yields the empty marker.
pub fn format_cases(permissions: &PermissionMap) -> String {
    if permissions.is_empty() {
        return format!("{CASE_INDENT}{EMPTY_CASES_MARKER}\n");
    }

    permissions
        .iter()
        .map(|(name, value)| format!("{CASE_INDENT}{name} = {value:?};\n"))
        .collect()
}

/// Substitute the target identity and cases into a template.
///
/// Every occurrence of each placeholder is replaced.
pub fn render(permissions: &PermissionMap, template: &Template, target: &ArtifactTarget) -> String {
    template
        .source()
        .replace(NAMESPACE_PLACEHOLDER, &target.namespace)
        .replace(CLASS_PLACEHOLDER, &target.type_name)
        .replace(CASES_PLACEHOLDER, &format_cases(permissions))
}
