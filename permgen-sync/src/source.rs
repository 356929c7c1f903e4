//! Sources of the defined permission list.

use permgen_rbac::PermissionMap;

use crate::error::SyncResult;

/// Provider of the ordered permission strings to reconcile.
pub trait PermissionSource {
    /// Permission strings, in declaration order.
    fn permission_names(&self) -> SyncResult<Vec<String>>;
}

impl PermissionSource for [String] {
    fn permission_names(&self) -> SyncResult<Vec<String>> {
        Ok(self.to_vec())
    }
}

impl PermissionSource for [&str] {
    fn permission_names(&self) -> SyncResult<Vec<String>> {
        Ok(self.iter().map(|name| name.to_string()).collect())
    }
}

impl<T> PermissionSource for Vec<T>
where
    [T]: PermissionSource,
{
    fn permission_names(&self) -> SyncResult<Vec<String>> {
        self.as_slice().permission_names()
    }
}

impl PermissionSource for PermissionMap {
    fn permission_names(&self) -> SyncResult<Vec<String>> {
        Ok(self.values().into_iter().map(String::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permgen_rbac::CanonicalPermission;

    #[test]
    fn test_permission_map_source_uses_values_in_name_order() {
        let map: PermissionMap = [
            CanonicalPermission::new("POST_VIEW", "posts.view"),
            CanonicalPermission::new("POST_CREATE", "posts.create"),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.permission_names().unwrap(), vec!["posts.create", "posts.view"]);
    }

    #[test]
    fn test_slice_source() {
        let names: &[&str] = &["a", "b"];
        assert_eq!(names.permission_names().unwrap(), vec!["a", "b"]);
    }
}
