//! LandView table endpoints.

use std::fmt;

/// Backend tables the connector reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// User accounts.
    SysUser,
    /// Groups (entitlements).
    SysGroup,
    /// User-to-group membership relations.
    UserGroup,
    /// Permissions (entitlements).
    SysPermission,
    /// Group-to-permission relations.
    SysGroupPermission,
}

impl Table {
    /// Table name as it appears in the API path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::SysUser => "sys_user",
            Table::SysGroup => "sys_group",
            Table::UserGroup => "user_group",
            Table::SysPermission => "sys_permission",
            Table::SysGroupPermission => "sys_group_permission",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection URL of a table: `{base_url}/api/v1/{table}`.
pub fn table_url(base_url: &str, table: Table) -> String {
    format!("{}/api/v1/{}", base_url.trim_end_matches('/'), table.as_str())
}

/// Row URL of a table: `{base_url}/api/v1/{table}/{id}`.
pub fn row_url(base_url: &str, table: Table, id: &str) -> String {
    format!("{}/{}", table_url(base_url, table), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        assert_eq!(
            table_url("https://lv.example.com", Table::SysUser),
            "https://lv.example.com/api/v1/sys_user"
        );
        assert_eq!(
            table_url("https://lv.example.com/", Table::SysGroupPermission),
            "https://lv.example.com/api/v1/sys_group_permission"
        );
    }

    #[test]
    fn test_row_url() {
        assert_eq!(
            row_url("https://lv.example.com", Table::UserGroup, "77"),
            "https://lv.example.com/api/v1/user_group/77"
        );
    }
}
