//! Remote key layout for tenant blobs.
//!
//! ```text
//! tenants/<tenant_id>/ung.db.encrypted
//! tenants/<tenant_id>/backups/ung_<unix_timestamp>.db.encrypted
//! ```

use crate::error::{Result, VaultError};

const TENANT_ROOT: &str = "tenants";
const BLOB_NAME: &str = "ung.db.encrypted";

/// Longest accepted tenant id.
pub const MAX_TENANT_ID_LEN: usize = 128;

/// Key of the tenant's current encrypted database.
pub fn blob_key(tenant_id: &str) -> String {
    format!("{}/{}/{}", TENANT_ROOT, tenant_id, BLOB_NAME)
}

/// Prefix under which the tenant's backups live.
pub fn backups_prefix(tenant_id: &str) -> String {
    format!("{}/{}/backups/", TENANT_ROOT, tenant_id)
}

/// Key of a point-in-time backup taken at `unix_timestamp`.
pub fn backup_key(tenant_id: &str, unix_timestamp: i64) -> String {
    format!(
        "{}ung_{}.db.encrypted",
        backups_prefix(tenant_id),
        unix_timestamp
    )
}

/// Reject ids that could escape the key layout or the cache directory.
///
/// Accepted: 1-128 ASCII alphanumerics, `-`, `_` and `.`, except `.` and `..`.
pub fn validate_tenant_id(tenant_id: &str) -> Result<()> {
    if tenant_id.is_empty() {
        return Err(VaultError::Validation(
            "Tenant id cannot be empty".to_string(),
        ));
    }
    if tenant_id.len() > MAX_TENANT_ID_LEN {
        return Err(VaultError::Validation(format!(
            "Tenant id must be at most {} characters (got {})",
            MAX_TENANT_ID_LEN,
            tenant_id.len()
        )));
    }
    if tenant_id == "." || tenant_id == ".." {
        return Err(VaultError::Validation(format!(
            "Invalid tenant id: {}",
            tenant_id
        )));
    }
    if let Some(bad) = tenant_id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(VaultError::Validation(format!(
            "Invalid character {:?} in tenant id {}",
            bad, tenant_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(blob_key("t1"), "tenants/t1/ung.db.encrypted");
        assert_eq!(backups_prefix("t1"), "tenants/t1/backups/");
        assert_eq!(
            backup_key("t1", 1_700_000_000),
            "tenants/t1/backups/ung_1700000000.db.encrypted"
        );
    }

    #[test]
    fn test_valid_tenant_ids() {
        assert!(validate_tenant_id("t1").is_ok());
        assert!(validate_tenant_id("acme-corp_2024.eu").is_ok());
        assert!(validate_tenant_id(&"a".repeat(MAX_TENANT_ID_LEN)).is_ok());
    }

    #[test]
    fn test_invalid_tenant_ids() {
        for id in ["", ".", "..", "a/b", "../etc", "a b", "t\n", "ümlaut"] {
            let result = validate_tenant_id(id);
            assert!(
                matches!(result, Err(VaultError::Validation(_))),
                "{:?} should be rejected",
                id
            );
        }
        assert!(validate_tenant_id(&"a".repeat(MAX_TENANT_ID_LEN + 1)).is_err());
    }
}
