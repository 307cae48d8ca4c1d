//! Tenant loading with password retry logic.

use std::sync::Arc;

use tenant_vault_core::{TenantHandle, TenantManager, VaultError};

use crate::constants::MAX_PASSWORD_ATTEMPTS;
use crate::errors::CliError;
use crate::helpers::{env_password, no_password_error, prompt_password};

use super::context::AppContext;

/// Load `tenant_id`, prompting up to three times on a wrong password.
///
/// A password from `TVAULT_PASSWORD` gets exactly one attempt.
pub fn load_tenant_with_retry(
    ctx: &AppContext,
    manager: &TenantManager,
    tenant_id: &str,
) -> anyhow::Result<Arc<TenantHandle>> {
    if let Some(password) = env_password() {
        return manager
            .get_or_create(tenant_id, &password)
            .map_err(|err| auth_error(err, tenant_id));
    }
    if !ctx.interactive() {
        return Err(no_password_error().into());
    }

    let prompt = format!("Password for {}", tenant_id);
    let mut attempt = 1;
    loop {
        let password = prompt_password(true, &prompt)?;
        match manager.get_or_create(tenant_id, &password) {
            Ok(handle) => return Ok(handle),
            Err(err) if err.is_authentication_failure() && attempt < MAX_PASSWORD_ATTEMPTS => {
                eprintln!("Incorrect password. Try again.");
                attempt += 1;
            }
            Err(err) => return Err(auth_error(err, tenant_id)),
        }
    }
}

fn auth_error(err: VaultError, tenant_id: &str) -> anyhow::Error {
    if err.is_authentication_failure() {
        CliError::auth_failed_with_hint(
            format!("Incorrect password for tenant {}.", tenant_id),
            "Hint: Check the password, or set TVAULT_PASSWORD.",
        )
        .into()
    } else {
        anyhow::Error::new(err).context(format!("Failed to load tenant {}", tenant_id))
    }
}
