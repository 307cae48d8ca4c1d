use tenant_vault_core::crypto::{decrypt_file, encrypt_file};

use crate::app::AppContext;
use crate::cli::FileArgs;
use crate::errors::CliError;
use crate::helpers::{prompt_new_password, prompt_password};

pub fn handle_encrypt(ctx: &AppContext, args: &FileArgs) -> anyhow::Result<()> {
    ensure_distinct(args)?;
    let password = prompt_new_password(ctx.interactive())?;
    encrypt_file(&args.input, &args.output, &password)?;
    if !ctx.quiet() {
        println!("Encrypted {} to {}", args.input.display(), args.output.display());
    }
    Ok(())
}

pub fn handle_decrypt(ctx: &AppContext, args: &FileArgs) -> anyhow::Result<()> {
    ensure_distinct(args)?;
    let password = prompt_password(ctx.interactive(), "Password")?;
    decrypt_file(&args.input, &args.output, &password).map_err(|err| {
        if err.is_authentication_failure() {
            anyhow::Error::from(CliError::auth_failed_with_hint(
                format!("Cannot decrypt {}.", args.input.display()),
                "Hint: The password is wrong or the file is not an intact blob.",
            ))
        } else {
            anyhow::Error::new(err)
        }
    })?;
    if !ctx.quiet() {
        println!("Decrypted {} to {}", args.input.display(), args.output.display());
    }
    Ok(())
}

fn ensure_distinct(args: &FileArgs) -> anyhow::Result<()> {
    if args.input == args.output {
        return Err(CliError::invalid_input("Input and output must be different files").into());
    }
    Ok(())
}
