//! Rows of the `options` table: named text values.

use super::{StoreError, StoreResult};
use crate::crypto::KeyMaterial;
use rusqlite::{Connection, OptionalExtension, params};

pub const SCHEMA_VERSION: &str = "schemaVersion";
pub const PROTECTED_SESSION_TIMEOUT: &str = "protectedSessionTimeout";
pub const PASSWORD_VERIFICATION_SALT: &str = "passwordVerificationSalt";
pub const PASSWORD_VERIFICATION_HASH: &str = "passwordVerificationHash";
pub const PASSWORD_DERIVED_KEY_SALT: &str = "passwordDerivedKeySalt";
pub const ENCRYPTED_DATA_KEY: &str = "encryptedDataKey";

pub const DEFAULT_PROTECTED_SESSION_TIMEOUT_SECS: u64 = 600;

pub fn get(conn: &Connection, name: &str) -> StoreResult<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM options WHERE name = ?1", [name], |row| {
            row.get::<_, String>(0)
        })
        .optional()?;
    Ok(value)
}

pub fn set(conn: &Connection, name: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO options (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        params![name, value],
    )?;
    Ok(())
}

/// Inserts `value` only if the option has never been set.
pub fn init_default(conn: &Connection, name: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO options (name, value) VALUES (?1, ?2)",
        params![name, value],
    )?;
    Ok(())
}

/// Reads a numeric option.
pub fn get_u64(conn: &Connection, name: &str) -> StoreResult<Option<u64>> {
    get(conn, name)?
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|_| StoreError::Corrupt(format!("option {name} is not a number: {value}")))
        })
        .transpose()
}

/// Protected session timeout in seconds.
pub fn session_timeout_secs(conn: &Connection) -> StoreResult<u64> {
    Ok(get_u64(conn, PROTECTED_SESSION_TIMEOUT)?.unwrap_or(DEFAULT_PROTECTED_SESSION_TIMEOUT_SECS))
}

/// Loads the password material, or `None` if no password was ever set.
pub fn key_material(conn: &Connection) -> StoreResult<Option<KeyMaterial>> {
    let parts = (
        get(conn, PASSWORD_VERIFICATION_SALT)?,
        get(conn, PASSWORD_VERIFICATION_HASH)?,
        get(conn, PASSWORD_DERIVED_KEY_SALT)?,
        get(conn, ENCRYPTED_DATA_KEY)?,
    );
    match parts {
        (Some(verification_salt), Some(verification_hash), Some(derived_key_salt), Some(encrypted_data_key)) => {
            Ok(Some(KeyMaterial {
                verification_salt,
                verification_hash,
                derived_key_salt,
                encrypted_data_key,
            }))
        }
        (None, None, None, None) => Ok(None),
        _ => Err(StoreError::Corrupt(
            "password options are only partially set".to_string(),
        )),
    }
}

pub fn store_key_material(conn: &Connection, material: &KeyMaterial) -> StoreResult<()> {
    set(conn, PASSWORD_VERIFICATION_SALT, &material.verification_salt)?;
    set(conn, PASSWORD_VERIFICATION_HASH, &material.verification_hash)?;
    set(conn, PASSWORD_DERIVED_KEY_SALT, &material.derived_key_salt)?;
    set(conn, ENCRYPTED_DATA_KEY, &material.encrypted_data_key)?;
    Ok(())
}
