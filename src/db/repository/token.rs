//! Issued bearer tokens. Only the SHA-256 hash is stored; lookups
//! hash the presented token and compare.

use rusqlite::{params, Connection};

use crate::db::StoreError;
use crate::models::Role;

pub fn store_token(
    conn: &Connection,
    token_hash: &str,
    role: &Role,
    principal_id: &str,
    expires_at: &str,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO auth_tokens (token_hash, role, principal_id, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![token_hash, role.as_str(), principal_id, expires_at],
    )?;
    Ok(())
}

/// Resolve an unexpired token hash to its role and principal.
pub fn lookup_token(
    conn: &Connection,
    token_hash: &str,
) -> Result<Option<(Role, String)>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT role, principal_id FROM auth_tokens
         WHERE token_hash = ?1 AND expires_at > datetime('now')",
    )?;
    let mut rows = stmt.query_map(params![token_hash], |row| {
        let role: String = row.get(0)?;
        let principal: String = row.get(1)?;
        Ok((role, principal))
    })?;
    match rows.next() {
        Some(row) => {
            let (role, principal) = row?;
            let role = role.parse()?;
            Ok(Some((role, principal)))
        }
        None => Ok(None),
    }
}

/// Drop tokens past their expiry. Called opportunistically on login.
pub fn delete_expired_tokens(conn: &Connection) -> Result<usize, StoreError> {
    let affected = conn.execute(
        "DELETE FROM auth_tokens WHERE expires_at <= datetime('now')",
        [],
    )?;
    Ok(affected)
}
