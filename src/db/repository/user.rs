use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::User;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO users (id, name, email, password_hash, phone, date_of_birth)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            user.password_hash,
            user.phone,
            user.date_of_birth,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, password_hash, phone, date_of_birth
         FROM users WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id.to_string()], row_to_user)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, password_hash, phone, date_of_birth
         FROM users WHERE email = ?1",
    )?;
    let mut rows = stmt.query_map(params![email], row_to_user)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Every registered user. The patient sync walks this to backfill the
/// clinical store.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, password_hash, phone, date_of_birth FROM users",
    )?;
    let rows = stmt.query_map([], row_to_user)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

pub fn count_users(conn: &Connection) -> Result<i64, StoreError> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let id_str: String = row.get(0)?;

    Ok(User {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone: row.get(4)?,
        date_of_birth: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::directory::open_memory_directory_store;

    fn make_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Jane Roe".into(),
            email: email.into(),
            password_hash: "hash".into(),
            phone: Some("555-0100".into()),
            date_of_birth: Some("1990-04-12".into()),
        }
    }

    #[test]
    fn insert_and_find_by_email() {
        let conn = open_memory_directory_store().unwrap();
        let user = make_user("jane@example.com");
        insert_user(&conn, &user).unwrap();

        let found = find_user_by_email(&conn, "jane@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let conn = open_memory_directory_store().unwrap();
        insert_user(&conn, &make_user("jane@example.com")).unwrap();
        assert!(insert_user(&conn, &make_user("jane@example.com")).is_err());
    }

    #[test]
    fn list_returns_everyone() {
        let conn = open_memory_directory_store().unwrap();
        insert_user(&conn, &make_user("a@example.com")).unwrap();
        insert_user(&conn, &make_user("b@example.com")).unwrap();

        assert_eq!(list_users(&conn).unwrap().len(), 2);
        assert_eq!(count_users(&conn).unwrap(), 2);
    }
}
