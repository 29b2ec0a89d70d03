//! SQLite JSON-blob adapter.
//!
//! # Responsibility
//! - Persist each entity as one `(id, data)` row of its kind's table.
//! - Translate `QueryParams` into `json_extract` equality predicates.
//!
//! # Invariants
//! - `data` always holds the full entity with `id` equal to the row key.
//! - Scans return rows in insertion order.
//! - Every repository borrows the same connection, so writes are serialized.

use super::{require_id, Collector, EntityStore, RepoError, RepoResult};
use crate::identity::new_identity;
use crate::model::Entity;
use crate::query::{QueryParams, QueryValue};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;

/// SQLite-backed store for entity kind `T`.
pub struct SqliteRepo<'conn, T> {
    conn: &'conn Connection,
    _kind: PhantomData<fn() -> T>,
}

impl<'conn, T: Entity> SqliteRepo<'conn, T> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _kind: PhantomData,
        }
    }

    fn table(&self) -> &'static str {
        T::COLLECTION
    }

    fn insert(&self, entity: &T) -> RepoResult<()> {
        let id = entity.id();
        if id.is_empty() {
            return Err(RepoError::IdentifierExtractionFailure {
                collection: self.table(),
            });
        }
        let data = encode(entity)?;

        self.conn
            .execute(
                &format!("INSERT INTO {} (id, data) VALUES (?1, ?2);", self.table()),
                params![id, data],
            )
            .map_err(|err| map_write_error(err, self.table(), id))?;
        Ok(())
    }

    fn scan(
        &self,
        params: &QueryParams,
        limit: Option<u32>,
        collect: Collector<'_, T>,
    ) -> RepoResult<usize> {
        let filter = SqlFilter::from_params(params);
        let mut sql = format!(
            "SELECT data FROM {}{} ORDER BY rowid",
            self.table(),
            filter.clause
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql.push(';');

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(filter.binds))?;
        let mut delivered = 0usize;

        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            let entity = decode::<T>(&raw).inspect_err(|err| {
                error!(
                    "event=scan_decode module=repo status=error backend=sqlite collection={} delivered={} error={}",
                    self.table(),
                    delivered,
                    err
                );
            })?;
            delivered += 1;
            if collect(entity).is_break() {
                break;
            }
        }

        Ok(delivered)
    }

    fn first_match(&self, params: &QueryParams) -> RepoResult<Option<T>> {
        let mut found = None;
        self.scan(params, Some(1), &mut |entity| {
            found = Some(entity);
            std::ops::ControlFlow::Break(())
        })?;
        Ok(found)
    }
}

impl<T: Entity> EntityStore<T> for SqliteRepo<'_, T> {
    fn find_by_id(&self, id: &str) -> RepoResult<T> {
        require_id(self.table(), id)?;

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT data FROM {} WHERE id = ?1;", self.table()))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => {
                let raw: String = row.get(0)?;
                decode(&raw)
            }
            None => Err(RepoError::not_found(self.table(), "id", id)),
        }
    }

    fn find_by_field(&self, key: &str, value: &QueryValue) -> RepoResult<T> {
        let params = QueryParams::new().with(key, value.clone());
        self.first_match(&params)?
            .ok_or_else(|| RepoError::not_found(self.table(), key, value))
    }

    fn find_all_with_param(
        &self,
        params: &QueryParams,
        collect: Collector<'_, T>,
    ) -> RepoResult<()> {
        let delivered = self.scan(params, None, collect)?;
        debug!(
            "event=find_all module=repo status=ok backend=sqlite collection={} keys={} delivered={}",
            self.table(),
            params.keys_summary(),
            delivered
        );
        Ok(())
    }

    fn store(&self, mut entity: T) -> RepoResult<T> {
        if !entity.has_id() {
            entity.set_id(new_identity());
        }
        self.insert(&entity)?;
        debug!(
            "event=store module=repo status=ok backend=sqlite collection={} id={}",
            self.table(),
            entity.id()
        );
        Ok(entity)
    }

    fn update(&self, entity: &T, id: &str) -> RepoResult<()> {
        require_id(self.table(), id)?;
        let data = encode_with_id(entity, id)?;

        let changed = self.conn.execute(
            &format!("UPDATE {} SET data = ?1 WHERE id = ?2;", self.table()),
            params![data, id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(self.table(), "id", id));
        }

        debug!(
            "event=update module=repo status=ok backend=sqlite collection={} id={}",
            self.table(),
            id
        );
        Ok(())
    }

    fn update_by_field(&self, entity: &T, key: &str, value: &QueryValue) -> RepoResult<()> {
        let new_id = entity.id();
        if new_id.is_empty() {
            return Err(RepoError::IdentifierExtractionFailure {
                collection: self.table(),
            });
        }
        let data = encode(entity)?;
        let table = self.table();
        let filter = SqlFilter::from_params(&QueryParams::new().with(key, value.clone()));
        let mut binds = vec![Value::Text(new_id.to_string()), Value::Text(data)];
        binds.extend(filter.binds);

        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {table}
                     SET id = ?, data = ?
                     WHERE id = (
                        SELECT id FROM {table}{}
                        ORDER BY rowid
                        LIMIT 1
                     );",
                    filter.clause
                ),
                params_from_iter(binds),
            )
            .map_err(|err| map_write_error(err, table, new_id))?;
        if changed == 0 {
            return Err(RepoError::not_found(table, key, value));
        }

        debug!(
            "event=update_by_field module=repo status=ok backend=sqlite collection={} key={} id={}",
            table, key, new_id
        );
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        require_id(self.table(), id)?;
        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", self.table()),
            [id],
        )?;
        debug!(
            "event=delete module=repo status=ok backend=sqlite collection={} id={} removed={}",
            self.table(),
            id,
            removed
        );
        Ok(())
    }

    fn drop_collection(&self) -> RepoResult<()> {
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {};", self.table()), [])?;
        debug!(
            "event=drop module=repo status=ok backend=sqlite collection={} removed={}",
            self.table(),
            removed
        );
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", self.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// `WHERE` clause plus positional binds for a parameter list.
#[derive(Debug, PartialEq)]
struct SqlFilter {
    clause: String,
    binds: Vec<Value>,
}

impl SqlFilter {
    fn from_params(params: &QueryParams) -> Self {
        if params.is_empty() {
            return Self {
                clause: String::new(),
                binds: Vec::new(),
            };
        }

        let mut predicates = Vec::with_capacity(params.len());
        let mut binds = Vec::with_capacity(params.len() * 3);
        for param in params.params() {
            predicates.push(push_predicate(&param.key, &param.value, &mut binds));
        }

        Self {
            clause: format!(" WHERE {}", predicates.join(" AND ")),
            binds,
        }
    }
}

/// Equality on one JSON member, typed the way a document store compares.
///
/// Booleans only match JSON `true`/`false`; numbers only match JSON numbers;
/// text only matches JSON strings.
fn push_predicate(key: &str, value: &QueryValue, binds: &mut Vec<Value>) -> &'static str {
    let Some(path) = json_path(key) else {
        return "0";
    };
    match value {
        QueryValue::Bool(flag) => {
            binds.push(Value::Text(path));
            binds.push(Value::Text(flag.to_string()));
            "json_type(data, ?) = ?"
        }
        QueryValue::Text(text) => {
            binds.push(Value::Text(path.clone()));
            binds.push(Value::Text(path));
            binds.push(Value::Text(text.clone()));
            "(json_type(data, ?) = 'text' AND json_extract(data, ?) = ?)"
        }
        QueryValue::Integer(number) => {
            binds.push(Value::Text(path.clone()));
            binds.push(Value::Text(path));
            binds.push(Value::Integer(*number));
            "(json_type(data, ?) IN ('integer', 'real') AND json_extract(data, ?) = ?)"
        }
        QueryValue::Float(number) => {
            binds.push(Value::Text(path.clone()));
            binds.push(Value::Text(path));
            binds.push(Value::Real(*number));
            "(json_type(data, ?) IN ('integer', 'real') AND json_extract(data, ?) = ?)"
        }
    }
}

/// JSON path for a dotted key, one quoted label per segment.
///
/// `None` when a segment is empty or holds a `"`: SQLite labels cannot
/// carry one, and no stored member can match such a key.
fn json_path(key: &str) -> Option<String> {
    let mut path = String::from("$");
    for segment in key.split('.') {
        if segment.is_empty() || segment.contains('"') {
            return None;
        }
        path.push_str(".\"");
        path.push_str(segment);
        path.push('"');
    }
    Some(path)
}

fn encode<T: Entity>(entity: &T) -> RepoResult<String> {
    serde_json::to_string(entity).map_err(|err| RepoError::encode(T::COLLECTION, err))
}

fn encode_with_id<T: Entity>(entity: &T, id: &str) -> RepoResult<String> {
    let mut payload =
        serde_json::to_value(entity).map_err(|err| RepoError::encode(T::COLLECTION, err))?;
    if let JsonValue::Object(fields) = &mut payload {
        fields.insert("id".to_string(), JsonValue::String(id.to_string()));
    }
    Ok(payload.to_string())
}

/// Overlays the stored fields onto a blank instance, then deserializes.
fn decode<T: Entity>(raw: &str) -> RepoResult<T> {
    let stored: JsonValue =
        serde_json::from_str(raw).map_err(|err| RepoError::decode(T::COLLECTION, err))?;
    let mut target =
        serde_json::to_value(T::blank()).map_err(|err| RepoError::decode(T::COLLECTION, err))?;

    match (&mut target, stored) {
        (JsonValue::Object(base), JsonValue::Object(fields)) => base.extend(fields),
        (_, other) => {
            return Err(RepoError::decode(
                T::COLLECTION,
                format!("expected a JSON object, found `{other}`"),
            ))
        }
    }

    serde_json::from_value(target).map_err(|err| RepoError::decode(T::COLLECTION, err))
}

fn map_write_error(err: rusqlite::Error, table: &'static str, id: &str) -> RepoError {
    let duplicate = matches!(
        &err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    );
    if duplicate {
        RepoError::DuplicateId {
            collection: table,
            id: id.to_string(),
        }
    } else {
        err.into()
    }
}
