//! MongoDB document adapter.
//!
//! # Responsibility
//! - Persist each entity as one document of its kind's collection.
//! - Translate `QueryParams` into native filter documents.
//!
//! # Invariants
//! - Every document carries both `_id` (native form of the ID) and `id`
//!   (the string ID). They always describe the same identifier.
//! - 24-hex IDs map to `ObjectId`; any other string is used verbatim, so a
//!   malformed ID simply matches nothing.
//! - Cursors are dropped on exhaustion, early stop, or decode failure.

use super::{require_id, Collector, EntityStore, RepoError, RepoResult};
use crate::model::Entity;
use crate::query::{QueryParams, QueryValue};
use log::{debug, error};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::sync::{Collection, Database};
use std::collections::HashSet;
use std::marker::PhantomData;

const DUPLICATE_KEY_CODE: i32 = 11000;
const NATIVE_ID_KEY: &str = "_id";

/// MongoDB-backed store for entity kind `T`.
pub struct DocumentRepo<T> {
    collection: Collection<Document>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Entity> DocumentRepo<T> {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection::<Document>(T::COLLECTION),
            _kind: PhantomData,
        }
    }

    fn name(&self) -> &'static str {
        T::COLLECTION
    }

    fn insert(&self, entity: &T) -> RepoResult<()> {
        let id = entity.id();
        if id.is_empty() {
            return Err(RepoError::IdentifierExtractionFailure {
                collection: self.name(),
            });
        }
        let document = encode(entity, id)?;
        self.collection
            .insert_one(document, None)
            .map_err(|err| map_write_error(err, self.name(), id))?;
        Ok(())
    }
}

impl<T: Entity> EntityStore<T> for DocumentRepo<T> {
    fn find_by_id(&self, id: &str) -> RepoResult<T> {
        require_id(self.name(), id)?;
        match self
            .collection
            .find_one(doc! { "_id": native_id(id) }, None)?
        {
            Some(document) => decode(document),
            None => Err(RepoError::not_found(self.name(), "id", id)),
        }
    }

    fn find_by_field(&self, key: &str, value: &QueryValue) -> RepoResult<T> {
        let filter = filter_document(&QueryParams::new().with(key, value.clone()));
        match self.collection.find_one(filter, None)? {
            Some(document) => decode(document),
            None => Err(RepoError::not_found(self.name(), key, value)),
        }
    }

    fn find_all_with_param(
        &self,
        params: &QueryParams,
        collect: Collector<'_, T>,
    ) -> RepoResult<()> {
        let cursor = self.collection.find(filter_document(params), None)?;
        let mut delivered = 0usize;

        for next in cursor {
            let entity = decode::<T>(next?).inspect_err(|err| {
                error!(
                    "event=scan_decode module=repo status=error backend=mongodb collection={} delivered={} error={}",
                    self.name(),
                    delivered,
                    err
                );
            })?;
            delivered += 1;
            if collect(entity).is_break() {
                break;
            }
        }

        debug!(
            "event=find_all module=repo status=ok backend=mongodb collection={} keys={} delivered={}",
            self.name(),
            params.keys_summary(),
            delivered
        );
        Ok(())
    }

    fn store(&self, mut entity: T) -> RepoResult<T> {
        if !entity.has_id() {
            entity.set_id(ObjectId::new().to_hex());
        }
        self.insert(&entity)?;
        debug!(
            "event=store module=repo status=ok backend=mongodb collection={} id={}",
            self.name(),
            entity.id()
        );
        Ok(entity)
    }

    fn update(&self, entity: &T, id: &str) -> RepoResult<()> {
        require_id(self.name(), id)?;
        let replacement = encode(entity, id)?;

        let result = self.collection.replace_one(
            doc! { "_id": native_id(id) },
            replacement,
            None,
        )?;
        if result.matched_count == 0 {
            return Err(RepoError::not_found(self.name(), "id", id));
        }

        debug!(
            "event=update module=repo status=ok backend=mongodb collection={} id={}",
            self.name(),
            id
        );
        Ok(())
    }

    fn update_by_field(&self, entity: &T, key: &str, value: &QueryValue) -> RepoResult<()> {
        let new_id = entity.id();
        if new_id.is_empty() {
            return Err(RepoError::IdentifierExtractionFailure {
                collection: self.name(),
            });
        }

        let filter = filter_document(&QueryParams::new().with(key, value.clone()));
        let existing = self
            .collection
            .find_one(filter, None)?
            .ok_or_else(|| RepoError::not_found(self.name(), key, value))?;
        let old_native = existing
            .get(NATIVE_ID_KEY)
            .cloned()
            .ok_or_else(|| RepoError::decode(self.name(), "stored document has no _id"))?;

        let replacement = encode(entity, new_id)?;
        let new_native = native_id(new_id);

        if old_native == new_native {
            self.collection.replace_one(
                doc! { "_id": old_native },
                replacement,
                None,
            )?;
        } else {
            // _id is immutable in MongoDB, so a changed ID means insert then remove.
            self.collection
                .insert_one(replacement, None)
                .map_err(|err| map_write_error(err, self.name(), new_id))?;
            self.collection
                .delete_one(doc! { "_id": old_native }, None)?;
        }

        debug!(
            "event=update_by_field module=repo status=ok backend=mongodb collection={} key={} id={}",
            self.name(),
            key,
            new_id
        );
        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        require_id(self.name(), id)?;
        let result = self
            .collection
            .delete_one(doc! { "_id": native_id(id) }, None)?;
        debug!(
            "event=delete module=repo status=ok backend=mongodb collection={} id={} removed={}",
            self.name(),
            id,
            result.deleted_count
        );
        Ok(())
    }

    fn drop_collection(&self) -> RepoResult<()> {
        let result = self.collection.delete_many(doc! {}, None)?;
        debug!(
            "event=drop module=repo status=ok backend=mongodb collection={} removed={}",
            self.name(),
            result.deleted_count
        );
        Ok(())
    }

    fn count(&self) -> RepoResult<u64> {
        Ok(self.collection.count_documents(doc! {}, None)?)
    }
}

/// Native `_id` form of a string identifier.
pub(crate) fn native_id(id: &str) -> Bson {
    match ObjectId::parse_str(id) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => Bson::String(id.to_string()),
    }
}

/// Builds an AND filter. Repeated keys go through `$and` so none is lost.
fn filter_document(params: &QueryParams) -> Document {
    let mut seen = HashSet::new();
    let repeated = params
        .params()
        .iter()
        .any(|param| !seen.insert(param.key.as_str()));

    if repeated {
        let clauses: Vec<Bson> = params
            .params()
            .iter()
            .map(|param| {
                let mut clause = Document::new();
                clause.insert(param.key.clone(), to_bson(&param.value));
                Bson::Document(clause)
            })
            .collect();
        return doc! { "$and": clauses };
    }

    let mut filter = Document::new();
    for param in params.params() {
        filter.insert(param.key.clone(), to_bson(&param.value));
    }
    filter
}

fn to_bson(value: &QueryValue) -> Bson {
    match value {
        QueryValue::Text(text) => Bson::String(text.clone()),
        QueryValue::Bool(flag) => Bson::Boolean(*flag),
        QueryValue::Integer(number) => Bson::Int64(*number),
        QueryValue::Float(number) => Bson::Double(*number),
    }
}

/// Serializes `entity` under `id`, adding the native `_id`.
fn encode<T: Entity>(entity: &T, id: &str) -> RepoResult<Document> {
    let mut document =
        bson::to_document(entity).map_err(|err| RepoError::encode(T::COLLECTION, err))?;
    document.insert("id", id);
    document.insert(NATIVE_ID_KEY, native_id(id));
    Ok(document)
}

/// Overlays the stored fields (minus `_id`) onto a blank instance.
fn decode<T: Entity>(mut stored: Document) -> RepoResult<T> {
    stored.remove(NATIVE_ID_KEY);
    let mut target =
        bson::to_document(&T::blank()).map_err(|err| RepoError::decode(T::COLLECTION, err))?;
    for (key, value) in stored {
        target.insert(key, value);
    }
    bson::from_document(target).map_err(|err| RepoError::decode(T::COLLECTION, err))
}

fn map_write_error(err: mongodb::error::Error, collection: &'static str, id: &str) -> RepoError {
    let duplicate = matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    );
    if duplicate {
        RepoError::DuplicateId {
            collection,
            id: id.to_string(),
        }
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, filter_document, native_id};
    use crate::model::{Item, Room};
    use crate::query::QueryParams;
    use crate::repo::RepoError;
    use mongodb::bson::{doc, Bson};

    #[test]
    fn native_id_parses_object_id_hex() {
        let id = "65a1f0c2e4b0a1b2c3d4e5f6";
        match native_id(id) {
            Bson::ObjectId(oid) => assert_eq!(oid.to_hex(), id),
            other => panic!("expected ObjectId, got {other:?}"),
        }
    }

    #[test]
    fn native_id_keeps_other_strings_verbatim() {
        assert_eq!(
            native_id("server-settings"),
            Bson::String("server-settings".to_string())
        );
        assert_eq!(
            native_id("0e6f3b1c-6c7a-4f0b-9f4e-2d6f6b1c2a10"),
            Bson::String("0e6f3b1c-6c7a-4f0b-9f4e-2d6f6b1c2a10".to_string())
        );
    }

    #[test]
    fn filter_document_flattens_distinct_keys() {
        let params = QueryParams::new()
            .with("type", "weapon")
            .with("isTemplate", true)
            .with("level", 2);
        assert_eq!(
            filter_document(&params),
            doc! { "type": "weapon", "isTemplate": true, "level": 2_i64 }
        );
    }

    #[test]
    fn filter_document_keeps_repeated_keys_under_and() {
        let params = QueryParams::new().with("name", "a").with("name", "b");
        assert_eq!(
            filter_document(&params),
            doc! { "$and": [ { "name": "a" }, { "name": "b" } ] }
        );
    }

    #[test]
    fn filter_document_passes_dotted_and_quoted_keys_through() {
        let params = QueryParams::new()
            .with("inventory.gold", 50)
            .with("na\"me", "Sword");
        assert_eq!(
            filter_document(&params),
            doc! { "inventory.gold": 50_i64, "na\"me": "Sword" }
        );
    }

    #[test]
    fn filter_document_keeps_bool_and_integer_types_apart() {
        let params = QueryParams::new().with("level", true).with("isTemplate", 1);
        let filter = filter_document(&params);
        assert_eq!(filter.get("level"), Some(&Bson::Boolean(true)));
        assert_eq!(filter.get("isTemplate"), Some(&Bson::Int64(1)));
    }

    #[test]
    fn empty_params_match_everything() {
        assert!(filter_document(&QueryParams::new()).is_empty());
    }

    #[test]
    fn encode_mirrors_id_into_native_key() {
        let room = Room {
            id: "ignored".to_string(),
            ..Room::new("Tavern")
        };
        let document = encode(&room, "r-1").expect("encode room");
        assert_eq!(document.get_str("id").ok(), Some("r-1"));
        assert_eq!(document.get("_id"), Some(&Bson::String("r-1".to_string())));
    }

    #[test]
    fn decode_skips_native_id_and_fills_blank_fields() {
        let stored = doc! { "_id": "i-1", "id": "i-1", "name": "Sword", "type": "weapon" };
        let item: Item = decode(stored).expect("decode item");
        assert_eq!(item.id, "i-1");
        assert_eq!(item.item_type, "weapon");
        assert!(item.properties.is_empty());
    }

    #[test]
    fn decode_reports_type_mismatch() {
        let stored = doc! { "_id": "bad", "id": "bad", "name": 42 };
        let err = decode::<Room>(stored).expect_err("must fail");
        assert!(matches!(err, RepoError::DecodeFailure { .. }));
    }
}
