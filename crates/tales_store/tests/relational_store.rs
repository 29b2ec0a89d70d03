use rusqlite::Connection;
use std::collections::HashSet;
use std::ops::ControlFlow;
use tales_store::db::open_db_in_memory;
use tales_store::model::{Character, Item, Room, User};
use tales_store::repo::SqliteRepo;
use tales_store::{collect_matching, EntityStore, QueryParams, QueryValue, RepoError};
use uuid::Uuid;

fn room(name: &str) -> Room {
    Room::new(name)
}

#[test]
fn store_assigns_uuid_when_id_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    let first = repo.store(room("Tavern")).unwrap();
    let second = repo.store(room("Tavern")).unwrap();

    assert!(Uuid::parse_str(&first.id).is_ok());
    assert_ne!(first.id, second.id);
}

#[test]
fn store_and_import_preserve_caller_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    let mut seeded = room("Gate");
    seeded.id = "room-gate".to_string();
    assert_eq!(repo.store(seeded).unwrap().id, "room-gate");

    let mut imported = room("Keep");
    imported.id = "room-keep".to_string();
    assert_eq!(repo.import(imported).unwrap().id, "room-keep");

    assert_eq!(repo.find_by_id("room-keep").unwrap().name, "Keep");
}

#[test]
fn import_without_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    let err = repo.import(room("Nowhere")).unwrap_err();
    assert!(matches!(err, RepoError::InvalidIdentifier(_)));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn find_by_id_roundtrips_full_entity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Item>::new(&conn);

    let mut sword = Item::template("Short Sword");
    sword.item_type = "weapon".to_string();
    sword.level = 3;
    sword.properties.insert("damage".to_string(), "1d6".to_string());
    sword.attributes.insert("strength".to_string(), 2);
    sword.template_id = Some("tpl-1".to_string());

    let stored = repo.store(sword).unwrap();
    let loaded = repo.find_by_id(&stored.id).unwrap();
    assert_eq!(loaded, stored);
}

#[test]
fn find_by_id_with_empty_id_is_invalid() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    assert!(matches!(
        repo.find_by_id("").unwrap_err(),
        RepoError::InvalidIdentifier(_)
    ));
}

#[test]
fn find_by_field_returns_one_of_several_matches() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    repo.store(room("Tavern")).unwrap();
    repo.store(room("Market")).unwrap();
    repo.store(room("Tavern")).unwrap();

    let found = repo
        .find_by_field("name", &QueryValue::from("Tavern"))
        .unwrap();
    assert_eq!(found.name, "Tavern");

    let all = collect_matching(&repo, &QueryParams::new().with("name", "Tavern")).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|room| room.name == "Tavern"));
}

#[test]
fn find_by_field_without_match_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    repo.store(room("Market")).unwrap();

    let err = repo
        .find_by_field("name", &QueryValue::from("Tavern"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn multiple_params_are_anded() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Item>::new(&conn);

    let mut axe = Item::template("Axe");
    axe.item_type = "weapon".to_string();
    let mut bow = Item::new("Bow");
    bow.item_type = "weapon".to_string();
    let mut cap = Item::template("Cap");
    cap.item_type = "armor".to_string();
    for item in [axe, bow, cap] {
        repo.store(item).unwrap();
    }

    let params = QueryParams::new()
        .with("type", "weapon")
        .with("isTemplate", true);
    let found = collect_matching(&repo, &params).unwrap();
    let names: Vec<_> = found.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Axe"]);

    let by_level = collect_matching(&repo, &QueryParams::new().with("level", 1)).unwrap();
    assert_eq!(by_level.len(), 3);
}

#[test]
fn unknown_key_matches_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    repo.store(room("Tavern")).unwrap();

    let found = collect_matching(&repo, &QueryParams::new().with("noSuchField", "x")).unwrap();
    assert!(found.is_empty());
}

#[test]
fn dotted_key_matches_nested_member() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Character>::new(&conn);

    let mut rich = Character::new("u-1", "Rich");
    rich.inventory.gold = 50;
    repo.store(rich).unwrap();
    repo.store(Character::new("u-2", "Poor")).unwrap();

    let found =
        collect_matching(&repo, &QueryParams::new().with("inventory.gold", 50)).unwrap();
    let names: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Rich"]);

    let flat = collect_matching(&repo, &QueryParams::new().with("gold", 50)).unwrap();
    assert!(flat.is_empty());
}

#[test]
fn bool_and_integer_filters_do_not_cross_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Item>::new(&conn);
    repo.store(Item::new("Sword")).unwrap();
    repo.store(Item::template("Helm")).unwrap();

    let level_true = collect_matching(&repo, &QueryParams::new().with("level", true)).unwrap();
    assert!(level_true.is_empty());

    let template_one =
        collect_matching(&repo, &QueryParams::new().with("isTemplate", 1)).unwrap();
    assert!(template_one.is_empty());

    let templates =
        collect_matching(&repo, &QueryParams::new().with("isTemplate", true)).unwrap();
    assert_eq!(templates.len(), 1);
    let plain = collect_matching(&repo, &QueryParams::new().with("isTemplate", false)).unwrap();
    assert_eq!(plain[0].name, "Sword");
}

#[test]
fn key_with_quote_matches_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Item>::new(&conn);
    repo.store(Item::new("Sword")).unwrap();

    let found = collect_matching(&repo, &QueryParams::new().with("na\"me", "Sword")).unwrap();
    assert!(found.is_empty());

    let err = repo
        .find_by_field("na\"me", &QueryValue::from("Sword"))
        .unwrap_err();
    assert!(err.is_not_found());

    let mut renamed = Item::new("Blade");
    renamed.id = "i-blade".to_string();
    let err = repo
        .update_by_field(&renamed, "na\"me", &QueryValue::from("Sword"))
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn text_filter_does_not_match_numbers() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Item>::new(&conn);
    repo.store(Item::new("Sword")).unwrap();

    let found = collect_matching(&repo, &QueryParams::new().with("level", "1")).unwrap();
    assert!(found.is_empty());
}

#[test]
fn find_all_on_empty_table_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    let mut seen = 0;
    repo.find_all(&mut |_room| {
        seen += 1;
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(seen, 0);
}

#[test]
fn collector_can_stop_scan_early() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    for name in ["A", "B", "C", "D"] {
        repo.store(room(name)).unwrap();
    }

    let mut names = Vec::new();
    repo.find_all(&mut |room| {
        names.push(room.name);
        if names.len() == 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .unwrap();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn decode_failure_aborts_scan_after_delivering_earlier_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    repo.store(room("Tavern")).unwrap();
    insert_raw(&conn, "rooms", "bad", r#"{"id":"bad","name":42}"#);
    repo.store(room("Market")).unwrap();

    let mut delivered = Vec::new();
    let err = repo
        .find_all(&mut |room| {
            delivered.push(room.name);
            ControlFlow::Continue(())
        })
        .unwrap_err();

    assert!(matches!(err, RepoError::DecodeFailure { .. }));
    assert_eq!(delivered, vec!["Tavern"]);
    assert!(matches!(
        repo.find_by_id("bad").unwrap_err(),
        RepoError::DecodeFailure { .. }
    ));
}

#[test]
fn stored_record_missing_fields_decodes_with_blank_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    insert_raw(&conn, "rooms", "old", r#"{"id":"old","name":"Cellar"}"#);

    let loaded = repo.find_by_id("old").unwrap();
    assert_eq!(loaded.name, "Cellar");
    assert!(loaded.exits.is_empty());
    assert!(loaded.area.is_empty());
}

#[test]
fn duplicate_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    let stored = repo.store(room("Tavern")).unwrap();
    let mut copy = room("Copy");
    copy.id = stored.id.clone();

    match repo.store(copy).unwrap_err() {
        RepoError::DuplicateId { collection, id } => {
            assert_eq!(collection, "rooms");
            assert_eq!(id, stored.id);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn update_keeps_stored_id_even_when_payload_differs() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    let stored = repo.store(room("Tavern")).unwrap();

    let mut changed = room("Renovated Tavern");
    changed.id = "something-else".to_string();
    repo.update(&changed, &stored.id).unwrap();

    let loaded = repo.find_by_id(&stored.id).unwrap();
    assert_eq!(loaded.id, stored.id);
    assert_eq!(loaded.name, "Renovated Tavern");
    assert!(repo.find_by_id("something-else").unwrap_err().is_not_found());
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_of_missing_record_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    let err = repo.update(&room("Ghost"), "missing").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn update_by_field_moves_record_to_new_ref_and_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<User>::new(&conn);
    let original = repo.store(User::new("ext-42")).unwrap();

    let mut replacement = original.clone();
    replacement.ref_id = "ext-99".to_string();
    replacement.nickname = "renamed".to_string();
    repo.update_by_field(&replacement, "refid", &QueryValue::from("ext-42"))
        .unwrap();

    let found = repo
        .find_by_field("refid", &QueryValue::from("ext-99"))
        .unwrap();
    assert_eq!(found.id, original.id);
    assert_eq!(found.nickname, "renamed");
    assert!(repo
        .find_by_field("refid", &QueryValue::from("ext-42"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn update_by_field_rewrites_row_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<User>::new(&conn);
    repo.store(User::new("ext-1")).unwrap();

    let mut replacement = User::new("ext-1");
    replacement.id = "user-fixed".to_string();
    repo.update_by_field(&replacement, "refid", &QueryValue::from("ext-1"))
        .unwrap();

    assert_eq!(repo.find_by_id("user-fixed").unwrap().ref_id, "ext-1");
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_by_field_requires_entity_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<User>::new(&conn);
    repo.store(User::new("ext-1")).unwrap();

    let err = repo
        .update_by_field(&User::new("ext-2"), "refid", &QueryValue::from("ext-1"))
        .unwrap_err();
    assert!(matches!(err, RepoError::IdentifierExtractionFailure { .. }));
}

#[test]
fn update_by_field_without_match_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<User>::new(&conn);

    let mut user = User::new("ext-1");
    user.id = "u-1".to_string();
    let err = repo
        .update_by_field(&user, "refid", &QueryValue::from("ext-1"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    let stored = repo.store(room("Tavern")).unwrap();

    repo.delete(&stored.id).unwrap();
    assert!(repo.find_by_id(&stored.id).unwrap_err().is_not_found());
    repo.delete(&stored.id).unwrap();
}

#[test]
fn drop_empties_table_but_keeps_it_usable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);
    for name in ["A", "B", "C"] {
        repo.store(room(name)).unwrap();
    }

    repo.drop_collection().unwrap();
    assert!(collect_matching(&repo, &QueryParams::new()).unwrap().is_empty());

    let again = repo.store(room("D")).unwrap();
    assert_eq!(repo.find_by_id(&again.id).unwrap().name, "D");
}

#[test]
fn ids_stay_unique_across_many_stores() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRepo::<Room>::new(&conn);

    let ids: HashSet<_> = (0..50)
        .map(|index| repo.store(room(&format!("Room {index}"))).unwrap().id)
        .collect();
    assert_eq!(ids.len(), 50);
    assert_eq!(repo.count().unwrap(), 50);
}

fn insert_raw(conn: &Connection, table: &str, id: &str, data: &str) {
    conn.execute(
        &format!("INSERT INTO {table} (id, data) VALUES (?1, ?2);"),
        [id, data],
    )
    .unwrap();
}
