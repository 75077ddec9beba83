use minutelog_core::db::open_db_in_memory;
use minutelog_core::{
    Detail, InfoItem, MeetingSeries, Minutes, MinutesRepository, RepoError, SeriesRepository,
    SqliteMinutesRepository, SqliteSeriesRepository, SqliteTopicRepository, Topic, TopicRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn nested_topic(id: &str) -> Topic {
    let mut detail = Detail::new(format!("{id}-d1"), "detail text");
    detail.created_at = Some(10);
    detail.updated_at = Some(10);
    let mut item = InfoItem::new(format!("{id}-i1"), "item text");
    item.details.push(detail);
    let mut topic = Topic::new(id, "subject");
    topic.info_items.push(item);
    topic
}

#[test]
fn series_create_get_list_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSeriesRepository::try_new(&conn).unwrap();

    let mut series = MeetingSeries::new("weekly sync");
    series.first_minutes_id = Some(Uuid::from_u128(7));
    repo.create_series(&series).unwrap();

    let loaded = repo.get_series(series.id).unwrap().unwrap();
    assert_eq!(loaded, series);

    let all = repo.list_series().unwrap();
    assert_eq!(all, vec![series]);
}

#[test]
fn minutes_roundtrip_preserves_embedded_topics() {
    let conn = open_db_in_memory().unwrap();
    let series_repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let minutes_repo = SqliteMinutesRepository::try_new(&conn).unwrap();

    let series = MeetingSeries::new("retro");
    series_repo.create_series(&series).unwrap();

    let mut minutes = Minutes::new(series.id, 1_000);
    minutes.is_finalized = true;
    minutes.topics.push(nested_topic("t1"));
    minutes_repo.create_minutes(&minutes).unwrap();

    let loaded = minutes_repo.get_minutes(minutes.id).unwrap().unwrap();
    assert_eq!(loaded, minutes);
    assert_eq!(loaded.topics[0].info_items[0].details[0].created_at, Some(10));
}

#[test]
fn validated_topics_write_rejects_empty_strings_raw_write_accepts_them() {
    let conn = open_db_in_memory().unwrap();
    let series_repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let minutes_repo = SqliteMinutesRepository::try_new(&conn).unwrap();

    let series = MeetingSeries::new("planning");
    series_repo.create_series(&series).unwrap();
    let minutes = Minutes::new(series.id, 1_000);
    minutes_repo.create_minutes(&minutes).unwrap();

    // Historic imported data: empty detail text.
    let mut topic = nested_topic("t1");
    topic.info_items[0].details[0].text.clear();

    let err = minutes_repo
        .update_topics(minutes.id, std::slice::from_ref(&topic))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    minutes_repo
        .update_topics_raw(minutes.id, std::slice::from_ref(&topic))
        .unwrap();
    let loaded = minutes_repo.get_minutes(minutes.id).unwrap().unwrap();
    assert_eq!(loaded.topics[0].info_items[0].details[0].text, "");
}

#[test]
fn topics_update_on_missing_minutes_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let minutes_repo = SqliteMinutesRepository::try_new(&conn).unwrap();

    let missing = Uuid::from_u128(42);
    let err = minutes_repo.update_topics_raw(missing, &[]).unwrap_err();
    assert!(matches!(err, RepoError::MinutesNotFound(id) if id == missing));
}

#[test]
fn flat_topic_create_get_update_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    let topic = nested_topic("t1");
    repo.create_topic(&topic).unwrap();

    let mut loaded = repo.get_topic("t1").unwrap().unwrap();
    assert_eq!(loaded, topic);

    loaded.subject = "renamed".to_string();
    repo.update_topic(&loaded).unwrap();
    assert_eq!(repo.get_topic("t1").unwrap().unwrap().subject, "renamed");

    let err = repo.update_topic(&nested_topic("missing")).unwrap_err();
    assert!(matches!(err, RepoError::TopicNotFound(id) if id == "missing"));
}

#[test]
fn backfill_field_updates_tolerate_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTopicRepository::try_new(&conn).unwrap();

    assert!(!repo.apply_backfill("absent", 1, 2, &[]).unwrap());
    assert!(!repo.clear_backfill("absent", &[]).unwrap());

    repo.create_topic(&nested_topic("t1")).unwrap();
    assert!(repo.apply_backfill("t1", 1_000, 2_000, &[]).unwrap());

    let stamped = repo.get_topic("t1").unwrap().unwrap();
    assert_eq!(stamped.created_at, Some(1_000));
    assert_eq!(stamped.updated_at, Some(2_000));
    assert!(stamped.info_items.is_empty());

    assert!(repo.clear_backfill("t1", &stamped.info_items).unwrap());
    let cleared = repo.get_topic("t1").unwrap().unwrap();
    assert_eq!(cleared.created_at, None);
    assert_eq!(cleared.updated_at, None);
}

#[test]
fn repositories_reject_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    assert!(matches!(
        SqliteSeriesRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        })
    ));
    assert!(matches!(
        SqliteMinutesRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection { .. })
    ));
    assert!(matches!(
        SqliteTopicRepository::try_new(&conn),
        Err(RepoError::UninitializedConnection { .. })
    ));
}

#[test]
fn corrupt_topics_document_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let series_repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let minutes_repo = SqliteMinutesRepository::try_new(&conn).unwrap();

    let series = MeetingSeries::new("broken");
    series_repo.create_series(&series).unwrap();
    let minutes = Minutes::new(series.id, 1_000);
    minutes_repo.create_minutes(&minutes).unwrap();

    conn.execute(
        "UPDATE minutes SET topics = 'not json' WHERE id = ?1;",
        [minutes.id.to_string()],
    )
    .unwrap();

    let err = minutes_repo.get_minutes(minutes.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
