//! File-level tests for the post store and forecast file.

use chrono::NaiveDate;
use trendvision_core::{ForecastPoint, PostRecord};
use trendvision_store::{ForecastFile, PostStore, StoreError};

fn post(id: &str, created_at: i64) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        title: format!("Post {id}, with a comma"),
        selftext: "line one\nline two".to_string(),
        author: "author".to_string(),
        url: format!("https://example.com/{id}"),
        source_group: "technology".to_string(),
        score: 42,
        num_comments: 7,
        created_at,
        keyword: None,
        sentiment: None,
    }
}

#[test]
fn load_of_missing_file_is_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let store = PostStore::new(dir.path().join("reddit_posts.csv"));
    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::MissingInput { .. }), "got {err:?}");
    assert!(store.load_or_empty().unwrap().is_empty());
}

#[test]
fn unenriched_store_round_trips_without_derived_columns() {
    let dir = tempfile::tempdir().unwrap();
    let store = PostStore::new(dir.path().join("nested").join("reddit_posts.csv"));
    let records = vec![post("a", 1_700_000_000), post("b", 1_700_086_400)];

    store.save(&records).unwrap();
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(!raw.lines().next().unwrap().contains("keyword"));

    let loaded = store.load().unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn enriched_store_round_trips_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let store = PostStore::new(dir.path().join("reddit_posts.csv"));
    let mut a = post("a", 1_700_000_000);
    a.keyword = Some("rust compiler".to_string());
    a.sentiment = Some(0.123_456_789);
    let mut b = post("b", 1_700_000_100);
    b.keyword = Some(String::new());
    b.sentiment = Some(0.0);

    store.save(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(store.load().unwrap(), vec![a, b]);
}

#[test]
fn legacy_columns_and_extra_columns_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reddit_posts.csv");
    std::fs::write(
        &path,
        "id,title,score,url,num_comments,created_utc,selftext,subreddit,date,sentiment_light\n\
         p1,Hello world,10.0,https://x,3,1700000000.5,,technology,2023-11-14,0.1\n\
         ,no id,1,,0,1700000000,,technology,,\n\
         p2,Bad time,1,,0,not-a-time,,technology,,\n",
    )
    .unwrap();

    let records = PostStore::new(&path).load().unwrap();
    assert_eq!(records.len(), 1);
    let p1 = &records[0];
    assert_eq!(p1.id, "p1");
    assert_eq!(p1.score, 10);
    assert_eq!(p1.created_at, 1_700_000_000);
    assert_eq!(p1.source_group, "technology");
    assert_eq!(p1.author, "");
    assert_eq!(p1.keyword, None);
    assert_eq!(p1.sentiment, None);
}

#[test]
fn non_numeric_sentiment_loads_as_neutral() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reddit_posts.csv");
    std::fs::write(
        &path,
        "id,title,created_at,keyword,sentiment\n\
         p1,One,1700000000,ai,oops\n\
         p2,Two,1700000000,,\n",
    )
    .unwrap();

    let records = PostStore::new(&path).load().unwrap();
    assert_eq!(records[0].sentiment, Some(0.0));
    assert_eq!(records[0].keyword.as_deref(), Some("ai"));
    assert_eq!(records[1].sentiment, None);
    assert_eq!(records[1].keyword, None);
}

#[test]
fn unenriched_rows_stay_unenriched_next_to_enriched_ones() {
    let dir = tempfile::tempdir().unwrap();
    let store = PostStore::new(dir.path().join("reddit_posts.csv"));
    let mut enriched = post("a", 1_700_000_000);
    enriched.keyword = Some(String::new());
    enriched.sentiment = Some(0.0);
    let fresh = post("b", 1_700_000_100);
    store.save(&[enriched.clone(), fresh.clone()]).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded[0], enriched);
    assert!(loaded[0].is_enriched());
    assert_eq!(loaded[1], fresh);
    assert!(!loaded[1].is_enriched());
}

#[test]
fn merge_and_save_keeps_existing_enrichment() {
    let dir = tempfile::tempdir().unwrap();
    let store = PostStore::new(dir.path().join("reddit_posts.csv"));
    let mut enriched = post("a", 1_700_000_000);
    enriched.keyword = Some("gpu".to_string());
    enriched.sentiment = Some(0.4);
    store.save(std::slice::from_ref(&enriched)).unwrap();

    let report = store
        .merge_and_save(vec![post("a", 1_700_000_000), post("b", 1_700_000_000)])
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.duplicates, 1);

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], enriched);
    assert_eq!(loaded[1].id, "b");
}

#[test]
fn forecast_file_overwrites_and_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let file = ForecastFile::new(dir.path().join("forecast.csv"));
    assert!(file.read_or_empty().unwrap().is_empty());

    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let first = vec![
        ForecastPoint {
            date: day,
            predicted_count: 3.0,
        },
        ForecastPoint {
            date: day.succ_opt().unwrap(),
            predicted_count: 4.5,
        },
    ];
    file.write(&first).unwrap();
    file.write(&first[..1]).unwrap();

    assert_eq!(file.read_or_empty().unwrap(), first[..1].to_vec());
}

#[test]
fn forecast_file_reads_ds_yhat_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.csv");
    std::fs::write(&path, "ds,yhat\n2024-01-01 00:00:00,12.5\nbad,1\n").unwrap();

    let points = ForecastFile::new(&path).read_or_empty().unwrap();
    assert_eq!(
        points,
        vec![ForecastPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            predicted_count: 12.5,
        }]
    );
}
