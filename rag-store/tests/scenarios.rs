use anyhow::Result;
use rag_store::{Chunk, CompressionStrategy, RAGStore, Testcase};

fn case(question: &str, timestamp: &str) -> Testcase {
    Testcase::new(question, timestamp)
}

#[tokio::test]
async fn two_question_scenario_shares_one_index() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = RAGStore::new("dataset", dir.path());

    let index = vec![Chunk::raw("A"), Chunk::raw("B")];
    let id1 = store
        .append(index.clone(), case("q1", "2026-01-01T00:00:00Z"))
        .await?;
    let id2 = store
        .append(index.clone(), case("q2", "2026-01-01T00:01:00Z"))
        .await?;

    assert_eq!(id1, id2);
    let questions = store.get_questions(&id1).await?;
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].question, "q1");
    assert_eq!(questions[1].question, "q2");
    assert_eq!(store.get_index(&id1).await?, index);
    Ok(())
}

#[tokio::test]
async fn ref_by_index_scenario_three_collections() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = RAGStore::new("dataset", dir.path()).with_strategy(CompressionStrategy::RefByIndex);

    let s1 = vec![Chunk::raw("one"), Chunk::raw("two")];
    let s2 = vec![Chunk::raw("one"), Chunk::raw("three")];
    let s3 = vec![Chunk::raw("two"), Chunk::raw("three")];

    let id1 = store.append(s1.clone(), case("q1", "t1")).await?;
    let id2 = store.append(s2.clone(), case("q2", "t2")).await?;
    let id3 = store.append(s3.clone(), case("q3", "t3")).await?;

    assert_eq!(store.get_index(&id1).await?, s1);
    assert_eq!(store.get_index(&id2).await?, s2);
    assert_eq!(store.get_index(&id3).await?, s3);
    Ok(())
}

#[tokio::test]
async fn empty_index_fingerprints_to_zero() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = RAGStore::new("dataset", dir.path());

    let id = store.append(vec![], case("empty-q", "t")).await?;
    assert_eq!(id, "0");
    assert_eq!(store.get_index("0").await?, Vec::<Chunk>::new());
    Ok(())
}

#[tokio::test]
async fn ref_by_source_strategy_round_trips_and_persists() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().to_path_buf();

    let s1 = vec![Chunk::raw("shared"), Chunk::raw("unique-one")];
    let s2 = vec![Chunk::raw("shared"), Chunk::raw("unique-two")];
    let id1;
    let id2;
    {
        let store = RAGStore::new("dataset", &path).with_strategy(CompressionStrategy::RefBySource);
        id1 = store.append(s1.clone(), case("q1", "t1")).await?;
        id2 = store.append(s2.clone(), case("q2", "t2")).await?;
    }

    // Reopen against the same directory: strategy tag recorded on disk
    // drives decompression, independent of the facade's own default.
    let reopened = RAGStore::new("dataset", &path);
    assert_eq!(reopened.get_index(&id1).await?, s1);
    assert_eq!(reopened.get_index(&id2).await?, s2);
    Ok(())
}

#[tokio::test]
async fn legacy_field_names_load_transparently() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let dataset_path = dir.path().join("dataset_dataset.json");
    let testcase_path = dir.path().join("dataset_testcase.json");

    tokio::fs::write(
        &dataset_path,
        serde_json::to_vec(&serde_json::json!({
            "indexes": {"abc123": [{"kind": "raw", "text": "legacy chunk"}]},
            "compression": "ref_by_index",
        }))?,
    )
    .await?;
    tokio::fs::write(
        &testcase_path,
        serde_json::to_vec(&serde_json::json!({
            "questions": {"abc123": [{"question": "legacy q", "timestamp": "2020-01-01T00:00:00Z"}]}
        }))?,
    )
    .await?;

    let store = RAGStore::new("dataset", dir.path());
    assert_eq!(
        store.get_index("abc123").await?,
        vec![Chunk::raw("legacy chunk")]
    );
    assert_eq!(store.get_questions("abc123").await?[0].question, "legacy q");
    Ok(())
}
