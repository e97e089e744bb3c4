//! Tests against a live server with the search module loaded.
//!
//! Ignored by default. Run with
//! `REDIS_URL=redis://127.0.0.1:6379/ cargo test -- --ignored`.

use redisearch::aggregation::{AggregateRequest, reducers};
use redisearch::client::Client;
use redisearch::config::ClientConfig;
use redisearch::document::AddDocument;
use redisearch::error::Result;
use redisearch::query::Query;
use redisearch::schema::{Schema, TagField, TextField};
use redisearch::schema::IndexOptions;

fn connect(index: &str) -> Result<Client<redis::Connection>> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/".into());
    let config = ClientConfig::new(index).redis_url(url);
    let mut client = Client::connect(&config)?;
    // Leftovers from an earlier run.
    let _ = client.drop_index();
    Ok(client)
}

fn create_catalog(client: &mut Client<redis::Connection>) -> Result<()> {
    let schema = Schema::builder()
        .add_field("title", Box::new(TextField::new()))?
        .add_field("category", Box::new(TagField::new()))?
        .build()?;
    client.create_index(&schema, &IndexOptions::new())?;

    let mut indexer = client.batch_indexer();
    for (id, title, category) in [
        ("doc1", "hello world", "books"),
        ("doc2", "hello again", "books"),
        ("doc3", "goodbye", "music"),
    ] {
        indexer.add_document(
            &AddDocument::new(id)
                .add_text("title", title)
                .add_text("category", category),
        )?;
    }
    indexer.commit()?;
    Ok(())
}

#[test]
#[ignore]
fn test_live_search() -> Result<()> {
    let mut client = connect("redisearch_live_search")?;
    create_catalog(&mut client)?;

    let result = client.search(Query::new("hello"))?;
    assert_eq!(result.total, 2);

    client.drop_index()?;
    Ok(())
}

#[test]
#[ignore]
fn test_live_aggregate() -> Result<()> {
    let mut client = connect("redisearch_live_aggregate")?;
    create_catalog(&mut client)?;

    let request = AggregateRequest::new("*")
        .group_by(["@category"], [reducers::count().alias("count")?])?;
    let result = client.aggregate(&request)?;
    assert_eq!(result.rows.len(), 2);

    client.drop_index()?;
    Ok(())
}
