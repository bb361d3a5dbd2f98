//! Operator lifecycle and sequence-composition behavior.

use std::sync::Arc;
use std::time::Duration;

use driftq_common::{PipelineConfig, QueryId};
use driftq_execution::{
    launch, FieldPath, Operator, SendUpsert, SendUpsertPlan, Sequence,
};
use driftq_storage::MemoryKeyspace;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;

mod support;

fn coded_key() -> Arc<FieldPath> {
    Arc::new(FieldPath::parse("code").expect("path"))
}

fn upsert_into(
    keyspace: driftq_storage::SharedKeyspace,
    config: &PipelineConfig,
) -> driftq_execution::BoxedOperator {
    Box::new(SendUpsert::new(
        SendUpsertPlan::new(keyspace, Some(coded_key())),
        config,
    ))
}

#[tokio::test]
async fn run_once_performs_the_run_body_exactly_once() {
    let config = PipelineConfig::default();
    let keyspace = support::RecordingKeyspace::new("beers");
    let (ctx, _signals) =
        driftq_execution::ExecutionContext::new(config.clone(), QueryId(1));

    let mut op = SendUpsert::new(
        SendUpsertPlan::new(keyspace.clone(), Some(coded_key())),
        &config,
    );
    let (input_tx, input_rx) = mpsc::channel(8);
    op.set_input(input_rx);
    let _output = op.take_output().expect("output");

    for item in support::coded_items(&["a", "b"]) {
        input_tx.send(item).await.expect("send");
    }
    drop(input_tx);

    op.run_once(&ctx, None).await;
    op.run_once(&ctx, None).await;
    op.run_once(&ctx, None).await;

    assert_eq!(keyspace.batch_sizes(), vec![2]);
    assert_eq!(keyspace.inner().len().await, 2);
}

#[tokio::test]
async fn sequence_output_is_the_tail_emissions_in_order() {
    let config = PipelineConfig::default();
    let first = Arc::new(MemoryKeyspace::new("staging"));
    let second = Arc::new(MemoryKeyspace::new("final"));

    let root = Sequence::new(
        vec![
            upsert_into(first.clone(), &config),
            upsert_into(second.clone(), &config),
        ],
        &config,
    );
    let handle = launch(Box::new(root), config, QueryId(2)).expect("launch");
    for item in support::coded_items(&["a", "b", "c"]) {
        handle.input.send(item).await.expect("send");
    }

    let outcome = handle.finish().await;
    assert!(outcome.errors.is_empty());
    assert!(outcome.warnings.is_empty());

    let ids: Vec<_> = outcome
        .items
        .iter()
        .map(|item| item.attachment("meta").expect("meta")["id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
    assert_eq!(first.len().await, 3);
    assert_eq!(second.len().await, 3);
}

#[tokio::test]
async fn head_completion_with_zero_items_closes_the_sequence_output() {
    let config = PipelineConfig::default();
    let root = Sequence::new(
        vec![
            upsert_into(Arc::new(MemoryKeyspace::new("a")), &config),
            upsert_into(Arc::new(MemoryKeyspace::new("b")), &config),
        ],
        &config,
    );
    let handle = launch(Box::new(root), config, QueryId(3)).expect("launch");

    // No items at all: the head finishes on input closure and the shutdown
    // must still ripple through to the sequence output.
    let outcome = timeout(Duration::from_secs(5), handle.finish())
        .await
        .expect("pipeline must terminate");
    assert!(outcome.items.is_empty());
    assert!(outcome.errors.is_empty());
    assert!(!outcome.context.has_failed());
}

#[tokio::test]
async fn nested_sequences_complete_recursively() {
    let config = PipelineConfig::default();
    let staging = Arc::new(MemoryKeyspace::new("staging"));
    let fin = Arc::new(MemoryKeyspace::new("final"));

    let inner = Sequence::new(vec![upsert_into(staging.clone(), &config)], &config);
    let root = Sequence::new(
        vec![Box::new(inner), upsert_into(fin.clone(), &config)],
        &config,
    );

    let handle = launch(Box::new(root), config, QueryId(4)).expect("launch");
    for item in support::coded_items(&["x", "y"]) {
        handle.input.send(item).await.expect("send");
    }
    let outcome = timeout(Duration::from_secs(5), handle.finish())
        .await
        .expect("pipeline must terminate");

    assert_eq!(outcome.items.len(), 2);
    assert_eq!(staging.len().await, 2);
    assert_eq!(fin.len().await, 2);
}

#[tokio::test]
async fn empty_sequence_completes_immediately() {
    let config = PipelineConfig::default();
    let root = Sequence::new(Vec::new(), &config);
    let handle = launch(Box::new(root), config, QueryId(5)).expect("launch");
    // The root may already have completed; a failed send just means the
    // input was never consumed.
    let _ = handle.input.send(support::coded_items(&["a"]).remove(0)).await;

    let outcome = timeout(Duration::from_secs(5), handle.finish())
        .await
        .expect("pipeline must terminate");
    assert!(outcome.items.is_empty());
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn copies_run_independently_of_the_original() {
    let config = PipelineConfig::default();
    let keyspace = Arc::new(MemoryKeyspace::new("beers"));

    let original = Sequence::new(vec![upsert_into(keyspace.clone(), &config)], &config);
    let copy = original.boxed_copy();

    let original_handle =
        launch(Box::new(original), config.clone(), QueryId(6)).expect("launch original");
    let copy_handle = launch(copy, config.clone(), QueryId(7)).expect("launch copy");

    for item in support::coded_items(&["a", "b"]) {
        original_handle.input.send(item).await.expect("send");
    }
    for item in support::coded_items(&["c"]) {
        copy_handle.input.send(item).await.expect("send");
    }

    let first = original_handle.finish().await;
    let second = copy_handle.finish().await;
    assert_eq!(first.items.len(), 2);
    assert_eq!(second.items.len(), 1);
    // Plan configuration is shared between original and copy; channels and
    // run state are not, so both pipelines wrote to the one keyspace.
    assert_eq!(keyspace.len().await, 3);
}
