use std::{collections::BTreeSet, time::Duration};

use futures::future::join_all;
use serde_json::json;
use tower::{Service, ServiceBuilder, timeout::TimeoutLayer};

use crate::records::{
    api::{ApiRequest, ApiResponse},
    error::RecordError,
    infrastructure::{selection::FieldSelection, value::FieldValue},
    init_records,
};

use super::fixtures::{order_payload, user_payload};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn integration_concurrent_creates_get_distinct_ids() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let orders_count = 50;
    let users_count = 20;
    let api = init_records();

    let mut tasks = Vec::new();
    for quantity in 1..=orders_count {
        let mut api = api.clone();
        tasks.push(tokio::spawn(async move {
            create!(api, "order", order_payload(json!([quantity]), json!(quantity), "X"))
        }));
    }
    for index in 0..users_count {
        let mut api = api.clone();
        tasks.push(tokio::spawn(async move {
            create!(api, "user_profile", user_payload("U", "u@x.com", index, &[]))
        }));
    }

    let records: Vec<_> =
        join_all(tasks).await.into_iter().map(|joined| joined.unwrap()).collect();

    let order_ids: BTreeSet<u64> =
        records.iter().filter(|record| record.resource() == "order").map(|r| r.id()).collect();
    let user_ids: BTreeSet<u64> = records
        .iter()
        .filter(|record| record.resource() == "user_profile")
        .map(|r| r.id())
        .collect();
    assert_eq!(order_ids, (1..=orders_count as u64).collect());
    assert_eq!(user_ids, (1..=users_count as u64).collect());

    // every derived total matches the quantity its order was created with
    for record in records.iter().filter(|record| record.resource() == "order") {
        let quantity = record.get("quantity").and_then(FieldValue::as_integer).unwrap();
        assert_eq!(record.get("total"), Some(&FieldValue::Integer(quantity * 1000)));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn integration_concurrent_reads_during_creates() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let rounds = 30;
    let mut api = init_records();
    let first = create!(api, "order", order_payload(json!([1, 2]), json!(1), "X"));

    let mut writers = Vec::new();
    let mut readers = Vec::new();
    for round in 0..rounds {
        let mut writer = api.clone();
        writers.push(tokio::spawn(async move {
            create!(writer, "order", order_payload(json!([round]), json!(2), "Y"))
        }));
        let mut reader = api.clone();
        readers.push(tokio::spawn(async move {
            read!(reader, "order", 1, "id,products,total")
        }));
    }

    for reader in join_all(readers).await {
        let partial = reader.unwrap();
        assert_eq!(partial.names(), vec!["id", "products", "total"]);
        assert_eq!(partial.get("total"), Some(&FieldValue::Integer(1000)));
    }
    for writer in join_all(writers).await {
        let record = writer.unwrap();
        assert!(record.id() > first.id());
        // a published record is always complete
        assert_eq!(read!(api, "order", record.id()).len(), 6);
    }
}

#[tokio::test]
async fn integration_api_behind_timeout_layer() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = ServiceBuilder::new()
        .layer(TimeoutLayer::new(Duration::from_millis(100)))
        .service(init_records());

    let record = create!(api, "order", order_payload(json!([3]), json!(5), "Z"));
    assert_eq!(record.get("total"), Some(&FieldValue::Integer(5000)));
    assert_eq!(read!(api, "order", record.id(), "total").names(), vec!["total"]);

    let error = api
        .call(ApiRequest::Read {
            resource: "order".to_string(),
            id: 42,
            fields: FieldSelection::all(),
        })
        .await
        .unwrap_err();
    assert_eq!(error.downcast_ref::<RecordError>(), Some(&RecordError::RecordNotFound(42)));

    let response = api
        .call(ApiRequest::Read {
            resource: "order".to_string(),
            id: record.id(),
            fields: FieldSelection::parse("quantity"),
        })
        .await
        .unwrap();
    let ApiResponse::Found(partial) = response else {
        panic!("Expected ApiResponse::Found");
    };
    assert_eq!(partial.get("quantity"), Some(&FieldValue::Integer(5)));
}
