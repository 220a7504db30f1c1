mod concurrency;

use serde_json::json;
use tower::Service;

use crate::records::{
    api::{ApiRequest, ApiResponse},
    error::RecordError,
    infrastructure::{
        schema::{Check, DeriveRule, FieldDef, FieldKind, FieldSpec},
        selection::FieldSelection,
        validation::{Violation, ViolationKind, ViolationList},
        value::{FieldValue, PartialRecord},
    },
    init_records, init_records_with,
};
use fixtures::{order_payload, user_payload};

#[tokio::test]
async fn integration_create_order_scenario() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();

    let record = create!(api, "order", order_payload(json!([1, 2, 3]), json!(2), "X"));

    let rendered = serde_json::to_value(&record).unwrap();
    assert_eq!(
        rendered,
        json!({
            "id": 1,
            "products": [1, 2, 3],
            "quantity": 2,
            "shipping_address": "X",
            "total": 2000,
            "created_at": record.created_at()
        })
    );
    assert_eq!(
        serde_json::to_string(&record).unwrap(),
        format!(
            r#"{{"id":1,"products":[1,2,3],"quantity":2,"shipping_address":"X","total":2000,"created_at":{}}}"#,
            record.created_at()
        )
    );
}

#[tokio::test]
async fn integration_create_then_read_is_deeply_equal() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();

    let order = create!(api, "order", order_payload(json!([7]), json!(4), "Y"));
    assert_eq!(read!(api, "order", order.id()), PartialRecord::from(&order));

    let user = create!(api, "user_profile", user_payload("A", "a@x.com", 30, &["p", "q"]));
    assert_eq!(read!(api, "user_profile", user.id()), PartialRecord::from(&user));
}

#[tokio::test]
async fn integration_empty_products_is_rejected() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();

    let err = api
        .call(ApiRequest::Create {
            resource: "order".to_string(),
            payload: order_payload(json!([]), json!(2), "X"),
        })
        .await
        .unwrap_err();
    let RecordError::ValidationFailed(violations) = &err else {
        panic!("Expected RecordError::ValidationFailed");
    };
    assert_eq!(err.code(), "VALIDATION_FAILED");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations.violations()[0].kind, ViolationKind::InvalidValue);
    assert_eq!(violations.violations()[0].field, "products");

    // nothing was admitted
    assert_eq!(
        api.call(ApiRequest::Read {
            resource: "order".to_string(),
            id: 1,
            fields: FieldSelection::all()
        })
        .await
        .unwrap_err(),
        RecordError::RecordNotFound(1)
    );
}

#[tokio::test]
async fn integration_zero_quantity_is_rejected() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();

    assert_eq!(
        api.call(ApiRequest::Create {
            resource: "order".to_string(),
            payload: order_payload(json!([1]), json!(0), "X"),
        })
        .await
        .unwrap_err(),
        RecordError::ValidationFailed(
            ViolationList::from_violations([Violation::invalid("quantity", "must be at least 1")])
                .unwrap()
        )
    );
}

#[tokio::test]
async fn integration_missing_field_never_reaches_store() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();

    for missing in ["products", "quantity", "shipping_address"] {
        let mut payload = order_payload(json!([1]), json!(1), "X");
        payload.as_object_mut().unwrap().remove(missing);
        assert_eq!(
            api.call(ApiRequest::Create { resource: "order".to_string(), payload })
                .await
                .unwrap_err(),
            RecordError::ValidationFailed(
                ViolationList::from_violations([Violation::missing(missing)]).unwrap()
            )
        );
    }

    // the first admitted order still gets id 1
    let record = create!(api, "order", order_payload(json!([1]), json!(1), "X"));
    assert_eq!(record.id(), 1);
}

#[tokio::test]
async fn integration_read_unknown_id() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();
    create!(api, "order", order_payload(json!([1]), json!(1), "X"));

    let err = api
        .call(ApiRequest::Read {
            resource: "order".to_string(),
            id: 999,
            fields: FieldSelection::all(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, RecordError::RecordNotFound(999));
    assert_eq!(err.code(), "RECORD_NOT_FOUND");
}

#[tokio::test]
async fn integration_user_projection_scenario() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();
    let user = create!(api, "user_profile", user_payload("A", "a@x.com", 30, &["p", "q"]));
    assert_eq!(user.id(), 1);

    let partial = read!(api, "user_profile", 1, "email,name");
    assert_eq!(
        partial.entries(),
        &[
            ("name".to_string(), FieldValue::Text("A".to_string())),
            ("email".to_string(), FieldValue::Text("a@x.com".to_string())),
        ]
    );
    assert_eq!(serde_json::to_string(&partial).unwrap(), r#"{"name":"A","email":"a@x.com"}"#);

    // request order, duplicates and unknown names do not change the view
    assert_eq!(read!(api, "user_profile", 1, "name,email,name,nickname"), partial);
    assert!(read!(api, "user_profile", 1, "nickname").is_empty());
}

#[tokio::test]
async fn integration_malformed_selector_returns_empty_view() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();
    let user = create!(api, "user_profile", user_payload("A", "a@x.com", 30, &["p"]));

    assert!(read!(api, "user_profile", user.id(), "nickname").is_empty());
    assert!(read!(api, "user_profile", user.id(), "bad-name").is_empty());
    assert_eq!(read!(api, "user_profile", user.id(), " , ").len(), 6);
}

#[tokio::test]
async fn integration_resources_have_independent_id_sequences() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records();

    let first_order = create!(api, "order", order_payload(json!([1]), json!(1), "X"));
    let first_user = create!(api, "user_profile", user_payload("A", "a@x.com", 30, &[]));
    let second_order = create!(api, "order", order_payload(json!([2]), json!(1), "X"));

    assert_eq!(first_order.id(), 1);
    assert_eq!(first_user.id(), 1);
    assert_eq!(second_order.id(), 2);
}

#[tokio::test]
async fn integration_custom_resource_with_product_derivation() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let line_items = FieldSpec::builder("line_item")
        .field(FieldDef::required("sku", FieldKind::Text).rule(Check::MinLength(3)))
        .field(FieldDef::required("quantity", FieldKind::Integer).rule(Check::MinValue(1)))
        .field(FieldDef::required("unit_price", FieldKind::Integer).rule(Check::MinValue(0)))
        .field(FieldDef::optional("tags", FieldKind::TextList).rule(Check::MaxLength(3)))
        .derive(
            "subtotal",
            DeriveRule::Product { left: "quantity".to_string(), right: "unit_price".to_string() },
        )
        .derive("sku_length", DeriveRule::Length { source: "sku".to_string() })
        .build()
        .unwrap();
    let mut api = init_records_with([line_items]);

    let record = create!(
        api,
        "line_item",
        json!({"sku": "ABC-1", "quantity": 3, "unit_price": 250, "discount": 99})
    );
    assert_eq!(
        PartialRecord::from(&record).names(),
        vec!["id", "sku", "quantity", "unit_price", "subtotal", "sku_length", "created_at"]
    );
    assert_eq!(record.get("subtotal"), Some(&FieldValue::Integer(750)));
    assert_eq!(record.get("sku_length"), Some(&FieldValue::Integer(5)));
    assert_eq!(record.get("discount"), None);

    assert_eq!(
        read!(api, "line_item", record.id(), "subtotal,id").names(),
        vec!["id", "subtotal"]
    );
    assert_eq!(
        api.call(ApiRequest::Create { resource: "order".to_string(), payload: json!({}) })
            .await
            .unwrap_err(),
        RecordError::UnknownResource("order".to_string())
    );
}

#[tokio::test]
async fn integration_strict_projection_stack() {
    #[cfg(feature = "recordkeep_tracing")]
    crate::recordkeep_tracing::init();
    let mut api = init_records().with_strict_projection(true);
    let order = create!(api, "order", order_payload(json!([1]), json!(3), "X"));

    assert_eq!(read!(api, "order", order.id(), "total").names(), vec!["total"]);
    assert_eq!(
        api.call(ApiRequest::Read {
            resource: "order".to_string(),
            id: order.id(),
            fields: FieldSelection::parse("total,unit_price"),
        })
        .await
        .unwrap_err(),
        RecordError::UnknownField("unit_price".to_string())
    );
    let response = api
        .call(ApiRequest::Read {
            resource: "order".to_string(),
            id: order.id(),
            fields: FieldSelection::all(),
        })
        .await
        .unwrap();
    assert_eq!(response, ApiResponse::Found(PartialRecord::from(&order)));
}
