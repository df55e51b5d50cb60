//! Integration tests for `CosmosOrderRepository`.
//!
//! These run the repository against an in-process fake of the Cosmos REST
//! surface so request signing, partition headers, continuation paging, and
//! the federated token exchange are covered without an account.

use std::io::Write as _;

use order_service::domain::ports::{OrderRepository, OrderRepositoryError};
use order_service::domain::{Order, OrderId, OrderItem, Status};
use order_service::outbound::persistence::{
    AmbientCredentialSource, CosmosOrderRepository, FederatedTokenConfig, PartitionKey,
    PartitionedAuth, PartitionedStoreConfig,
};
use rstest::rstest;
use serde_json::json;
use tempfile::NamedTempFile;
use url::Url;
use zeroize::Zeroizing;

#[path = "support/fake_cosmos.rs"]
mod fake_cosmos;

use fake_cosmos::{AcceptedCredential, CONTAINER, DATABASE, FakeCosmos};

const ACCOUNT_KEY: &[u8] = b"integration-account-key";

fn partition_key() -> PartitionKey {
    PartitionKey::new("storeId", "pets").expect("partition key")
}

fn shared_key_config(endpoint: Url, key: &[u8]) -> PartitionedStoreConfig {
    PartitionedStoreConfig {
        endpoint,
        database: DATABASE.to_owned(),
        container: CONTAINER.to_owned(),
        partition_key: partition_key(),
        auth: PartitionedAuth::SharedKey {
            account_key: Zeroizing::new(key.to_vec()),
        },
    }
}

fn order(id: u64, status: Status) -> Order {
    Order::pending(
        OrderId::from(id),
        format!("customer-{id}"),
        vec![OrderItem {
            product_id: 1,
            quantity: 2,
            price: 4.99,
        }],
    )
    .with_status(status)
}

async fn connected(fake: &FakeCosmos) -> CosmosOrderRepository {
    CosmosOrderRepository::connect(shared_key_config(fake.endpoint(), ACCOUNT_KEY))
        .await
        .expect("connect to fake cosmos")
}

fn sorted_ids(orders: &[Order]) -> Vec<String> {
    let mut ids: Vec<String> = orders.iter().map(|o| o.order_id.to_string()).collect();
    ids.sort();
    ids
}

#[actix_rt::test]
async fn duplicate_inserts_are_skipped() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    let repo = connected(&fake).await;

    let first = order(101, Status::Pending);
    repo.insert_orders(&[first.clone(), order(102, Status::Pending)])
        .await
        .expect("first insert");
    repo.insert_orders(&[first, order(103, Status::Pending)])
        .await
        .expect("redelivery tolerated");

    let pending = repo.get_pending_orders().await.expect("pending orders");
    assert_eq!(sorted_ids(&pending), ["101", "102", "103"]);
    assert_eq!(fake.state().partition("pets").len(), 3);
}

#[actix_rt::test]
async fn status_queries_return_only_matching_orders() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    let repo = connected(&fake).await;
    repo.insert_orders(&[
        order(1, Status::Pending),
        order(2, Status::Processing),
        order(3, Status::Complete),
        order(4, Status::Processing),
    ])
    .await
    .expect("insert");

    for status in Status::ALL {
        let expected: &[&str] = match status {
            Status::Pending => &["1"],
            Status::Processing => &["2", "4"],
            Status::Complete => &["3"],
        };
        let found = repo.get_orders_by_status(status).await.expect("query");
        assert_eq!(sorted_ids(&found), expected, "{status:?}");
        assert!(found.iter().all(|o| o.status == status));
    }
}

#[actix_rt::test]
async fn stored_documents_carry_id_and_partition_value() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    let repo = connected(&fake).await;
    repo.insert_orders(&[order(42, Status::Pending)])
        .await
        .expect("insert");

    let state = fake.state();
    let stored = state.partition("pets");
    let document = stored.first().expect("stored document");
    assert_eq!(document["id"], json!("42"));
    assert_eq!(document["orderId"], json!("42"));
    assert_eq!(document["storeId"], json!("pets"));
    assert_eq!(document["status"], json!(0));
    assert!(
        state.partition_headers.iter().all(|h| h == r#"["pets"]"#),
        "every document request names the configured partition"
    );
}

#[actix_rt::test]
async fn reads_are_scoped_to_the_configured_partition() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    fake.state().seed(
        "other-store",
        json!({
            "id": "7",
            "orderId": "7",
            "customerId": "elsewhere",
            "items": [],
            "status": 0,
            "storeId": "other-store",
        }),
    );
    let repo = connected(&fake).await;

    assert!(repo.get_pending_orders().await.expect("pending").is_empty());
    let err = repo
        .get_order(&OrderId::from(7))
        .await
        .expect_err("order lives in another partition");
    assert!(err.is_not_found());
}

#[actix_rt::test]
async fn query_results_follow_continuation_pages() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    fake.state().page_size = Some(2);
    let repo = connected(&fake).await;
    let orders: Vec<Order> = (1..=5).map(|id| order(id, Status::Pending)).collect();
    repo.insert_orders(&orders).await.expect("insert");

    let pending = repo.get_pending_orders().await.expect("pending");
    assert_eq!(sorted_ids(&pending), ["1", "2", "3", "4", "5"]);
    assert_eq!(fake.state().query_pages_served, 3);
}

#[actix_rt::test]
async fn update_then_read_returns_the_new_status() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    let repo = connected(&fake).await;
    let original = order(9, Status::Pending);
    repo.insert_orders(&[original.clone()]).await.expect("insert");

    let updated = original.with_status(Status::Complete);
    repo.update_order(&updated).await.expect("update");

    assert_eq!(repo.get_order(&OrderId::from(9)).await.expect("read"), updated);
    assert!(repo.get_pending_orders().await.expect("pending").is_empty());
}

#[rstest]
#[case::read(false)]
#[case::update(true)]
#[actix_rt::test]
async fn missing_orders_are_reported_as_not_found(#[case] update: bool) {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    let repo = connected(&fake).await;

    let err = if update {
        repo.update_order(&order(404, Status::Complete))
            .await
            .expect_err("update of missing order")
    } else {
        repo.get_order(&OrderId::from(404))
            .await
            .expect_err("read of missing order")
    };
    assert_eq!(err, OrderRepositoryError::not_found("404"));
    assert!(fake.state().partition("pets").is_empty());
}

#[actix_rt::test]
async fn wrong_account_key_is_a_connection_error() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");

    let err = CosmosOrderRepository::connect(shared_key_config(fake.endpoint(), b"not-the-key"))
        .await
        .expect_err("signature rejected");
    assert!(matches!(err, OrderRepositoryError::Connection { .. }), "{err:?}");
    assert_eq!(fake.state().rejected_requests, 1);
}

#[actix_rt::test]
async fn unknown_container_fails_at_startup() {
    let fake = FakeCosmos::start(AcceptedCredential::SharedKey(ACCOUNT_KEY.to_vec()))
        .expect("start fake");
    let mut config = shared_key_config(fake.endpoint(), ACCOUNT_KEY);
    config.container = "missing".to_owned();

    let result = CosmosOrderRepository::connect(config).await;
    assert!(result.is_err());
}

#[actix_rt::test]
async fn workload_identity_exchanges_the_projected_token_once() {
    let fake = FakeCosmos::start(AcceptedCredential::Token).expect("start fake");
    let mut token_file = NamedTempFile::new().expect("token file");
    writeln!(token_file, "projected-service-account-token").expect("write token");

    let config = PartitionedStoreConfig {
        auth: PartitionedAuth::WorkloadIdentity(AmbientCredentialSource::FederatedToken(
            FederatedTokenConfig {
                client_id: "order-service-client".to_owned(),
                tenant_id: "tenant-1".to_owned(),
                token_file: token_file.path().to_path_buf(),
                authority_host: fake.endpoint(),
            },
        )),
        ..shared_key_config(fake.endpoint(), ACCOUNT_KEY)
    };
    let repo = CosmosOrderRepository::connect(config)
        .await
        .expect("connect with workload identity");
    repo.insert_orders(&[order(5, Status::Pending)])
        .await
        .expect("insert");
    assert_eq!(
        repo.get_order(&OrderId::from(5)).await.expect("read").customer_id,
        "customer-5"
    );

    let state = fake.state();
    assert_eq!(state.token_requests.len(), 1, "token is cached");
    let request = &state.token_requests[0];
    assert_eq!(request["client_id"], "order-service-client");
    assert_eq!(request["client_assertion"], "projected-service-account-token");
    assert_eq!(request["grant_type"], "client_credentials");
    assert_eq!(request["scope"], "http://127.0.0.1/.default");
    assert_eq!(state.rejected_requests, 0);
}
