//! Integration tests for the ARM client and adapters using wiremock
//!
//! These tests run adapters against mocked ARM endpoints, covering
//! pagination, error handling, caching and wildcard fan-out.

use azure_discovery::adapters::AdapterContext;
use azure_discovery::azure::auth::StaticToken;
use azure_discovery::azure::{format_arm_error, resource_groups, ArmClient, ArmError};
use azure_discovery::cache::MemoryCache;
use azure_discovery::engine::{AdapterRegistry, Engine};
use azure_discovery::scope::Scope;
use azure_discovery::sdp::{BlastPropagation, Health, ItemType, Query, QueryMethod};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{bearer_token, header_exists, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUB: &str = "00000000-0000-0000-0000-000000000001";

fn client(server: &MockServer) -> ArmClient {
    ArmClient::new(Arc::new(StaticToken("test-token".to_string())), &server.uri()).unwrap()
}

fn registry(server: &MockServer, groups: &[&str]) -> AdapterRegistry {
    let scopes = groups
        .iter()
        .map(|rg| Scope::resource_group(SUB, *rg))
        .collect();
    AdapterRegistry::new(&AdapterContext {
        client: client(server),
        cache: Arc::new(MemoryCache::new()),
        cache_ttl: Duration::from_secs(300),
        scopes,
    })
}

fn rg_path(rg: &str, rest: &str) -> String {
    format!("/subscriptions/{}/resourceGroups/{}/providers/{}", SUB, rg, rest)
}

fn scope(rg: &str) -> String {
    format!("{}.{}", SUB, rg)
}

fn disk(rg: &str, name: &str) -> serde_json::Value {
    json!({
        "id": rg_path(rg, &format!("Microsoft.Compute/disks/{}", name)),
        "name": name,
        "type": "Microsoft.Compute/disks",
        "location": "westeurope",
        "tags": {"env": "test"},
        "managedBy": rg_path(rg, "Microsoft.Compute/virtualMachines/vm-1"),
        "properties": {"provisioningState": "Succeeded", "diskState": "Attached", "diskSizeGB": 64}
    })
}

/// Test module for the raw ARM client
mod client_tests {
    use super::*;

    /// Pages are followed through nextLink until it runs out
    #[tokio::test]
    async fn test_list_follows_next_link() {
        let server = MockServer::start().await;
        let collection = rg_path("rg", "Microsoft.Network/virtualNetworks");

        Mock::given(method("GET"))
            .and(path(collection.as_str()))
            .and(query_param("api-version", "2024-05-01"))
            .and(query_param_is_missing("$skiptoken"))
            .and(bearer_token("test-token"))
            .and(header_exists("x-ms-client-request-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"name": "vnet-1"}, {"name": "vnet-2"}],
                "nextLink": format!("{}{}?api-version=2024-05-01&$skiptoken=page2", server.uri(), collection)
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(collection.as_str()))
            .and(query_param("$skiptoken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"name": "vnet-3"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = assert_ok!(client(&server).list_resources(&collection, "2024-05-01", None).await);
        let names: Vec<&str> = items.iter().filter_map(|v| v["name"].as_str()).collect();
        assert_eq!(names, vec!["vnet-1", "vnet-2", "vnet-3"]);
    }

    /// A nextLink that was already followed is an error rather than a hang
    #[tokio::test]
    async fn test_repeating_next_link_is_an_error() {
        let server = MockServer::start().await;
        let collection = rg_path("rg", "Microsoft.Compute/disks");

        Mock::given(method("GET"))
            .and(path(collection.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [],
                "nextLink": format!("{}{}?api-version=2023-10-02&$skiptoken=same", server.uri(), collection)
            })))
            .mount(&server)
            .await;

        let err = assert_err!(client(&server).list_resources(&collection, "2023-10-02", None).await);
        assert!(matches!(err, ArmError::PaginationLoop(_)));
    }

    /// ARM error bodies are parsed into the error
    #[tokio::test]
    async fn test_error_body_is_parsed() {
        let server = MockServer::start().await;
        let resource = rg_path("rg", "Microsoft.KeyVault/vaults/kv");

        Mock::given(method("GET"))
            .and(path(resource.as_str()))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": "AuthorizationFailed",
                    "message": "The client does not have authorization to perform action"
                }
            })))
            .mount(&server)
            .await;

        let err = assert_err!(client(&server).get_resource(&resource, "2023-07-01").await);
        match &err {
            ArmError::Status { status, code, .. } => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(code, "AuthorizationFailed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!err.is_not_found());
        assert!(format_arm_error(&err).contains("Permission denied"));
    }

    /// A rejected token is refreshed and the request retried once
    #[tokio::test]
    async fn test_unauthorized_is_retried_once() {
        let server = MockServer::start().await;
        let resource = rg_path("rg", "Microsoft.Compute/disks/data-1");

        Mock::given(method("GET"))
            .and(path(resource.as_str()))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "ExpiredAuthenticationToken", "message": "token expired"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(resource.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk("rg", "data-1")))
            .expect(1)
            .mount(&server)
            .await;

        let value = assert_ok!(client(&server).get_resource(&resource, "2023-10-02").await);
        assert_eq!(value["name"], "data-1");
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 2);
    }

    /// A second 401 is returned instead of retrying forever
    #[tokio::test]
    async fn test_repeated_unauthorized_is_an_error() {
        let server = MockServer::start().await;
        let resource = rg_path("rg", "Microsoft.Compute/disks/data-1");

        Mock::given(method("GET"))
            .and(path(resource.as_str()))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "InvalidAuthenticationToken", "message": "bad token"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let err = assert_err!(client(&server).get_resource(&resource, "2023-10-02").await);
        assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
        assert!(err.to_string().contains("bad token"));
    }

    /// Resource groups being deleted are not discovered
    #[tokio::test]
    async fn test_list_resource_groups() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/subscriptions/{}/resourcegroups", SUB).as_str()))
            .and(query_param("api-version", "2021-04-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"name": "rg-web", "location": "westeurope", "properties": {"provisioningState": "Succeeded"}},
                    {"name": "rg-old", "location": "westeurope", "properties": {"provisioningState": "Deleting"}}
                ]
            })))
            .mount(&server)
            .await;

        let groups = assert_ok!(resource_groups::list_resource_group_names(&client(&server), SUB).await);
        assert_eq!(groups, vec!["rg-web"]);
    }
}

/// Test module for adapters against mocked ARM endpoints
mod adapter_tests {
    use super::*;

    /// Get maps the resource and the second call is served from the cache
    #[tokio::test]
    async fn test_get_maps_and_caches() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Compute/disks/data-1").as_str()))
            .and(query_param("api-version", "2023-10-02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk("rg", "data-1")))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry(&server, &["rg"]);
        let adapter = registry.get(ItemType::ComputeDisk).unwrap();

        let item = assert_ok!(adapter.get(&scope("rg"), "data-1", false).await);
        assert_eq!(item.unique_attribute_value().as_deref(), Some("data-1"));
        assert_eq!(item.scope, scope("rg"));
        assert_eq!(item.health, Some(Health::Ok));
        assert_eq!(item.tags.get("env").map(String::as_str), Some("test"));
        assert!(!item.attributes.contains_key("tags"));
        let vm = item.links_to(ItemType::ComputeVirtualMachine).next().unwrap();
        assert_eq!(vm.query.query, "vm-1");
        assert_eq!(vm.blast_propagation, BlastPropagation::BOTH);

        let cached = assert_ok!(adapter.get(&scope("rg"), "data-1", false).await);
        assert_eq!(cached, item);
    }

    /// List stores every item under its Get key
    #[tokio::test]
    async fn test_list_then_get_from_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Compute/disks").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [disk("rg", "os-1"), disk("rg", "data-1")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Compute/disks/data-1").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk("rg", "data-1")))
            .expect(0)
            .mount(&server)
            .await;

        let registry = registry(&server, &["rg"]);
        let adapter = registry.get(ItemType::ComputeDisk).unwrap();

        let items = assert_ok!(adapter.list(&scope("rg"), false).await);
        assert_eq!(items.len(), 2);

        let item = assert_ok!(adapter.get(&scope("rg"), "data-1", false).await);
        assert_eq!(item, items[1]);
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
    }

    /// Elements that cannot be mapped are skipped, the rest of the page is kept
    #[tokio::test]
    async fn test_list_skips_unmappable_elements() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Compute/disks").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"id": rg_path("rg", "Microsoft.Compute/disks/ghost"), "properties": {}},
                    "not an object",
                    disk("rg", "data-1")
                ]
            })))
            .mount(&server)
            .await;

        let registry = registry(&server, &["rg"]);
        let adapter = registry.get(ItemType::ComputeDisk).unwrap();

        let items = assert_ok!(adapter.list(&scope("rg"), false).await);
        let names: Vec<String> = items.iter().filter_map(|i| i.unique_attribute_value()).collect();
        assert_eq!(names, vec!["data-1"]);
    }

    /// 404 becomes NotFound, which is cached
    #[tokio::test]
    async fn test_not_found_is_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Storage/storageAccounts/missing").as_str()))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "ResourceNotFound", "message": "not found"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry(&server, &["rg"]);
        let adapter = registry.get(ItemType::StorageAccount).unwrap();

        let first = assert_err!(adapter.get(&scope("rg"), "missing", false).await);
        assert!(first.is_not_found());
        let second = assert_err!(adapter.get(&scope("rg"), "missing", false).await);
        assert!(second.is_not_found());
    }

    /// Other errors are not cached
    #[tokio::test]
    async fn test_server_errors_are_not_cached() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Storage/storageAccounts/flaky").as_str()))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let registry = registry(&server, &["rg"]);
        let adapter = registry.get(ItemType::StorageAccount).unwrap();

        for _ in 0..2 {
            let err = assert_err!(adapter.get(&scope("rg"), "flaky", false).await);
            assert!(!err.is_not_found());
        }
    }

    /// Search lists a parent's children; a Get for one of them then hits the cache
    #[tokio::test]
    async fn test_search_children_then_get_from_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Sql/servers/sql-1/databases").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    {"name": "master", "properties": {"status": "Online"}},
                    {"name": "orders", "properties": {"status": "Paused"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry(&server, &["rg"]);
        let adapter = registry.get(ItemType::SqlDatabase).unwrap();

        let items = assert_ok!(adapter.search(&scope("rg"), "sql-1", false).await);
        let keys: Vec<String> = items.iter().filter_map(|i| i.unique_attribute_value()).collect();
        assert_eq!(keys, vec!["sql-1|master", "sql-1|orders"]);

        let orders = assert_ok!(adapter.get(&scope("rg"), "sql-1|orders", false).await);
        assert_eq!(orders.health, Some(Health::Warning));
    }

    /// Wrong query shapes and methods are rejected before any request
    #[tokio::test]
    async fn test_invalid_queries() {
        let server = MockServer::start().await;
        let registry = registry(&server, &["rg"]);

        let databases = registry.get(ItemType::SqlDatabase).unwrap();
        assert_err!(databases.get(&scope("rg"), "orders", false).await);
        assert_err!(databases.list(&scope("rg"), false).await);

        let disks = registry.get(ItemType::ComputeDisk).unwrap();
        assert_err!(disks.search(&scope("rg"), "x", false).await);
        assert_err!(disks.get(SUB, "d", false).await);

        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    /// Role assignments are listed with the atScope() filter
    #[tokio::test]
    async fn test_role_assignments_use_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg", "Microsoft.Authorization/roleAssignments").as_str()))
            .and(query_param("$filter", "atScope()"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{
                    "id": format!("/subscriptions/{}/providers/Microsoft.Authorization/roleAssignments/ra-1", SUB),
                    "name": "ra-1",
                    "properties": {
                        "roleDefinitionId": format!("/subscriptions/{}/providers/Microsoft.Authorization/roleDefinitions/rd-1", SUB),
                        "scope": format!("/subscriptions/{}", SUB)
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let registry = registry(&server, &["rg"]);
        let adapter = registry.get(ItemType::AuthorizationRoleAssignment).unwrap();

        let items = assert_ok!(adapter.list(&scope("rg"), false).await);
        assert_eq!(items.len(), 1);
        let definition = items[0].links_to(ItemType::AuthorizationRoleDefinition).next().unwrap();
        assert_eq!(definition.query.scope, SUB);
        assert_eq!(definition.blast_propagation, BlastPropagation::IN);
    }
}

/// Test module for wildcard queries through the engine
mod engine_tests {
    use super::*;

    #[tokio::test]
    async fn test_wildcard_list_collects_items_and_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg-1", "Microsoft.Compute/disks").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [disk("rg-1", "os-1"), disk("rg-1", "data-1")]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg-2", "Microsoft.Compute/disks").as_str()))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"code": "InternalServerError", "message": "boom"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg-3", "Microsoft.Compute/disks").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
            .mount(&server)
            .await;

        let engine = Engine::new(registry(&server, &["rg-1", "rg-2", "rg-3"]), 2);
        let result = engine
            .execute(&Query::new(ItemType::ComputeDisk, QueryMethod::List, "", "*"), false)
            .await;

        let names: Vec<String> = result.items.iter().filter_map(|i| i.unique_attribute_value()).collect();
        assert_eq!(names, vec!["os-1", "data-1"]);
        assert_eq!(result.errors.len(), 1);
        assert!(!result.errors[0].is_not_found());
    }

    #[tokio::test]
    async fn test_wildcard_get_skips_scopes_without_the_item() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg-1", "Microsoft.Compute/disks/shared").as_str()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(rg_path("rg-2", "Microsoft.Compute/disks/shared").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk("rg-2", "shared")))
            .mount(&server)
            .await;

        let engine = Engine::new(registry(&server, &["rg-1", "rg-2"]), 4);
        let result = engine
            .execute(&Query::new(ItemType::ComputeDisk, QueryMethod::Get, "shared", "*"), false)
            .await;

        assert!(result.errors.is_empty());
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].scope, scope("rg-2"));
    }
}
