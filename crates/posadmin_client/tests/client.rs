//! Client behavior against a mocked identity server.

use posadmin_client::{Error, Permission, Role, RoleApiClient, RoleClaim, User, UserApiClient, UserParams};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json(id: &str, user_name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "userName": user_name,
        "email": format!("{user_name}@example.com"),
        "firstName": null,
        "lastName": null,
        "phoneNumber": null,
        "isActive": true,
        "emailConfirmed": false,
        "createdOn": 1_700_000_000_000_i64
    })
}

#[tokio::test]
async fn get_users_sends_only_present_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/identity/users"))
        .and(query_param("searchString", "doe"))
        .and(query_param("pageSize", "5"))
        .and(query_param_is_missing("pageNumber"))
        .and(query_param_is_missing("orderBy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [user_json("u-1", "jdoe")],
            "totalCount": 1,
            "pageNumber": 1,
            "pageSize": 5,
            "totalPages": 1,
            "hasPreviousPage": false,
            "hasNextPage": false,
            "succeeded": true,
            "messages": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = UserApiClient::new(server.uri()).unwrap();
    let page = client
        .get_users(&UserParams {
            search_string: Some("doe".to_string()),
            page_number: Some(0),
            page_size: Some(5),
            order_by: None,
        })
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.data[0].user_name, "jdoe");
    assert_eq!(page.data[0].created_on, Some(1_700_000_000_000));
}

#[tokio::test]
async fn create_user_posts_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/identity/users"))
        .and(body_json(json!({
            "userName": "jdoe",
            "email": "jdoe@example.com",
            "firstName": null,
            "lastName": null,
            "phoneNumber": null,
            "isActive": true,
            "emailConfirmed": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": ["User jdoe Registered."],
            "data": user_json("u-1", "jdoe")
        })))
        .mount(&server)
        .await;

    let client = UserApiClient::new(format!("{}/", server.uri())).unwrap();
    let result = client
        .create_user(&User::new("jdoe", "jdoe@example.com"))
        .await
        .unwrap();
    assert!(result.succeeded);
    assert_eq!(result.data.unwrap().id.as_deref(), Some("u-1"));
}

#[tokio::test]
async fn failure_envelope_is_returned_as_ok() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/identity/users/u-1"))
        .and(header("x-user-id", "u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": false,
            "messages": ["You cannot delete your own account."],
            "data": null
        })))
        .mount(&server)
        .await;

    let client = UserApiClient::as_user(server.uri(), "u-1").unwrap();
    let result = client.delete_user("u-1").await.unwrap();
    assert!(!result.succeeded);
    assert!(result.data.is_none());
    assert_eq!(result.messages, vec!["You cannot delete your own account.".to_string()]);
}

#[tokio::test]
async fn error_status_becomes_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/identity/users/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "succeeded": false,
            "messages": ["User Not Found"],
            "data": null
        })))
        .mount(&server)
        .await;

    let client = UserApiClient::new(server.uri()).unwrap();
    let err = client.get_user_by_id("missing").await.unwrap_err();
    match err {
        Error::Server { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "User Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn ids_are_sent_as_single_path_segments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/identity/users/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("a/b", "jdoe")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/identity/roles/x%3Fy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": ["Role x?y Deleted."],
            "data": "Role x?y Deleted."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = UserApiClient::new(server.uri())
        .unwrap()
        .get_user_by_id("a/b")
        .await
        .unwrap();
    assert_eq!(user.user_name, "jdoe");

    let deleted = RoleApiClient::new(server.uri())
        .unwrap()
        .delete_role("x?y")
        .await
        .unwrap();
    assert!(deleted.succeeded);
}

#[test]
fn unusable_base_url_is_rejected() {
    assert!(matches!(
        UserApiClient::new("not a url"),
        Err(Error::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn update_user_puts_body_with_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/identity/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": ["User jdoe Updated."],
            "data": user_json("u-1", "jdoe")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut user = User::new("jdoe", "jdoe@example.com");
    user.id = Some("u-1".to_string());
    let result = UserApiClient::new(server.uri())
        .unwrap()
        .update_user(&user)
        .await
        .unwrap();
    assert_eq!(result.messages, vec!["User jdoe Updated.".to_string()]);

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["id"], "u-1");
}

#[tokio::test]
async fn role_client_covers_console_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/identity/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": [],
            "data": [{ "id": "r-1", "name": "Admin", "description": "Admin role" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/identity/roles"))
        .and(body_json(json!({ "name": "Cashier", "description": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": ["Role Cashier Created."],
            "data": "Role Cashier Created."
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/identity/roles/permissions/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": [],
            "data": {
                "roleId": "r-1",
                "roleName": "Admin",
                "roleClaims": [{
                    "id": 0,
                    "roleId": "r-1",
                    "type": "Permission",
                    "value": "Permissions.Sales.View",
                    "description": "View sales",
                    "group": "Sales",
                    "selected": false
                }]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/identity/roles/permissions"))
        .and(header("x-user-id", "admin-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": ["Permissions Updated."],
            "data": "Permissions Updated."
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/identity/roles/r-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "succeeded": true,
            "messages": ["Role Cashier Deleted."],
            "data": "Role Cashier Deleted."
        })))
        .mount(&server)
        .await;

    let client = RoleApiClient::as_user(server.uri(), "admin-1").unwrap();
    let roles = client.get_roles().await.unwrap().data.unwrap();
    assert_eq!(roles[0].name, "Admin");

    let saved = client
        .save_role(&Role {
            id: None,
            name: "Cashier".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(saved.data.as_deref(), Some("Role Cashier Created."));

    let mut permission: Permission = client.get_permissions("r-1").await.unwrap().data.unwrap();
    let claim: &mut RoleClaim = &mut permission.role_claims[0];
    claim.selected = true;
    let updated = client.update_permissions(&permission).await.unwrap();
    assert!(updated.succeeded);

    let deleted = client.delete_role("r-2").await.unwrap();
    assert_eq!(deleted.data.as_deref(), Some("Role Cashier Deleted."));
}
