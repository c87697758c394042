use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use posadmin_core::dto::{PermissionResponse, RoleClaimResponse, RoleResponse, UserResponse};
use posadmin_core::{
    open_db_in_memory, seed_defaults, AdminSeed, ApiResult, PaginatedResult,
    SqliteUserRepository, UserRepository,
};
use posadmin_server::{router, AppState};
use serde_json::json;

fn test_app() -> (TestServer, String) {
    let conn = open_db_in_memory().unwrap();
    seed_defaults(
        &conn,
        Some(&AdminSeed {
            user_name: "admin".to_string(),
            email: "admin@example.com".to_string(),
        }),
    )
    .unwrap();
    let admin_id = SqliteUserRepository::try_new(&conn)
        .unwrap()
        .find_user_by_name("admin")
        .unwrap()
        .unwrap()
        .id;
    let server = TestServer::new(router(AppState::new(conn))).unwrap();
    (server, admin_id)
}

fn user_header() -> HeaderName {
    HeaderName::from_static("x-user-id")
}

fn as_user(id: &str) -> HeaderValue {
    HeaderValue::from_str(id).unwrap()
}

async fn role_id(server: &TestServer, name: &str) -> String {
    let roles: ApiResult<Vec<RoleResponse>> =
        server.get("/api/identity/roles").await.json();
    roles
        .data
        .unwrap()
        .into_iter()
        .find(|role| role.name == name)
        .unwrap()
        .id
}

async fn create_user(server: &TestServer, user_name: &str) -> String {
    let response = server
        .post("/api/identity/users")
        .json(&json!({ "userName": user_name, "email": format!("{user_name}@example.com") }))
        .await;
    response.assert_status_ok();
    let result: ApiResult<UserResponse> = response.json();
    result.data.unwrap().id
}

#[tokio::test]
async fn health_reports_version() {
    let (server, _) = test_app();
    let response = server.get("/api/identity/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], posadmin_core::core_version());
}

#[tokio::test]
async fn role_crud_round_trip() {
    let (server, _) = test_app();

    let created: ApiResult<String> = server
        .post("/api/identity/roles")
        .json(&json!({ "name": "Cashier", "description": "Front desk" }))
        .await
        .json();
    assert!(created.succeeded);
    assert_eq!(created.data.as_deref(), Some("Role Cashier Created."));

    let count: ApiResult<i64> = server.get("/api/identity/roles/count").await.json();
    assert_eq!(count.data, Some(4));

    let cashier = role_id(&server, "Cashier").await;
    let role: ApiResult<RoleResponse> = server
        .get(&format!("/api/identity/roles/{cashier}"))
        .await
        .json();
    assert_eq!(role.data.unwrap().description.as_deref(), Some("Front desk"));

    let deleted: ApiResult<String> = server
        .delete(&format!("/api/identity/roles/{cashier}"))
        .await
        .json();
    assert_eq!(deleted.data.as_deref(), Some("Role Cashier Deleted."));

    let missing = server
        .get(&format!("/api/identity/roles/{cashier}"))
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let body: ApiResult<()> = missing.json();
    assert!(!body.succeeded);
    assert_eq!(body.messages, vec!["Role Not Found".to_string()]);
}

#[tokio::test]
async fn duplicate_role_is_bad_request() {
    let (server, _) = test_app();
    let response = server
        .post("/api/identity/roles")
        .json(&json!({ "name": "superadmin" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ApiResult<()> = response.json();
    assert_eq!(body.messages, vec!["Similar Role already exists.".to_string()]);
}

#[tokio::test]
async fn default_role_delete_is_a_failure_envelope() {
    let (server, _) = test_app();
    let admin_role = role_id(&server, "Admin").await;
    let response = server
        .delete(&format!("/api/identity/roles/{admin_role}"))
        .await;
    response.assert_status_ok();
    let body: ApiResult<String> = response.json();
    assert!(!body.succeeded);
    assert_eq!(body.messages, vec!["Not allowed to delete Admin Role.".to_string()]);
}

#[tokio::test]
async fn permissions_update_requires_caller_header() {
    let (server, admin_id) = test_app();
    server
        .post("/api/identity/roles")
        .json(&json!({ "name": "Cashier" }))
        .await
        .assert_status_ok();
    let cashier = role_id(&server, "Cashier").await;
    let body = json!({
        "roleId": cashier,
        "roleClaims": [
            { "type": "Permission", "value": "Permissions.Sales.View", "selected": true },
            { "type": "Permission", "value": "Permissions.Sales.Create", "selected": false }
        ]
    });

    let anonymous = server.put("/api/identity/roles/permissions").json(&body).await;
    anonymous.assert_status(StatusCode::UNAUTHORIZED);

    let updated: ApiResult<String> = server
        .put("/api/identity/roles/permissions")
        .add_header(user_header(), as_user(&admin_id))
        .json(&body)
        .await
        .json();
    assert_eq!(updated.data.as_deref(), Some("Permissions Updated."));

    let view: ApiResult<PermissionResponse> = server
        .get(&format!("/api/identity/roles/permissions/{cashier}"))
        .await
        .json();
    let selected: Vec<String> = view
        .data
        .unwrap()
        .role_claims
        .into_iter()
        .filter(|claim| claim.selected)
        .map(|claim| claim.value)
        .collect();
    assert_eq!(selected, vec!["Permissions.Sales.View".to_string()]);

    let claims: ApiResult<Vec<RoleClaimResponse>> = server
        .get(&format!("/api/identity/roleclaims/{cashier}"))
        .await
        .json();
    let claims = claims.data.unwrap();
    assert_eq!(claims.len(), 1);

    let deleted: ApiResult<String> = server
        .delete(&format!("/api/identity/roleclaims/{}", claims[0].id))
        .add_header(user_header(), as_user(&admin_id))
        .await
        .json();
    assert_eq!(
        deleted.data.as_deref(),
        Some("Role Claim Permissions.Sales.View Deleted.")
    );
}

#[tokio::test]
async fn super_admin_permissions_reject_non_members() {
    let (server, _) = test_app();
    let outsider = create_user(&server, "outsider").await;
    let super_admin = role_id(&server, "SuperAdmin").await;

    let result: ApiResult<String> = server
        .put("/api/identity/roles/permissions")
        .add_header(user_header(), as_user(&outsider))
        .json(&json!({ "roleId": super_admin, "roleClaims": [] }))
        .await
        .json();
    assert!(!result.succeeded);
    assert_eq!(
        result.messages,
        vec!["Not allowed to modify Permissions for this Role.".to_string()]
    );
}

#[tokio::test]
async fn role_claim_can_be_created_directly() {
    let (server, admin_id) = test_app();
    server
        .post("/api/identity/roles")
        .json(&json!({ "name": "Auditor" }))
        .await
        .assert_status_ok();
    let auditor = role_id(&server, "Auditor").await;

    let created: ApiResult<String> = server
        .post("/api/identity/roleclaims")
        .add_header(user_header(), as_user(&admin_id))
        .json(&json!({ "roleId": auditor, "value": "Permissions.Sales.Search", "group": "Sales" }))
        .await
        .json();
    assert_eq!(created.data.as_deref(), Some("Role Claim Created."));

    let all: ApiResult<Vec<RoleClaimResponse>> =
        server.get("/api/identity/roleclaims").await.json();
    assert!(all
        .data
        .unwrap()
        .iter()
        .any(|claim| claim.role_id == auditor && claim.claim_type == "Permission"));

    let missing_role: ApiResult<Vec<RoleClaimResponse>> =
        server.get("/api/identity/roleclaims/ghost").await.json();
    assert!(!missing_role.succeeded);
}

async fn super_admin_claim_id(server: &TestServer, value: &str) -> i64 {
    let super_admin = role_id(server, "SuperAdmin").await;
    let claims: ApiResult<Vec<RoleClaimResponse>> = server
        .get(&format!("/api/identity/roleclaims/{super_admin}"))
        .await
        .json();
    claims
        .data
        .unwrap()
        .into_iter()
        .find(|claim| claim.value == value)
        .unwrap()
        .id
}

#[tokio::test]
async fn role_claim_changes_require_caller_header() {
    let (server, _) = test_app();
    let id = super_admin_claim_id(&server, "Permissions.Roles.View").await;

    server
        .delete(&format!("/api/identity/roleclaims/{id}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/identity/roleclaims")
        .json(&json!({ "roleId": role_id(&server, "Staff").await, "value": "Permissions.Sales.View" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert_eq!(
        super_admin_claim_id(&server, "Permissions.Roles.View").await,
        id
    );
}

#[tokio::test]
async fn super_admin_floor_claims_cannot_be_deleted() {
    let (server, admin_id) = test_app();
    let id = super_admin_claim_id(&server, "Permissions.Roles.View").await;

    let refused: ApiResult<String> = server
        .delete(&format!("/api/identity/roleclaims/{id}"))
        .add_header(user_header(), as_user(&admin_id))
        .await
        .json();
    assert!(!refused.succeeded);
    assert!(refused.messages[0].starts_with("Not allowed to deselect Permissions.Roles.View"));
    assert_eq!(
        super_admin_claim_id(&server, "Permissions.Roles.View").await,
        id
    );

    let outsider = create_user(&server, "outsider").await;
    let other = super_admin_claim_id(&server, "Permissions.Users.View").await;
    let not_member: ApiResult<String> = server
        .delete(&format!("/api/identity/roleclaims/{other}"))
        .add_header(user_header(), as_user(&outsider))
        .await
        .json();
    assert_eq!(
        not_member.messages,
        vec!["Not allowed to modify Permissions for this Role.".to_string()]
    );
}

#[tokio::test]
async fn role_claim_rejects_unrecognized_permission() {
    let (server, admin_id) = test_app();
    let super_admin = role_id(&server, "SuperAdmin").await;

    let result: ApiResult<String> = server
        .post("/api/identity/roleclaims")
        .add_header(user_header(), as_user(&admin_id))
        .json(&json!({ "roleId": super_admin, "type": "Permission", "value": "Bogus.Value" }))
        .await
        .json();
    assert!(!result.succeeded);
    assert_eq!(
        result.messages,
        vec!["Permission Bogus.Value is not recognized.".to_string()]
    );
}

#[tokio::test]
async fn users_list_honors_query_string() {
    let (server, _) = test_app();
    for name in ["robert", "alice", "rachel"] {
        create_user(&server, name).await;
    }

    let page: PaginatedResult<UserResponse> = server
        .get("/api/identity/users")
        .add_query_param("searchString", "r")
        .add_query_param("pageNumber", 1)
        .add_query_param("pageSize", 1)
        .add_query_param("orderBy", "userName desc")
        .await
        .json();
    assert_eq!(page.total_count, 2);
    assert_eq!(page.page_size, 1);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next_page);
    assert_eq!(page.data[0].user_name, "robert");

    let everything: PaginatedResult<UserResponse> =
        server.get("/api/identity/users").await.json();
    assert_eq!(everything.total_count, 4);
    assert_eq!(everything.page_number, 1);
    assert_eq!(everything.page_size, 10);
}

#[tokio::test]
async fn user_create_update_and_lookup() {
    let (server, _) = test_app();
    let id = create_user(&server, "jdoe").await;

    let user: UserResponse = server
        .get(&format!("/api/identity/users/{id}"))
        .await
        .json();
    assert_eq!(user.email, "jdoe@example.com");

    let updated: ApiResult<UserResponse> = server
        .put("/api/identity/users")
        .json(&json!({
            "id": id,
            "userName": "jdoe",
            "email": "john.doe@example.com",
            "firstName": "John"
        }))
        .await
        .json();
    assert_eq!(updated.messages, vec!["User jdoe Updated.".to_string()]);
    assert_eq!(updated.data.unwrap().first_name.as_deref(), Some("John"));

    let duplicate = server
        .post("/api/identity/users")
        .json(&json!({ "userName": "JDOE", "email": "other@example.com" }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/api/identity/users/nobody")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_delete_and_role_membership() {
    let (server, admin_id) = test_app();
    let clerk = create_user(&server, "clerk").await;

    server
        .delete(&format!("/api/identity/users/{clerk}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let updated: ApiResult<String> = server
        .put(&format!("/api/identity/users/roles/{clerk}"))
        .add_header(user_header(), as_user(&admin_id))
        .json(&json!({ "userRoles": [{ "roleName": "Staff", "selected": true }] }))
        .await
        .json();
    assert_eq!(updated.data.as_deref(), Some("Roles Updated."));

    let roles: serde_json::Value = server
        .get(&format!("/api/identity/users/roles/{clerk}"))
        .await
        .json();
    let staff = roles["data"]["userRoles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|role| role["roleName"] == "Staff")
        .unwrap()
        .clone();
    assert_eq!(staff["selected"], true);

    let own: ApiResult<String> = server
        .delete(&format!("/api/identity/users/{admin_id}"))
        .add_header(user_header(), as_user(&admin_id))
        .await
        .json();
    assert_eq!(
        own.messages,
        vec!["You cannot delete your own account.".to_string()]
    );

    let deleted: ApiResult<String> = server
        .delete(&format!("/api/identity/users/{clerk}"))
        .add_header(user_header(), as_user(&admin_id))
        .await
        .json();
    assert_eq!(deleted.data.as_deref(), Some("User clerk Deleted."));
}
