use posadmin_core::db::open_db_in_memory;
use posadmin_core::dto::UserListQuery;
use posadmin_core::{
    RepoError, Role, RoleRepository, SqliteRoleRepository, SqliteUserRepository, User,
    UserPageQuery, UserRepository,
};
use rusqlite::params;

fn insert_user(repo: &SqliteUserRepository<'_>, user_name: &str, last_name: &str) -> User {
    let mut user = User::new(user_name, &format!("{user_name}@example.com"));
    user.last_name = Some(last_name.to_string());
    repo.create_user(&user).unwrap();
    repo.find_user_by_id(&user.id).unwrap().unwrap()
}

#[test]
fn create_assigns_created_on_and_lookups_are_normalized() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = insert_user(&repo, "jdoe", "Doe");
    assert!(user.created_on_ms > 0);
    assert_eq!(
        repo.find_user_by_name("JDOE").unwrap().unwrap().id,
        user.id
    );
    assert_eq!(
        repo.find_user_by_email(" JDoe@Example.com ")
            .unwrap()
            .unwrap()
            .id,
        user.id
    );
}

#[test]
fn duplicate_email_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.create_user(&User::new("jdoe", "shared@example.com"))
        .unwrap();
    let err = repo
        .create_user(&User::new("jane", "SHARED@example.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn invalid_user_is_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo.create_user(&User::new("jdoe", "no-at-sign")).unwrap_err();
    assert!(matches!(err, RepoError::UserValidation(_)));
    assert_eq!(repo.count_users().unwrap(), 0);
}

#[test]
fn list_users_searches_pages_and_counts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    for idx in 0..25 {
        insert_user(&repo, &format!("clerk{idx:02}"), "Clerk");
    }
    insert_user(&repo, "manager", "Boss");

    let query = UserPageQuery::from(&UserListQuery {
        search_string: Some("clerk".to_string()),
        page_number: Some(3),
        page_size: Some(10),
        order_by: None,
    });
    let page = repo.list_users(&query).unwrap();
    assert_eq!(page.total_count, 25);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items[0].user_name, "clerk20");

    let boss = UserPageQuery::from(&UserListQuery {
        search_string: Some("bOsS".to_string()),
        ..UserListQuery::default()
    });
    let page = repo.list_users(&boss).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].user_name, "manager");
}

#[test]
fn list_users_treats_like_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    insert_user(&repo, "alpha", "Plain");
    insert_user(&repo, "beta", "Half_Off");

    let query = UserPageQuery::from(&UserListQuery {
        search_string: Some("_".to_string()),
        ..UserListQuery::default()
    });
    let page = repo.list_users(&query).unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].user_name, "beta");
}

#[test]
fn list_users_honors_order_by() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let first = insert_user(&repo, "alpha", "Zulu");
    let second = insert_user(&repo, "bravo", "Alpha");
    conn.execute(
        "UPDATE users SET created_on = ?2 WHERE id = ?1;",
        params![first.id, 1000],
    )
    .unwrap();
    conn.execute(
        "UPDATE users SET created_on = ?2 WHERE id = ?1;",
        params![second.id, 2000],
    )
    .unwrap();

    let by_last_name = UserPageQuery::from(&UserListQuery {
        order_by: Some("lastName".to_string()),
        ..UserListQuery::default()
    });
    let names: Vec<String> = repo
        .list_users(&by_last_name)
        .unwrap()
        .items
        .into_iter()
        .map(|user| user.user_name)
        .collect();
    assert_eq!(names, vec!["bravo".to_string(), "alpha".to_string()]);

    let newest_first = UserPageQuery::from(&UserListQuery {
        order_by: Some("createdOn desc".to_string()),
        ..UserListQuery::default()
    });
    let page = repo.list_users(&newest_first).unwrap();
    assert_eq!(page.items[0].id, second.id);

    let default_order = repo.list_users(&UserPageQuery::default()).unwrap();
    assert_eq!(default_order.items[0].user_name, "alpha");
}

#[test]
fn memberships_are_replaced_atomically() {
    let conn = open_db_in_memory().unwrap();
    let roles = SqliteRoleRepository::try_new(&conn).unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let cashier = Role::new("Cashier", None);
    let auditor = Role::new("Auditor", None);
    roles.create_role(&cashier).unwrap();
    roles.create_role(&auditor).unwrap();
    let user = insert_user(&users, "jdoe", "Doe");

    users
        .replace_user_roles(&user.id, &[cashier.id.clone()])
        .unwrap();
    assert!(users.is_in_role(&user.id, "cashier").unwrap());
    assert_eq!(users.count_users_in_role(&cashier.id).unwrap(), 1);

    let err = users
        .replace_user_roles(&user.id, &[auditor.id.clone(), "missing-role".to_string()])
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
    assert!(users.is_in_role(&user.id, "Cashier").unwrap());
    assert!(!users.is_in_role(&user.id, "Auditor").unwrap());

    let missing = users
        .replace_user_roles("nobody", &[cashier.id.clone()])
        .unwrap_err();
    assert!(matches!(missing, RepoError::UserNotFound(_)));
}

#[test]
fn deleting_user_removes_memberships() {
    let conn = open_db_in_memory().unwrap();
    let roles = SqliteRoleRepository::try_new(&conn).unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let role = Role::new("Cashier", None);
    roles.create_role(&role).unwrap();
    let user = insert_user(&users, "jdoe", "Doe");
    users.add_user_to_role(&user.id, &role.id).unwrap();

    users.delete_user(&user.id).unwrap();
    assert_eq!(users.count_users_in_role(&role.id).unwrap(), 0);
    assert!(matches!(
        users.delete_user(&user.id).unwrap_err(),
        RepoError::UserNotFound(_)
    ));
}
