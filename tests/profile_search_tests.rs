// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile, skill set and search tests.

use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;

fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

// ─── Skill Sets ──────────────────────────────────────────────

#[tokio::test]
async fn test_eleventh_skill_is_rejected() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;

    for i in 0..10 {
        common::add_skill(&app, &user, &format!("Offered {i}"), "offered").await;
    }

    let (status, body) = common::send(
        &app,
        common::json(
            "POST",
            "/users/skills",
            Some(&user.token),
            json!({ "name": "One Too Many", "type": "offered" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    // The cap is per direction.
    common::add_skill(&app, &user, "Spanish", "wanted").await;

    let (_, skills) = common::send(&app, common::get("/users/skills", &user.token)).await;
    assert_eq!(skills.as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn test_duplicate_skill_conflicts() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;
    common::add_skill(&app, &user, "Guitar", "offered").await;

    let (status, _) = common::send(
        &app,
        common::json(
            "POST",
            "/users/skills",
            Some(&user.token),
            json!({ "name": "GUITAR", "type": "offered" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Same skill in the other direction is fine.
    common::add_skill(&app, &user, "Guitar", "wanted").await;
}

#[tokio::test]
async fn test_skill_names_resolve_to_catalog_entries() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;

    let (status, catalog) =
        common::send(&app, common::get("/users/available-skills", &user.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog.as_array().unwrap().len(), 20);
    let guitar = catalog
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Guitar")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let id = common::add_skill(&app, &user, "guitar", "offered").await;
    assert_eq!(id, guitar);

    // Unknown names extend the catalog.
    common::add_skill(&app, &user, "Beekeeping", "wanted").await;
    let (_, catalog) = common::send(&app, common::get("/users/available-skills", &user.token)).await;
    assert_eq!(catalog.as_array().unwrap().len(), 21);
    assert!(names(&catalog).contains(&"Beekeeping".to_string()));
}

#[tokio::test]
async fn test_add_skill_by_unknown_id_is_not_found() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;

    let (status, _) = common::send(
        &app,
        common::json(
            "POST",
            "/users/skills",
            Some(&user.token),
            json!({ "skill_id": "no-such-skill", "type": "offered" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_skill() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;
    let guitar = common::add_skill(&app, &user, "Guitar", "offered").await;

    // Wrong direction.
    let (status, _) = common::send(
        &app,
        common::delete(&format!("/users/skills/{guitar}?skill_type=wanted"), &user.token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::send(
        &app,
        common::delete(&format!("/users/skills/{guitar}?skill_type=offered"), &user.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, skills) = common::send(&app, common::get("/users/skills", &user.token)).await;
    assert!(skills.as_array().unwrap().is_empty());
}

// ─── Profile Updates ─────────────────────────────────────────

#[tokio::test]
async fn test_profile_update_replaces_skill_sets() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;
    common::add_skill(&app, &user, "Spanish", "wanted").await;

    let (status, profile) = common::send(
        &app,
        common::json(
            "PATCH",
            "/users/profile",
            Some(&user.token),
            json!({
                "name": "Alice Liddell",
                "availability": "Evenings",
                "skills_offered": [{ "name": "Cooking" }, { "name": "Yoga" }],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{profile}");
    assert_eq!(profile["name"], "Alice Liddell");
    assert_eq!(profile["availability"], "Evenings");
    assert_eq!(names(&profile["skills_offered"]), vec!["Cooking", "Yoga"]);
    assert_eq!(names(&profile["skills_wanted"]), vec!["Spanish"]);

    let (_, profile) = common::send(
        &app,
        common::json(
            "PATCH",
            "/users/profile",
            Some(&user.token),
            json!({ "skills_offered": [{ "name": "Yoga" }], "skills_wanted": [] }),
        ),
    )
    .await;
    assert_eq!(names(&profile["skills_offered"]), vec!["Yoga"]);
    assert!(profile["skills_wanted"].as_array().unwrap().is_empty());
    assert_eq!(profile["name"], "Alice Liddell");
}

#[tokio::test]
async fn test_profile_update_null_clears_optional_fields() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;
    let viewer = common::register(&app, "Viewer", "viewer@example.com").await;

    let (status, profile) = common::send(
        &app,
        common::json(
            "PATCH",
            "/users/profile",
            Some(&user.token),
            json!({
                "location": "Berlin",
                "profile_photo": "https://example.com/alice.png",
                "availability": "Weekends",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{profile}");
    assert_eq!(profile["location"], "Berlin");

    let (_, found) = common::send(
        &app,
        common::get("/users/search?availability=Weekends", &viewer.token),
    )
    .await;
    assert_eq!(found["total"], 1);

    // Absent fields are left alone.
    let (_, profile) = common::send(
        &app,
        common::json("PATCH", "/users/profile", Some(&user.token), json!({ "name": "Al" })),
    )
    .await;
    assert_eq!(profile["availability"], "Weekends");

    let (status, profile) = common::send(
        &app,
        common::json(
            "PATCH",
            "/users/profile",
            Some(&user.token),
            json!({ "location": null, "profile_photo": null, "availability": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{profile}");
    assert!(profile["location"].is_null());
    assert!(profile["profile_photo"].is_null());
    assert!(profile["availability"].is_null());
    assert_eq!(profile["name"], "Al");

    let (_, found) = common::send(
        &app,
        common::get("/users/search?availability=Weekends", &viewer.token),
    )
    .await;
    assert_eq!(found["total"], 0);
}

#[tokio::test]
async fn test_rejected_skill_set_leaves_catalog_untouched() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;

    let (_, catalog) = common::send(&app, common::get("/users/available-skills", &user.token)).await;
    let guitar = catalog
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Guitar")
        .map(|s| s["id"].as_str().unwrap().to_string())
        .unwrap();

    let rejected = [
        json!([{ "name": "Zither" }, { "name": "zither" }]),
        json!([{ "name": "Banjo" }, { "id": guitar }, { "name": "guitar" }]),
    ];
    for skills in rejected {
        let (status, body) = common::send(
            &app,
            common::json(
                "PATCH",
                "/users/profile",
                Some(&user.token),
                json!({ "skills_offered": skills }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "bad_request");
    }

    let (_, catalog) = common::send(&app, common::get("/users/available-skills", &user.token)).await;
    assert_eq!(catalog.as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_malformed_skill_type_uses_error_envelope() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;
    let guitar = common::add_skill(&app, &user, "Guitar", "offered").await;

    let (status, body) = common::send(
        &app,
        common::json(
            "POST",
            "/users/skills",
            Some(&user.token),
            json!({ "name": "Piano", "type": "both" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "bad_request");

    let (status, body) = common::send(
        &app,
        common::delete(&format!("/users/skills/{guitar}?skill_type=both"), &user.token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "bad_request");

    let (status, body) = common::send(
        &app,
        common::get("/users/search?type=both", &user.token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_profile_update_rejects_bad_skill_sets() {
    let (app, _) = common::create_test_app().await;
    let user = common::register(&app, "Alice", "alice@example.com").await;

    let too_many: Vec<Value> = (0..11).map(|i| json!({ "name": format!("Skill {i}") })).collect();
    let (status, _) = common::send(
        &app,
        common::json(
            "PATCH",
            "/users/profile",
            Some(&user.token),
            json!({ "skills_offered": too_many }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        &app,
        common::json(
            "PATCH",
            "/users/profile",
            Some(&user.token),
            json!({ "skills_wanted": [{ "name": "Yoga" }, { "name": "yoga" }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(
        &app,
        common::json(
            "PATCH",
            "/users/profile",
            Some(&user.token),
            json!({ "profile_photo": "not a url" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ─── Viewing Other Users ─────────────────────────────────────

#[tokio::test]
async fn test_profile_visibility() {
    let (app, state) = common::create_test_app().await;
    let viewer = common::register(&app, "Viewer", "viewer@example.com").await;
    let admin = common::register(&app, "Admin", "admin@example.com").await;
    let public = common::insert_user(&state, "Public", None, true, false).await;
    let private = common::insert_user(&state, "Private", None, false, false).await;
    let banned = common::insert_user(&state, "Banned", None, true, true).await;

    let (status, card) =
        common::send(&app, common::get(&format!("/users/{public}"), &viewer.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["name"], "Public");
    assert!(card.get("email").is_none());

    let (status, _) =
        common::send(&app, common::get(&format!("/users/{private}"), &viewer.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        common::send(&app, common::get(&format!("/users/{banned}"), &viewer.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        common::send(&app, common::get(&format!("/users/{private}"), &admin.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        common::send(&app, common::get(&format!("/users/{}", viewer.id), &viewer.token)).await;
    assert_eq!(status, StatusCode::OK);
}

// ─── Search ──────────────────────────────────────────────────

#[tokio::test]
async fn test_search_excludes_banned_private_and_self() {
    let (app, state) = common::create_test_app().await;
    let viewer = common::register(&app, "Viewer", "viewer@example.com").await;
    common::add_skill(&app, &viewer, "Guitar", "offered").await;

    let visible = common::insert_user(&state, "Visible", None, true, false).await;
    let private = common::insert_user(&state, "Private", None, false, false).await;
    let banned = common::insert_user(&state, "Banned", None, true, true).await;
    for id in [&visible, &private, &banned] {
        common::insert_user_skill(&state, id, "Guitar", "offered").await;
    }

    let (status, page) =
        common::send(&app, common::get("/users/search?skill=guit", &viewer.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["users"][0]["id"], visible.as_str());
    assert_eq!(names(&page["users"][0]["skills_offered"]), vec!["Guitar"]);

    let (_, page) = common::send(&app, common::get("/users/search", &viewer.token)).await;
    let ids: Vec<&str> = page["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert!(!ids.contains(&viewer.id.as_str()));
    assert!(!ids.contains(&private.as_str()));
    assert!(!ids.contains(&banned.as_str()));
}

#[tokio::test]
async fn test_search_by_availability_paginates_by_twelve() {
    let (app, state) = common::create_test_app().await;
    let viewer = common::register_with(
        &app,
        "Viewer",
        "viewer@example.com",
        json!({ "availability": "Weekends" }),
    )
    .await;

    let mut weekenders = Vec::new();
    for i in 0..14 {
        weekenders.push(common::insert_user(&state, &format!("W{i}"), Some("Weekends"), true, false).await);
    }
    common::insert_user(&state, "Evening", Some("Evenings"), true, false).await;
    common::insert_user(&state, "Hidden", Some("Weekends"), false, false).await;
    common::insert_user(&state, "Gone", Some("Weekends"), true, true).await;

    let (status, first) = common::send(
        &app,
        common::get("/users/search?availability=Weekends", &viewer.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["total"], 14);
    assert_eq!(first["limit"], 12);
    assert_eq!(first["pages"], 2);
    assert_eq!(first["users"].as_array().unwrap().len(), 12);
    assert!(first["users"]
        .as_array()
        .unwrap()
        .iter()
        .all(|u| u["availability"] == "Weekends"));

    let (_, second) = common::send(
        &app,
        common::get("/users/search?availability=Weekends&page=2", &viewer.token),
    )
    .await;
    let second_ids: Vec<&str> = second["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert_eq!(second_ids, vec![weekenders[12].as_str(), weekenders[13].as_str()]);
}

#[tokio::test]
async fn test_search_by_skill_direction() {
    let (app, state) = common::create_test_app().await;
    let viewer = common::register(&app, "Viewer", "viewer@example.com").await;

    let tutor = common::insert_user(&state, "Tutor", None, true, false).await;
    let learner = common::insert_user(&state, "Learner", None, true, false).await;
    common::insert_user_skill(&state, &tutor, "Spanish", "offered").await;
    common::insert_user_skill(&state, &learner, "Spanish", "wanted").await;

    let (_, offered) = common::send(
        &app,
        common::get("/users/search?skill=span&type=offered", &viewer.token),
    )
    .await;
    assert_eq!(offered["total"], 1);
    assert_eq!(offered["users"][0]["id"], tutor.as_str());

    let (_, wanted) = common::send(
        &app,
        common::get("/users/search?skill=SPAN&type=wanted", &viewer.token),
    )
    .await;
    assert_eq!(wanted["total"], 1);
    assert_eq!(wanted["users"][0]["id"], learner.as_str());

    let (_, either) =
        common::send(&app, common::get("/users/search?skill=spanish", &viewer.token)).await;
    assert_eq!(either["total"], 2);
}

#[tokio::test]
async fn test_search_rejects_bad_paging() {
    let (app, _) = common::create_test_app().await;
    let viewer = common::register(&app, "Viewer", "viewer@example.com").await;

    let (status, _) =
        common::send(&app, common::get("/users/search?page=0", &viewer.token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) =
        common::send(&app, common::get("/users/search?limit=500", &viewer.token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) =
        common::send(&app, common::get("/users/search?page=first", &viewer.token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
