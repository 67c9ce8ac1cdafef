use serde_json::{json, Value};
use spin_sdk::http::{Method, Request};
use voices::core::db::demo_posts;
use voices::core::helpers::now;
use voices::handlers::route;
use voices::store::{MemoryPostStore, PostStore};

async fn call(store: &MemoryPostStore, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
    let body = body.map(|b| serde_json::to_vec(&b).unwrap()).unwrap_or_default();
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(body)
        .build();

    let resp = route(store, req).await.expect("Handler failed");
    let status = *resp.status();
    let value = if resp.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(resp.body()).expect("Response is not JSON")
    };
    (status, value)
}

#[tokio::test]
async fn test_full_submission_flow() {
    let store = MemoryPostStore::new();

    // 1. Submit
    let (status, post) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "Bus passes for students should be free.", "category": "Education"})),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(post["category"], "Education");
    assert_eq!(post["upvotes"], 0);
    assert_eq!(post["is_hidden"], false);
    assert!(post["timestamp"].is_string(), "timestamp missing: {:?}", post);
    let post_id = post["id"].as_str().unwrap().to_string();

    // 2. Upvote twice
    for expected in 1..=2u64 {
        let (status, body) = call(&store, Method::Post, &format!("/api/upvote/{}/", post_id), None).await;
        assert_eq!(status, 200);
        assert_eq!(body["id"], post_id.as_str());
        assert_eq!(body["upvotes"], expected);
    }

    // 3. List
    let (status, posts) = call(&store, Method::Get, "/api/posts/", None).await;
    assert_eq!(status, 200);
    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["upvotes"], 2);

    // 4. Hide, then it disappears from the public list but not from moderation
    let (status, _) = call(
        &store,
        Method::Post,
        &format!("/api/posts/{}/visibility/", post_id),
        Some(json!({"is_hidden": true})),
    )
    .await;
    assert_eq!(status, 200);

    let (_, public) = call(&store, Method::Get, "/api/posts/", None).await;
    assert!(public.as_array().unwrap().is_empty());

    let (_, moderation) = call(&store, Method::Get, "/api/posts/?include_hidden=true", None).await;
    assert_eq!(moderation.as_array().unwrap().len(), 1);
    assert_eq!(moderation[0]["is_hidden"], true);
}

#[tokio::test]
async fn test_post_message_validation() {
    let store = MemoryPostStore::new();

    let (status, body) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "123456789", "category": "Education"})),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("at least 10"));

    let (status, _) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "", "category": "Education"})),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "a".repeat(1001), "category": "Education"})),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "long enough message", "category": "General"})),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "1234567890", "category": "Mental Health"})),
    )
    .await;
    assert_eq!(status, 201);

    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn test_markup_is_stripped_on_submit() {
    let store = MemoryPostStore::new();

    let (status, post) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "<b>Plant</b> more trees<script>alert(1)</script>", "category": "Environment"})),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(post["message"], "Plant more trees");
}

#[tokio::test]
async fn test_plain_text_symbols_survive_submit() {
    let store = MemoryPostStore::new();

    for message in ["Fees & books cost too much", "Grades > wellbeing? No.", "Is 3 < 5 for class size?"] {
        let (status, post) = call(
            &store,
            Method::Post,
            "/api/posts/",
            Some(json!({"message": message, "category": "Education"})),
        )
        .await;
        assert_eq!(status, 201);
        assert_eq!(post["message"], message);
    }

    let (_, posts) = call(&store, Method::Get, "/api/posts/", None).await;
    assert!(posts
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["message"] == "Fees & books cost too much"));
}

#[tokio::test]
async fn test_length_bounds_count_typed_characters() {
    let store = MemoryPostStore::new();

    // Ampersands would expand to `&amp;` if measured after escaping.
    let at_limit = format!("{}&", "a".repeat(999));
    let (status, post) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": at_limit, "category": "Equality"})),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(post["message"].as_str().unwrap().chars().count(), 1000);

    let (status, _) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "&".repeat(10), "category": "Equality"})),
    )
    .await;
    assert_eq!(status, 201);

    let over = format!("{}&", "a".repeat(1000));
    let (status, body) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": over, "category": "Equality"})),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("1000"));

    // Markup-only input is empty once stripped.
    let (status, _) = call(
        &store,
        Method::Post,
        "/api/posts/",
        Some(json!({"message": "<script>alert(1)</script>", "category": "Equality"})),
    )
    .await;
    assert_eq!(status, 400);

    assert_eq!(store.snapshot().len(), 2);
}

#[tokio::test]
async fn test_upvote_unknown_post() {
    let store = MemoryPostStore::new();

    let missing = uuid_like();
    let (status, body) = call(&store, Method::Post, &format!("/api/upvote/{}/", missing), None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Post not found");

    let (status, _) = call(&store, Method::Post, "/api/upvote/42/", None).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_list_filters_and_sorts() {
    let store = MemoryPostStore::with_posts(demo_posts(now()));

    let (status, posts) = call(&store, Method::Get, "/api/posts/?sort=upvotes", None).await;
    assert_eq!(status, 200);
    let upvotes: Vec<u64> = posts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["upvotes"].as_u64().unwrap())
        .collect();
    assert!(upvotes.windows(2).all(|w| w[0] >= w[1]));

    let (_, posts) = call(&store, Method::Get, "/api/posts/?category=Mental+Health", None).await;
    let posts = posts.as_array().unwrap();
    assert!(!posts.is_empty());
    assert!(posts.iter().all(|p| p["category"] == "Mental Health"));

    let (status, _) = call(&store, Method::Get, "/api/posts/?category=Sports", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_analytics_endpoint() {
    let store = MemoryPostStore::new();
    for (message, category) in [
        ("Teachers need better pay here.", "Education"),
        ("Textbooks arrive months late.", "Education"),
        ("Too much smog in the city.", "Environment"),
    ] {
        let (status, _) = call(
            &store,
            Method::Post,
            "/api/posts/",
            Some(json!({"message": message, "category": category})),
        )
        .await;
        assert_eq!(status, 201);
    }

    let ids: Vec<String> = store.snapshot().into_iter().map(|p| p.id).collect();
    for _ in 0..3 {
        store.increment_upvote(&ids[0]).await.unwrap();
    }
    for _ in 0..5 {
        store.increment_upvote(&ids[1]).await.unwrap();
    }
    store.increment_upvote(&ids[2]).await.unwrap();

    let (status, report) = call(&store, Method::Get, "/api/analytics/", None).await;
    assert_eq!(status, 200);
    assert_eq!(report["total_posts"], 3);
    assert_eq!(report["total_upvotes"], 9);
    assert_eq!(report["average_display"], "3.0");
    assert_eq!(report["recent_posts"], 3);
    assert_eq!(report["category_stats"][0]["category"], "Education");
    assert_eq!(report["category_stats"][0]["count"], 2);
    assert_eq!(report["category_stats"][0]["total_upvotes"], 8);
    assert_eq!(report["category_stats"][0]["average_upvotes"], 4.0);
    assert_eq!(report["category_stats"][1]["category"], "Environment");
    assert_eq!(report["top_posts"][0]["upvotes"], 5);
}

#[tokio::test]
async fn test_unknown_routes() {
    let store = MemoryPostStore::new();

    let (status, _) = call(&store, Method::Get, "/api/nothing/", None).await;
    assert_eq!(status, 404);

    let (status, _) = call(&store, Method::Delete, "/api/posts/", None).await;
    assert_eq!(status, 405);
}

fn uuid_like() -> String {
    "9b2f4a7e-3c1d-4e8f-a5b6-0c7d8e9f1a2b".to_string()
}
