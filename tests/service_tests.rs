use oprouter::demo::{default_config, pet_store_api, PetStore, DEMO_TOKEN};
use oprouter::ids::REQUEST_ID_HEADER;
use oprouter::{ApiConfig, ApiService, RawRequest};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn service_with(config: ApiConfig) -> ApiService {
    pet_store_api(config, Arc::new(PetStore::seeded()))
        .unwrap()
        .build()
        .unwrap()
}

fn service() -> ApiService {
    service_with(default_config())
}

fn authed(req: RawRequest) -> RawRequest {
    req.header("Authorization", format!("Bearer {DEMO_TOKEN}"))
}

#[test]
fn test_list_and_filter() {
    let svc = service();
    let all = svc.handle(RawRequest::get("/pets"));
    assert_eq!(all.status, 200);
    assert_eq!(all.json_body().unwrap().as_array().unwrap().len(), 2);

    let cats = svc.handle(RawRequest::get("/pets?species=cat&tags=indoor"));
    let cats = cats.json_body().unwrap().as_array().unwrap().clone();
    assert_eq!(cats.len(), 1);
    assert_eq!(cats[0]["name"], "Whiskers");

    let limited = svc.handle(RawRequest::get("/pets?limit=1"));
    assert_eq!(limited.json_body().unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn test_unknown_enum_value_is_422() {
    let svc = service();
    let resp = svc.handle(RawRequest::get("/pets?species=fish"));
    assert_eq!(resp.status, 422);
    let detail = &resp.json_body().unwrap()["details"][0];
    assert_eq!(detail["parameter"], "species");
    assert_eq!(detail["source"], "query");
    assert_eq!(detail["reason"], "unknown_variant");
}

#[test]
fn test_get_pet_union() {
    let svc = service();
    let found = svc.handle(RawRequest::get("/pets/2"));
    assert_eq!(found.status, 200);
    assert_eq!(
        found.json_body(),
        Some(&json!({"id": 2, "name": "Rex", "species": "dog", "tags": [], "owner": null}))
    );

    let missing = svc.handle(RawRequest::get("/pets/99"));
    assert_eq!(missing.status, 404);
    assert_eq!(missing.json_body(), Some(&json!({"message": "pet 99 not found"})));
}

#[test]
fn test_create_requires_auth_then_returns_201() {
    let svc = service();
    let body = json!({"name": "Tweety", "species": "bird"});

    let anonymous = svc.handle(RawRequest::post("/pets").json(&body).unwrap());
    assert_eq!(anonymous.status, 401);

    let wrong = svc.handle(
        RawRequest::post("/pets")
            .header("Authorization", "Bearer nope")
            .json(&body)
            .unwrap(),
    );
    assert_eq!(wrong.status, 401);

    let created = svc.handle(authed(RawRequest::post("/pets")).json(&body).unwrap());
    assert_eq!(created.status, 201);
    let pet = created.json_body().unwrap().clone();
    assert_eq!(pet["id"], 3);
    assert_eq!(pet["tags"], json!([]));

    let fetched = svc.handle(RawRequest::get("/pets/3"));
    assert_eq!(fetched.json_body(), Some(&pet));
}

#[test]
fn test_delete_then_404() {
    let svc = service();
    let del = |path: &str| svc.handle(authed(RawRequest::new(http::Method::DELETE, path)));

    let first = del("/pets/1");
    assert_eq!(first.status, 200);
    assert_eq!(first.json_body(), Some(&json!({"message": "pet 1 deleted"})));

    let again = del("/pets/1");
    assert_eq!(again.status, 404);
    assert_eq!(again.json_body(), Some(&json!({"error": "pet 1 not found"})));
}

#[test]
fn test_not_found_and_method_not_allowed() {
    let svc = service();
    let nf = svc.handle(RawRequest::get("/nope"));
    assert_eq!(nf.status, 404);
    assert_eq!(nf.json_body(), Some(&json!({"error": "Not Found"})));

    let na = svc.handle(RawRequest::new(http::Method::PATCH, "/pets/1"));
    assert_eq!(na.status, 405);
    assert_eq!(na.header("allow"), Some("GET, DELETE"));
}

#[test]
fn test_openapi_and_docs_routes() {
    let svc = service();
    let doc = svc.handle(RawRequest::get("/openapi.json"));
    assert_eq!(doc.status, 200);
    assert_eq!(doc.json_body(), Some(&svc.document().to_json()));

    let page = svc.handle(RawRequest::get("/docs"));
    assert_eq!(page.status, 200);
    assert!(page.content_type.starts_with("text/html"));
    let html = String::from_utf8(page.body_bytes()).unwrap();
    assert!(html.contains("url: \"/openapi.json\""));
    assert!(html.contains("<title>Pet Store</title>"));
}

#[test]
fn test_docs_follow_prefix_and_can_be_disabled() {
    let mut config = default_config();
    config.prefix = "/api".into();
    let svc = service_with(config.clone());
    assert_eq!(svc.handle(RawRequest::get("/api/openapi.json")).status, 200);
    let page = svc.handle(RawRequest::get("/api/docs"));
    assert!(String::from_utf8(page.body_bytes())
        .unwrap()
        .contains("/api/openapi.json"));
    assert_eq!(svc.handle(RawRequest::get("/api/pets/1")).status, 200);

    config.docs_url = None;
    let svc = service_with(config);
    assert_eq!(svc.handle(RawRequest::get("/api/docs")).status, 404);
}

#[test]
fn test_request_id_generated_or_propagated() {
    let svc = service();
    let generated = svc.handle(RawRequest::get("/health"));
    let id = generated.header(REQUEST_ID_HEADER).unwrap();
    assert_eq!(id.len(), 26);

    let inbound = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
    let echoed = svc.handle(RawRequest::get("/nope").header("X-Request-Id", inbound));
    assert_eq!(echoed.header(REQUEST_ID_HEADER), Some(inbound));
}

#[test]
fn test_service_is_shareable_across_threads() {
    let svc = Arc::new(service());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let svc = Arc::clone(&svc);
            thread::spawn(move || {
                let resp = svc.handle(RawRequest::get(format!("/pets/{}", i % 2 + 1)));
                resp.status
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), 200);
    }
}
