use oas3::OpenApiV3Spec;
use oprouter::demo::{default_config, pet_store_api, Pet, PetStore, Species};
use oprouter::security::{AuthRequirement, HttpBearer};
use oprouter::{Api, ApiConfig, ApiModel, DocRecord, ParamSpec, RawRequest, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

fn pet_doc() -> Value {
    pet_store_api(default_config(), Arc::new(PetStore::seeded()))
        .unwrap()
        .openapi()
        .unwrap()
        .to_json()
}

#[test]
fn test_document_parses_as_openapi_31() {
    let doc = pet_doc();
    let spec: OpenApiV3Spec = serde_json::from_value(doc).unwrap();
    assert_eq!(spec.openapi, "3.1.0");
    assert_eq!(spec.info.title, "Pet Store");
    let paths = spec.paths.as_ref().unwrap();
    let mut ids: Vec<String> = paths
        .values()
        .flat_map(|item| item.methods().into_iter().map(|(_, op)| op.operation_id.clone()))
        .flatten()
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["createPet", "deletePet", "getPet", "listPets"]);
}

#[test]
fn test_paths_in_registration_order() {
    let doc = pet_doc();
    let paths: Vec<&String> = doc["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/health", "/pets", "/pets/{pet_id}"]);
    let methods: Vec<&String> = doc["paths"]["/pets"].as_object().unwrap().keys().collect();
    assert_eq!(methods, vec!["get", "post"]);
}

#[test]
fn test_info_description_is_dedented() {
    let doc = pet_doc();
    assert_eq!(
        doc["info"]["description"],
        "A small pet store.\nShows parameter binding, unions, and auth."
    );
}

#[test]
fn test_list_parameters() {
    let doc = pet_doc();
    let list = &doc["paths"]["/pets"]["get"];
    assert_eq!(list["summary"], "List pets");
    assert_eq!(
        list["description"],
        "Filters combine with AND.\nTags must all be present on a pet."
    );
    assert_eq!(list["tags"], json!(["pets"]));
    assert!(list.get("security").is_none());
    assert_eq!(
        list["parameters"],
        json!([
            {
                "name": "species",
                "in": "query",
                "required": false,
                "description": "Only this species",
                "schema": {"$ref": "#/components/schemas/Species"}
            },
            {
                "name": "tags",
                "in": "query",
                "required": false,
                "description": "Tags every returned pet carries",
                "schema": {"type": "array", "items": {"type": "string"}, "default": []}
            },
            {
                "name": "limit",
                "in": "query",
                "required": false,
                "description": "Maximum number of pets",
                "schema": {"type": "integer", "default": 20}
            }
        ])
    );
    assert_eq!(
        list["responses"]["200"]["content"]["application/json"]["schema"],
        json!({"type": "array", "items": {"$ref": "#/components/schemas/Pet"}})
    );
}

#[test]
fn test_union_responses_and_path_hints() {
    let doc = pet_doc();
    let get = &doc["paths"]["/pets/{pet_id}"]["get"];
    assert_eq!(get["responses"]["200"]["description"], "OK");
    assert_eq!(
        get["responses"]["404"],
        json!({
            "description": "Not Found",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiMessage"}}}
        })
    );
    let param = &get["parameters"][0];
    assert_eq!(param["name"], "pet_id");
    assert_eq!(param["in"], "path");
    assert_eq!(param["required"], true);
    assert_eq!(param["schema"]["minimum"], 1);
}

#[test]
fn test_body_security_and_callbacks() {
    let doc = pet_doc();
    let create = &doc["paths"]["/pets"]["post"];
    assert_eq!(
        create["requestBody"],
        json!({
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/NewPet"}}},
            "required": true
        })
    );
    assert!(create["responses"]["201"].is_object());
    assert!(create["responses"].get("200").is_none());
    assert_eq!(create["security"], json!([{"bearerTokenAuth": []}]));

    let callback = &create["callbacks"]["petCreated"]["{$request.query.callback_url}"]["post"];
    assert_eq!(
        callback["requestBody"]["content"]["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/Pet"})
    );
    assert_eq!(callback["parameters"][0]["name"], "x-delivery");
    assert_eq!(callback["parameters"][0]["in"], "header");
    assert_eq!(callback["responses"]["200"]["description"], "Notification received");

    let delete = &doc["paths"]["/pets/{pet_id}"]["delete"];
    assert_eq!(delete["security"], json!([{"bearerTokenAuth": ["pets:write"]}]));
    assert_eq!(delete["deprecated"], true);

    assert_eq!(
        doc["components"]["securitySchemes"]["bearerTokenAuth"],
        json!({"type": "http", "scheme": "bearer"})
    );
}

#[test]
fn test_health_is_text() {
    let doc = pet_doc();
    assert_eq!(
        doc["paths"]["/health"]["get"]["responses"]["200"]["content"],
        json!({"text/plain": {"schema": {"type": "string"}}})
    );
}

#[test]
fn test_components_validate_real_payloads() {
    let doc = pet_doc();
    let schema = json!({
        "$ref": "#/components/schemas/Pet",
        "components": doc["components"].clone()
    });
    let validator = jsonschema::validator_for(&schema).unwrap();

    let pet = Pet {
        id: 3,
        name: "Tweety".into(),
        species: Species::Bird,
        tags: vec![],
        owner: None,
    };
    assert!(validator.is_valid(&serde_json::to_value(&pet).unwrap()));
    assert!(!validator.is_valid(&json!({"id": 3, "name": "x", "species": "fish"})));
    assert!(!validator.is_valid(&json!({"name": "x", "species": "cat"})));

    let species = &doc["components"]["schemas"]["Species"];
    assert_eq!(species["enum"], json!(["cat", "dog", "bird"]));
}

#[derive(Serialize, Deserialize, ApiModel)]
#[serde(rename_all = "camelCase")]
struct Account {
    account_id: String,
    #[serde(rename = "displayName")]
    name: Option<String>,
    #[serde(skip)]
    cache: u8,
}

#[test]
fn test_derived_model_follows_serde_names() {
    let api = Api::new(ApiConfig::new("Accounts", "0.1.0"));
    api.get("/account")
        .handle(|_| {
            Ok(Account {
                account_id: "a".into(),
                name: None,
                cache: 0,
            })
        })
        .unwrap();
    let doc = api.openapi().unwrap().to_json();
    assert_eq!(
        doc["components"]["schemas"]["Account"],
        json!({
            "title": "Account",
            "type": "object",
            "properties": {
                "accountId": {"type": "string"},
                "displayName": {"anyOf": [{"type": "string"}, {"type": "null"}]}
            },
            "required": ["accountId"]
        })
    );
}

#[derive(Serialize, Deserialize, ApiModel)]
struct Counter {
    name: String,
    #[serde(default)]
    count: i64,
}

#[test]
fn test_serde_default_field_is_optional_but_not_nullable() {
    let api = Api::new(ApiConfig::new("Counters", "0.1.0"));
    api.post("/counters")
        .param(ParamSpec::of::<Counter>("counter"))
        .handle(|args| Ok(args.get::<Counter>("counter")?.count))
        .unwrap();
    let doc = api.openapi().unwrap().to_json();
    let counter = &doc["components"]["schemas"]["Counter"];
    assert_eq!(counter["properties"]["count"], json!({"type": "integer"}));
    assert_eq!(counter["required"], json!(["name"]));

    let schema = json!({
        "$ref": "#/components/schemas/Counter",
        "components": doc["components"].clone()
    });
    let validator = jsonschema::validator_for(&schema).unwrap();
    let service = api.build().unwrap();

    for (payload, accepted) in [
        (json!({"name": "x"}), true),
        (json!({"name": "x", "count": 4}), true),
        (json!({"name": "x", "count": null}), false),
    ] {
        assert_eq!(validator.is_valid(&payload), accepted, "{payload}");
        let resp = service.handle(RawRequest::post("/counters").json(&payload).unwrap());
        assert_eq!(resp.status == 200, accepted, "{payload}");
    }
}

mod billing {
    use oprouter::ApiModel;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, ApiModel)]
    pub struct Error {
        pub message: String,
    }
}

mod shipping {
    use oprouter::ApiModel;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, ApiModel)]
    pub struct Error {
        pub code: i64,
    }
}

#[derive(Serialize, Deserialize, ApiModel)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[test]
fn test_models_sharing_a_name_get_distinct_components() {
    let api = Api::new(ApiConfig::new("Shop", "0.1.0"));
    api.get("/billing/error")
        .handle(|_| Ok(billing::Error { message: "late".into() }))
        .unwrap();
    api.get("/shipping/error")
        .handle(|_| Ok(shipping::Error { code: 7 }))
        .unwrap();
    api.get("/pets")
        .handle(|_| Ok(Page::<Pet> { items: vec![], next: None }))
        .unwrap();
    api.get("/names")
        .handle(|_| Ok(Page::<String> { items: vec![], next: None }))
        .unwrap();
    let service = api.build().unwrap();
    let doc = service.document().to_json();

    let schema_ref = |path: &str| {
        doc["paths"][path]["get"]["responses"]["200"]["content"]["application/json"]["schema"]
            ["$ref"]
            .clone()
    };
    assert_eq!(schema_ref("/billing/error"), "#/components/schemas/Error");
    assert_eq!(schema_ref("/shipping/error"), "#/components/schemas/Error2");
    assert_eq!(schema_ref("/pets"), "#/components/schemas/PagePet");
    assert_eq!(schema_ref("/names"), "#/components/schemas/PageString");

    let schemas = &doc["components"]["schemas"];
    assert!(schemas["Error"]["properties"].get("message").is_some());
    assert!(schemas["Error2"]["properties"].get("code").is_some());
    assert_eq!(
        schemas["PagePet"]["properties"]["items"]["items"],
        json!({"$ref": "#/components/schemas/Pet"})
    );
}

#[test]
fn test_doc_record_fills_parameter_text_and_explicit_text_wins() {
    let api = Api::new(ApiConfig::default());
    let r = Router::new().with_auth(AuthRequirement::scheme(
        HttpBearer::new(|_| Some(json!({}))).named("teamToken"),
    ));
    r.get("/search")
        .param(ParamSpec::of::<String>("q").description("explicit"))
        .param(ParamSpec::of::<i64>("page").default(1))
        .summary("Explicit summary")
        .doc(
            DocRecord::new()
                .summary("Record summary")
                .param("q", "from record")
                .param("page", "Page number"),
        )
        .handle(|_| Ok(Vec::<String>::new()))
        .unwrap();
    api.add_router(&r, "").unwrap();
    let doc = api.openapi().unwrap().to_json();
    let op = &doc["paths"]["/search"]["get"];
    assert_eq!(op["summary"], "Explicit summary");
    assert_eq!(op["parameters"][0]["description"], "explicit");
    assert_eq!(op["parameters"][1]["description"], "Page number");
    assert_eq!(op["security"], json!([{"teamToken": []}]));
}

#[test]
fn test_document_is_stable_across_builds() {
    assert_eq!(
        serde_json::to_string(&pet_doc()).unwrap(),
        serde_json::to_string(&pet_doc()).unwrap()
    );
}
