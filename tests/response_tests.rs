use oprouter::model::{ScalarType, TypeDescriptor};
use oprouter::{
    Api, ApiConfig, ApiConfigError, ApiModel, HandlerError, OneOf2, OneOf3, ParamSpec, RawRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize, Deserialize, ApiModel)]
struct Created {
    id: i64,
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
struct Existing {
    id: i64,
    name: String,
}

#[derive(Debug, Serialize, Deserialize, ApiModel)]
struct Problem {
    message: String,
}

/// Claims to be an integer but serializes as a string.
#[derive(Debug, Serialize, Deserialize)]
struct Mislabeled(String);

impl ApiModel for Mislabeled {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::scalar(ScalarType::Integer)
    }
}

fn upsert_api(config: ApiConfig) -> Api {
    let api = Api::new(config);
    api.put("/things/<int:id>")
        .param(ParamSpec::of::<i64>("id"))
        .response::<Existing>(200)
        .response::<Created>(201)
        .response::<Problem>(409)
        .handle(|args| {
            let id = *args.get::<i64>("id")?;
            Ok(match id {
                1 => OneOf3::A(Existing { id, name: "one".into() }),
                13 => OneOf3::C(Problem { message: "locked".into() }),
                _ => OneOf3::B(Created { id }),
            })
        })
        .unwrap();
    api
}

fn put(path: &str) -> RawRequest {
    RawRequest::new(http::Method::PUT, path)
}

#[test]
fn test_union_member_selects_status() {
    let svc = upsert_api(ApiConfig::default()).build().unwrap();

    let resp = svc.handle(put("/things/1"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json_body(), Some(&json!({"id": 1, "name": "one"})));

    let resp = svc.handle(put("/things/7"));
    assert_eq!(resp.status, 201);
    assert_eq!(resp.json_body(), Some(&json!({"id": 7})));

    let resp = svc.handle(put("/things/13"));
    assert_eq!(resp.status, 409);
    assert_eq!(resp.json_body(), Some(&json!({"message": "locked"})));
}

#[test]
fn test_single_model_with_declared_status() {
    let api = Api::new(ApiConfig::default());
    api.post("/things")
        .response::<Created>(201)
        .handle(|_| Ok(Created { id: 9 }))
        .unwrap();
    let svc = api.build().unwrap();
    let resp = svc.handle(RawRequest::post("/things"));
    assert_eq!(resp.status, 201);
    assert_eq!(resp.content_type, "application/json");
}

#[test]
fn test_handler_status_error() {
    let api = Api::new(ApiConfig::default());
    api.get("/gone")
        .handle(|_| -> Result<Created, HandlerError> { Err(HandlerError::status(410, "moved on")) })
        .unwrap();
    let svc = api.build().unwrap();
    let resp = svc.handle(RawRequest::get("/gone"));
    assert_eq!(resp.status, 410);
    assert_eq!(resp.json_body(), Some(&json!({"error": "moved on"})));
}

#[test]
fn test_out_of_range_handler_status_becomes_500() {
    let api = Api::new(ApiConfig::default());
    api.get("/zero")
        .handle(|_| -> Result<Created, HandlerError> { Err(HandlerError::status(0, "nothing")) })
        .unwrap();
    api.get("/huge")
        .handle(|_| -> Result<Created, HandlerError> { Err(HandlerError::status(1000, "too big")) })
        .unwrap();
    let svc = api.build().unwrap();
    for path in ["/zero", "/huge"] {
        let resp = svc.handle(RawRequest::get(path));
        assert_eq!(resp.status, 500, "{path}");
        assert_eq!(resp.json_body(), Some(&json!({"error": "Internal Server Error"})));
    }
}

#[test]
fn test_handler_failure_is_500() {
    let api = Api::new(ApiConfig::default());
    api.get("/boom")
        .handle(|_| -> Result<Created, HandlerError> { Err(anyhow::anyhow!("disk on fire").into()) })
        .unwrap();
    let resp = api.build().unwrap().handle(RawRequest::get("/boom"));
    assert_eq!(resp.status, 500);
    assert_eq!(resp.json_body(), Some(&json!({"error": "Internal Server Error"})));
}

#[test]
fn test_plain_string_is_text() {
    let api = Api::new(ApiConfig::default());
    api.get("/hello").handle(|_| Ok("hi there".to_string())).unwrap();
    let resp = api.build().unwrap().handle(RawRequest::get("/hello"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "text/plain");
    assert_eq!(resp.body_bytes(), b"hi there".to_vec());
}

#[test]
fn test_response_self_check() {
    let register = |api: &Api| {
        api.get("/lie").handle(|_| Ok(Mislabeled("nope".into()))).unwrap();
    };

    let lenient = Api::new(ApiConfig::default());
    register(&lenient);
    let resp = lenient.build().unwrap().handle(RawRequest::get("/lie"));
    assert_eq!(resp.status, 200);

    let mut config = ApiConfig::default();
    config.validate_responses = true;
    let strict = Api::new(config);
    register(&strict);
    let resp = strict.build().unwrap().handle(RawRequest::get("/lie"));
    assert_eq!(resp.status, 500);
}

#[test]
fn test_contract_errors_at_registration() {
    let api = Api::new(ApiConfig::default());

    let err = api
        .get("/a")
        .handle(|_| Ok(OneOf2::<Created, Problem>::A(Created { id: 1 })))
        .unwrap_err();
    assert_eq!(err, ApiConfigError::ReturnTypeNotSpecified);

    let err = api
        .get("/b")
        .response::<Created>(200)
        .handle(|_| Ok(OneOf2::<Created, Problem>::A(Created { id: 1 })))
        .unwrap_err();
    assert!(matches!(err, ApiConfigError::UncoveredResponseModel { ref model } if model.ends_with("Problem")));

    let err = api
        .get("/c")
        .response::<Existing>(200)
        .handle(|_| Ok(Created { id: 1 }))
        .unwrap_err();
    assert!(matches!(err, ApiConfigError::ResponseModelMismatch { status: 200, .. }));

    let err = api
        .get("/d")
        .response::<Created>(200)
        .response::<Created>(201)
        .response::<Problem>(400)
        .handle(|_| Ok(OneOf2::<Created, Problem>::A(Created { id: 1 })))
        .unwrap_err();
    assert!(matches!(err, ApiConfigError::AmbiguousResponseModel { .. }));

    let err = api
        .get("/e")
        .response::<Created>(200)
        .response::<Created>(200)
        .handle(|_| Ok(Created { id: 1 }))
        .unwrap_err();
    assert_eq!(err, ApiConfigError::DuplicateStatus { status: 200 });

    let err = api
        .get("/f")
        .response::<Created>(700)
        .handle(|_| Ok(Created { id: 1 }))
        .unwrap_err();
    assert_eq!(err, ApiConfigError::InvalidStatus { status: 700 });

    let err = api.get("/g").handle(|_| Ok(())).unwrap_err();
    assert!(matches!(err, ApiConfigError::UnsupportedType(_)));
}
