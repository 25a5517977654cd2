use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use oprouter::demo::{default_config, pet_store_api, PetStore};
use oprouter::router::RouteTable;
use oprouter::{Api, ApiConfig, ParamSpec, RawRequest, Router};
use std::sync::Arc;

fn pet_store() -> Api {
    pet_store_api(default_config(), Arc::new(PetStore::seeded())).expect("demo api builds")
}

fn nested_api() -> Api {
    let api = Api::new(ApiConfig::new("Zoo", "1.0.0"));
    let animals = Router::with_prefix("/animals").expect("static prefix");
    animals
        .get("/<int:id>")
        .param(ParamSpec::of::<i64>("id"))
        .handle(|args| Ok(*args.get::<i64>("id")?))
        .expect("register animal");
    animals
        .get("/<int:id>/toys/<toy_id>")
        .param(ParamSpec::of::<i64>("id"))
        .param(ParamSpec::of::<String>("toy_id"))
        .handle(|args| Ok(args.get::<String>("toy_id")?.clone()))
        .expect("register toy");
    let zoo = Router::with_prefix("/zoo").expect("static prefix");
    zoo.add_router(&animals, "").expect("mount animals");
    for section in ["north", "south", "east", "west"] {
        zoo.get(&format!("/{section}/<path:rest>"))
            .param(ParamSpec::of::<String>("rest"))
            .handle(|args| Ok(args.get::<String>("rest")?.clone()))
            .expect("register section");
    }
    api.add_router(&zoo, "").expect("mount zoo");
    api
}

fn bench_route_lookup(c: &mut Criterion) {
    let operations = nested_api().operations().expect("flatten");
    let table = RouteTable::new(&operations).expect("compile routes");
    let paths = [
        (Method::GET, "/zoo/animals/123"),
        (Method::GET, "/zoo/animals/123/toys/ball"),
        (Method::GET, "/zoo/west/a/b/c"),
        (Method::POST, "/zoo/animals/1"),
        (Method::GET, "/does/not/exist"),
    ];
    c.bench_function("route_lookup", |b| {
        b.iter(|| {
            for (method, path) in paths.iter() {
                black_box(table.lookup(method, path));
            }
        })
    });
}

fn bench_flatten(c: &mut Criterion) {
    let api = nested_api();
    c.bench_function("flatten", |b| b.iter(|| black_box(api.operations())));
}

fn bench_synthesize(c: &mut Criterion) {
    let api = pet_store();
    c.bench_function("synthesize_document", |b| b.iter(|| black_box(api.openapi())));
}

fn bench_dispatch(c: &mut Criterion) {
    let service = pet_store().build().expect("service builds");
    c.bench_function("dispatch_get_pet", |b| {
        b.iter(|| black_box(service.handle(RawRequest::get("/pets/1"))))
    });
    c.bench_function("dispatch_list_pets_filtered", |b| {
        b.iter(|| {
            black_box(service.handle(RawRequest::get("/pets?species=cat&tags=indoor&limit=5")))
        })
    });
    c.bench_function("dispatch_validation_error", |b| {
        b.iter(|| black_box(service.handle(RawRequest::get("/pets/abc"))))
    });
}

criterion_group!(
    benches,
    bench_route_lookup,
    bench_flatten,
    bench_synthesize,
    bench_dispatch
);
criterion_main!(benches);
