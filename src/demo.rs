//! In-memory pet store used by the `oprouter` binary, the benchmarks, and
//! the integration tests.
//!
//! Routes (under the configured prefix):
//!
//! | Method | Path | Auth | Returns |
//! |--------|------|------|---------|
//! | GET | `/health` | none | `text/plain` |
//! | GET | `/pets` | none | `200: [Pet]` |
//! | POST | `/pets` | bearer | `201: Pet` |
//! | GET | `/pets/{pet_id}` | none | `200: Pet`, `404: ApiMessage` |
//! | DELETE | `/pets/{pet_id}` | bearer, `pets:write` | `200: ApiMessage` |
//!
//! The bearer token is [`DEMO_TOKEN`].

use crate::config::ApiConfig;
use crate::dispatcher::{HandlerError, OneOf2};
use crate::error::ApiConfigError;
use crate::operation::{CallbackDescriptor, DocRecord};
use crate::params::ParamSpec;
use crate::router::Router;
use crate::security::{AuthRequirement, HttpBearer};
use crate::{Api, ApiModel};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};

/// Token accepted by the demo bearer scheme.
pub const DEMO_TOKEN: &str = "demo-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ApiModel)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Cat,
    Dog,
    Bird,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ApiModel)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub tags: Vec<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ApiModel)]
pub struct NewPet {
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub tags: Vec<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ApiModel)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Shared pet storage.
#[derive(Debug, Default)]
pub struct PetStore {
    pets: RwLock<Vec<Pet>>,
}

impl PetStore {
    /// Store seeded with two pets.
    pub fn seeded() -> Self {
        let store = Self::default();
        store.insert(NewPet {
            name: "Whiskers".into(),
            species: Species::Cat,
            tags: vec!["indoor".into()],
            owner: Some("ada".into()),
        });
        store.insert(NewPet {
            name: "Rex".into(),
            species: Species::Dog,
            tags: Vec::new(),
            owner: None,
        });
        store
    }

    pub fn insert(&self, new: NewPet) -> Pet {
        let mut pets = self.pets.write().unwrap_or_else(PoisonError::into_inner);
        let id = pets.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let pet = Pet {
            id,
            name: new.name,
            species: new.species,
            tags: new.tags,
            owner: new.owner,
        };
        pets.push(pet.clone());
        pet
    }

    pub fn get(&self, id: i64) -> Option<Pet> {
        let pets = self.pets.read().unwrap_or_else(PoisonError::into_inner);
        pets.iter().find(|p| p.id == id).cloned()
    }

    pub fn remove(&self, id: i64) -> bool {
        let mut pets = self.pets.write().unwrap_or_else(PoisonError::into_inner);
        let before = pets.len();
        pets.retain(|p| p.id != id);
        pets.len() != before
    }

    /// Pets matching every given filter, at most `limit` of them.
    pub fn list(&self, species: Option<Species>, tags: &[String], limit: usize) -> Vec<Pet> {
        let pets = self.pets.read().unwrap_or_else(PoisonError::into_inner);
        pets.iter()
            .filter(|p| species.map_or(true, |s| p.species == s))
            .filter(|p| tags.iter().all(|t| p.tags.contains(t)))
            .take(limit)
            .cloned()
            .collect()
    }
}

fn bearer() -> AuthRequirement {
    AuthRequirement::scheme(HttpBearer::new(|token| {
        (token == DEMO_TOKEN).then(|| json!({ "sub": "demo", "scope": "pets:write" }))
    }))
}

/// Router with every `/pets` operation, bound to `store`.
pub fn pets_router(store: Arc<PetStore>) -> Result<Router, ApiConfigError> {
    let pets = Router::with_prefix("/pets")?;

    let s = Arc::clone(&store);
    pets.get("")
        .param(ParamSpec::of::<Option<Species>>("species").description("Only this species"))
        .param(ParamSpec::of::<Vec<String>>("tags").query().default(json!([])))
        .param(ParamSpec::of::<u32>("limit").default(20))
        .tag("pets")
        .operation_id("listPets")
        .doc(
            DocRecord::new()
                .summary("List pets")
                .description(
                    "Filters combine with AND.\n    Tags must all be present on a pet.",
                )
                .param("tags", "Tags every returned pet carries")
                .param("limit", "Maximum number of pets"),
        )
        .handle(move |args| {
            let species = *args.get::<Option<Species>>("species")?;
            let tags = args.get::<Vec<String>>("tags")?;
            let limit = *args.get::<u32>("limit")? as usize;
            Ok(s.list(species, tags, limit))
        })?;

    let s = Arc::clone(&store);
    pets.post("")
        .param(ParamSpec::of::<NewPet>("pet"))
        .response::<Pet>(201)
        .auth(bearer())
        .tag("pets")
        .operation_id("createPet")
        .summary("Create a pet")
        .callback(
            CallbackDescriptor::new("petCreated", "{$request.query.callback_url}", Method::POST)
                .body::<Pet>()
                .param(ParamSpec::of::<String>("x_delivery").header())
                .response(200, "Notification received"),
        )
        .handle(move |args| Ok(s.insert(args.get::<NewPet>("pet")?.clone())))?;

    let s = Arc::clone(&store);
    pets.get("/<int(min=1):pet_id>")
        .param(ParamSpec::of::<i64>("pet_id").description("Pet identifier"))
        .response::<Pet>(200)
        .response::<ApiMessage>(404)
        .tag("pets")
        .operation_id("getPet")
        .summary("Read one pet")
        .handle(move |args| {
            let id = *args.get::<i64>("pet_id")?;
            Ok(match s.get(id) {
                Some(pet) => OneOf2::A(pet),
                None => OneOf2::B(ApiMessage::new(format!("pet {id} not found"))),
            })
        })?;

    let s = store;
    pets.delete("/<int:pet_id>")
        .param(ParamSpec::of::<i64>("pet_id"))
        .auth(bearer().with_scopes(["pets:write"]))
        .tag("pets")
        .operation_id("deletePet")
        .summary("Delete a pet")
        .deprecated()
        .handle(move |args| {
            let id = *args.get::<i64>("pet_id")?;
            if s.remove(id) {
                Ok(ApiMessage::new(format!("pet {id} deleted")))
            } else {
                Err(HandlerError::not_found(format!("pet {id} not found")))
            }
        })?;

    Ok(pets)
}

/// The complete demo API.
pub fn pet_store_api(config: ApiConfig, store: Arc<PetStore>) -> Result<Api, ApiConfigError> {
    let api = Api::new(config);
    api.get("/health")
        .summary("Liveness probe")
        .handle(|_| Ok("ok".to_string()))?;
    api.add_router(&pets_router(store)?, "")?;
    Ok(api)
}

/// Demo configuration used when no config file is given.
pub fn default_config() -> ApiConfig {
    ApiConfig {
        title: "Pet Store".to_string(),
        description: Some(
            "A small pet store.\n    Shows parameter binding, unions, and auth.".to_string(),
        ),
        version: "1.0.0".to_string(),
        ..ApiConfig::default()
    }
}
