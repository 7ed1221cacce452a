//! Handlers backing `/connectors/...` (§10.5). Each one is JSON glue over
//! `SupervisorRegistry` — none of them touch translation logic directly.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use supervisor::SupervisorRegistry;

use crate::result::R;

/// Union of every field an admin verb's JSON body might carry. Unused
/// fields for a given verb are simply ignored.
#[derive(Deserialize, Default)]
pub struct VerbBody {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub source_object: Option<String>,
    #[serde(default)]
    pub destination_object: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// `POST /connectors/{name}/{verb}` — dispatches by path segment so the
/// route table mirrors the eleven admin verbs of §6 directly.
pub async fn dispatch(
    registry: web::Data<Arc<SupervisorRegistry>>,
    path: web::Path<(String, String)>,
    body: web::Json<VerbBody>,
) -> HttpResponse {
    let (name, verb) = path.into_inner();
    let body = body.into_inner();

    let result = match verb.as_str() {
        "start" => registry.start(&name).await,
        "stop" => registry.stop(&name).await,
        "pause" => registry.pause(&name).await,
        "resume" => registry.resume(&name).await,
        "set_offset" => match (body.offset, body.file) {
            (Some(offset), Some(file)) => registry.set_offset(&name, &offset, &file).await,
            _ => return HttpResponse::BadRequest().json(R::error(400, "set_offset requires offset and file")),
        },
        "add_conninfo" => match (body.host, body.port, body.user, body.credential) {
            (Some(host), Some(port), Some(user), Some(credential)) => {
                registry.add_conninfo(&name, &host, port, &user, &credential).await
            }
            _ => return HttpResponse::BadRequest().json(R::error(400, "add_conninfo requires host, port, user, credential")),
        },
        "delete_conninfo" => registry.delete_conninfo(&name).await,
        "add_extra_conninfo" => match (body.key, body.value) {
            (Some(key), Some(value)) => registry.add_extra_conninfo(&name, &key, &value).await,
            _ => return HttpResponse::BadRequest().json(R::error(400, "add_extra_conninfo requires key and value")),
        },
        "delete_extra_conninfo" => match body.key {
            Some(key) => registry.delete_extra_conninfo(&name, &key).await,
            None => return HttpResponse::BadRequest().json(R::error(400, "delete_extra_conninfo requires key")),
        },
        "add_objmap" => match (body.object_type, body.source_object, body.destination_object) {
            (Some(object_type), Some(source_object), Some(destination_object)) => {
                registry.add_objmap(&name, &object_type, &source_object, &destination_object).await
            }
            _ => return HttpResponse::BadRequest()
                .json(R::error(400, "add_objmap requires object_type, source_object, destination_object")),
        },
        "delete_objmap" => match body.source_object {
            Some(source_object) => registry.delete_objmap(&name, &source_object).await,
            None => return HttpResponse::BadRequest().json(R::error(400, "delete_objmap requires source_object")),
        },
        other => return HttpResponse::NotFound().json(R::error(404, format!("unknown admin verb: {other}"))),
    };

    match result {
        Ok(()) => HttpResponse::Ok().json(R::success("ok")),
        Err(e) => HttpResponse::UnprocessableEntity().json(R::error(1, e.to_string())),
    }
}

/// `GET /connectors/{name}/status` — a `SharedStatus` snapshot.
pub async fn status(registry: web::Data<Arc<SupervisorRegistry>>, path: web::Path<String>) -> HttpResponse {
    match registry.status(&path.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(R::error(404, "unknown connector")),
    }
}

/// `GET /connectors` — the configured connector names.
pub async fn list(registry: web::Data<Arc<SupervisorRegistry>>) -> HttpResponse {
    HttpResponse::Ok().json(registry.connector_names())
}
