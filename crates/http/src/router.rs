//! Assembles module routers, pages, middleware and API docs into one `Router`.

use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};
use utoipa_swagger_ui::SwaggerUi;

use bookstore_kernel::ModuleRegistry;

use crate::MakeRequestUuid;

const API_TITLE: &str = "Bookstore API";
const API_VERSION: &str = "1.0.0";

/// Layers only wrap what is already mounted, so add routes first and finish
/// with the `with_*` middleware calls.
#[derive(Default)]
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Nest a module's JSON routes under `/api/{module_name}`.
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        self.router = self.router.nest(&api_prefix(module_name), module_router);
        self
    }

    pub fn merge_pages(mut self, pages: Router) -> Self {
        self.router = self.router.merge(pages);
        self
    }

    /// Serve the merged document at `/docs/openapi.json` and Swagger UI at `/swagger-ui`.
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let document = merged_openapi(registry);

        let typed: OpenApi = serde_json::from_value(document.clone()).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "merged OpenAPI document does not parse, serving an empty one");
            OpenApiBuilder::new()
                .info(InfoBuilder::new().title(API_TITLE).version(API_VERSION).build())
                .build()
        });

        self.router = self
            .router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", typed))
            .route(
                "/docs/openapi.json",
                get(move || {
                    let document = document.clone();
                    async move { Json(document) }
                }),
            );
        self
    }

    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Tag each request with `x-request-id` and echo it on the response.
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    pub fn build(self) -> Router {
        self.router
    }
}

fn api_prefix(module_name: &str) -> String {
    format!("/api/{}", module_name)
}

fn base_document() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "version": API_VERSION,
            "description": "Books and categories of the bookstore catalogue"
        },
        "paths": {
            "/healthz": {
                "get": {
                    "summary": "Health check",
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": { "type": "string" },
                                "message": { "type": "string" },
                                "details": { "type": "array", "items": {} },
                                "trace_id": { "type": "string" },
                                "timestamp": { "type": "string" }
                            },
                            "required": ["code", "message", "trace_id", "timestamp"]
                        }
                    },
                    "required": ["error"]
                }
            }
        }
    })
}

fn object_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a Map<String, Value>> {
    value.pointer(pointer).and_then(Value::as_object)
}

/// Base document plus every module's `paths` (re-rooted under the module
/// prefix) and `components.schemas`. Later modules win on name clashes.
pub fn merged_openapi(registry: &ModuleRegistry) -> Value {
    let mut document = base_document();

    for module in registry.modules() {
        let Some(fragment) = module.openapi() else {
            continue;
        };
        let prefix = api_prefix(module.name());

        for (path, item) in object_at(&fragment, "/paths").into_iter().flatten() {
            let full = if path == "/" {
                prefix.clone()
            } else {
                format!("{}{}", prefix, path)
            };
            document["paths"][full] = item.clone();
        }

        for (name, schema) in object_at(&fragment, "/components/schemas")
            .into_iter()
            .flatten()
        {
            document["components"]["schemas"][name] = schema.clone();
        }
    }

    document
}
