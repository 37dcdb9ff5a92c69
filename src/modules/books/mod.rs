pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookstore_db::DocumentStore;
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

pub use error::{BookError, BookResult};
pub use models::Book;
pub use repository::BookRepository;

/// Books module: CRUD over the book collection
pub struct BooksModule {
    repository: Arc<BookRepository>,
}

impl BooksModule {
    pub fn new(repository: Arc<BookRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            collection = self.repository.collection(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_id = json!({
            "in": "path",
            "name": "id",
            "required": true,
            "description": "The book ID (a UUID)",
            "schema": { "type": "string" }
        });
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let data = |description: &str, schema: serde_json::Value| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "properties": { "data": schema },
                            "required": ["data"]
                        }
                    }
                }
            })
        };
        let book = json!({ "$ref": "#/components/schemas/Book" });
        let body = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{schema}") }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Returns a list of all the books",
                        "tags": ["Book APIs"],
                        "responses": {
                            "200": data("The list of books was returned successfully", json!({
                                "type": "array",
                                "items": book.clone()
                            })),
                            "500": error("An error occurred while retrieving the books")
                        }
                    },
                    "post": {
                        "summary": "Create a new book",
                        "tags": ["Book APIs"],
                        "requestBody": body("BookInput"),
                        "responses": {
                            "201": data("The book was created successfully", book.clone()),
                            "400": error("The request body is not a JSON object"),
                            "422": error("A required field is missing or invalid"),
                            "500": error("An error occurred while creating the book")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Returns the book by ID",
                        "tags": ["Book APIs"],
                        "parameters": [book_id.clone()],
                        "responses": {
                            "200": data("The book was returned successfully", book.clone()),
                            "400": error("The book ID is malformed"),
                            "404": error("The book with the given ID was not found"),
                            "500": error("An error occurred while retrieving the book")
                        }
                    },
                    "put": {
                        "summary": "Update a book by its ID",
                        "tags": ["Book APIs"],
                        "parameters": [book_id.clone()],
                        "requestBody": body("BookUpdate"),
                        "responses": {
                            "200": data("The book was updated successfully", book.clone()),
                            "400": error("The book ID or request body is malformed"),
                            "404": error("The book with the given ID was not found"),
                            "422": error("A provided field is invalid"),
                            "500": error("An error occurred while updating the book")
                        }
                    },
                    "delete": {
                        "summary": "Delete the book by ID",
                        "tags": ["Book APIs"],
                        "parameters": [book_id],
                        "responses": {
                            "200": data("The book was deleted successfully", book),
                            "400": error("The book ID is malformed"),
                            "404": error("The book with the given ID was not found"),
                            "500": error("An error occurred while deleting the book")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "The auto-generated id of the book" },
                            "title": { "type": "string", "description": "The title of the book" },
                            "author": { "type": "string", "description": "The author of the book" },
                            "price": { "type": "number", "description": "The price of the book" },
                            "createdAt": {
                                "type": "string",
                                "format": "date-time",
                                "description": "When the book was first added"
                            },
                            "updatedAt": {
                                "type": "string",
                                "format": "date-time",
                                "description": "When the book was last modified"
                            },
                            "revision": { "type": "integer", "description": "Revision number" }
                        },
                        "required": ["id", "title", "author", "price", "createdAt", "updatedAt", "revision"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "price": { "type": "number" }
                        },
                        "required": ["title", "author", "price"],
                        "example": {
                            "title": "Harry Potter and the Chamber of Secrets",
                            "author": "J.K. Rowling",
                            "price": 200
                        }
                    },
                    "BookUpdate": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "author": { "type": "string" },
                            "price": { "type": "number" }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over the given store collection
pub fn create_module(store: Arc<dyn DocumentStore>, collection: &str) -> Arc<dyn Module> {
    let repository = BookRepository::new(store, collection);
    Arc::new(BooksModule::new(Arc::new(repository)))
}
