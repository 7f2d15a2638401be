//! MCP Server for bookshelf-mcp
//!
//! MCP Protocol (stdio) <-> application::ShelfService
//!
//! 8 tools: shelf, book_submit, book_edit, book_cancel_edit, book_toggle, book_delete,
//! book_search, book_show

use std::sync::{Arc, Mutex, MutexGuard};

use rmcp::{
    handler::server::{tool::ToolCallContext, tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::application::error::AppError;
use crate::application::form::{BookForm, Submission};
use crate::application::service::ShelfService;
use crate::config::ShelfConfig;
use crate::domain::model::id::BookId;
use crate::domain::model::shelf::Mutation;
use crate::infra::file_store::FileStore;
use crate::infra::slot::SlotRepository;
use crate::interface::markdown::MarkdownRenderer;

type FileShelf = ShelfService<SlotRepository<FileStore>, MarkdownRenderer>;

// =============================================================================
// Public entry point
// =============================================================================

/// MCP Serverを起動する。
pub async fn run(config: ShelfConfig) -> anyhow::Result<()> {
    let server = BookshelfServer::open(&config)?;
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

// =============================================================================
// MCP Server
// =============================================================================

#[derive(Clone)]
struct BookshelfServer {
    shelf: Arc<Mutex<FileShelf>>,
    tool_router: ToolRouter<Self>,
}

impl BookshelfServer {
    fn open(config: &ShelfConfig) -> Result<Self, AppError> {
        let store = FileStore::new(&config.storage_dir);
        let repo = SlotRepository::new(store, config.storage_key.clone());
        let shelf = ShelfService::open(repo, MarkdownRenderer::new())?;
        Ok(Self {
            shelf: Arc::new(Mutex::new(shelf)),
            tool_router: Self::tool_router(),
        })
    }

    /// ツール呼び出しは1件ずつ、このロックの内側で完結する。
    fn lock(&self) -> Result<MutexGuard<'_, FileShelf>, McpError> {
        self.shelf
            .lock()
            .map_err(|_| McpError::internal_error("Lock poisoned", None))
    }

    fn to_mcp_error(e: AppError) -> McpError {
        match e {
            AppError::Form(e) => McpError::invalid_params(format!("{e}"), None),
            e => McpError::internal_error(format!("{e}"), None),
        }
    }

    // --- 同期のツール本体（ロック保持中に完結する） ---

    fn shelf_text(&self) -> Result<String, McpError> {
        let mut shelf = self.lock()?;
        shelf.refresh();
        Ok(shelf.renderer().last_frame().to_string())
    }

    fn submit_text(&self, form: &BookForm) -> Result<String, McpError> {
        let mut shelf = self.lock()?;
        let submission = shelf.submit(form).map_err(Self::to_mcp_error)?;
        let head = match submission {
            Submission::Added(id) => format!("Added: `{id}` {}", form.title.trim()),
            Submission::Updated(id, Mutation::Applied) => {
                format!("Updated: `{id}` {}", form.title.trim())
            }
            Submission::Updated(id, Mutation::NotFound) => {
                return Ok(format!(
                    "Book `{id}` no longer exists; nothing was updated. Edit mode cleared."
                ))
            }
        };
        Ok(format!("{head}\n\n{}", shelf.renderer().last_frame()))
    }

    fn edit_text(&self, id: BookId) -> Result<String, McpError> {
        let mut shelf = self.lock()?;
        match shelf.begin_edit(id) {
            Some(form) => {
                let fields = serde_json::to_string_pretty(&form).map_err(|e| {
                    McpError::internal_error(format!("Failed to encode form: {e}"), None)
                })?;
                Ok(format!(
                    "Editing `{id}`. Submit with `book_submit` to update ({}).\n\n{fields}",
                    form.submit_label()
                ))
            }
            None => Ok(format!("Book `{id}` not found; edit mode unchanged.")),
        }
    }

    fn cancel_edit_text(&self) -> Result<String, McpError> {
        let mut shelf = self.lock()?;
        Ok(match shelf.cancel_edit() {
            Some(id) => format!("Stopped editing `{id}`."),
            None => "Not editing any book.".to_string(),
        })
    }

    fn toggle_text(&self, id: BookId) -> Result<String, McpError> {
        let mut shelf = self.lock()?;
        match shelf.toggle(id).map_err(Self::to_mcp_error)? {
            Mutation::Applied => {
                let state = match shelf.find(id) {
                    Some(b) if b.is_complete() => "finished",
                    _ => "not finished",
                };
                Ok(format!(
                    "Marked `{id}` as {state}.\n\n{}",
                    shelf.renderer().last_frame()
                ))
            }
            Mutation::NotFound => Ok(format!("Book `{id}` not found; nothing changed.")),
        }
    }

    fn delete_text(&self, id: BookId) -> Result<String, McpError> {
        let mut shelf = self.lock()?;
        let title = shelf.find(id).map(|b| b.title().to_string());
        match shelf.delete(id).map_err(Self::to_mcp_error)? {
            Mutation::Applied => Ok(format!(
                "Deleted: `{id}` {}\n\n{}",
                title.unwrap_or_default(),
                shelf.renderer().last_frame()
            )),
            Mutation::NotFound => Ok(format!("Book `{id}` not found; nothing changed.")),
        }
    }

    fn search_text(&self, query: &str) -> Result<String, McpError> {
        let mut shelf = self.lock()?;
        let found = shelf.search(query);
        if found.is_empty() {
            return Ok(format!("No books with a title matching \"{query}\"."));
        }
        Ok(shelf.renderer().last_frame().to_string())
    }

    fn show_text(&self, id: BookId) -> Result<String, McpError> {
        let shelf = self.lock()?;
        match shelf.find(id) {
            Some(book) => serde_json::to_string_pretty(book).map_err(|e| {
                McpError::internal_error(format!("Failed to encode book: {e}"), None)
            }),
            None => Err(McpError::invalid_params(
                format!("Book `{id}` not found. Run `shelf` to see available IDs."),
                None,
            )),
        }
    }
}

// =============================================================================
// ServerHandler impl
// =============================================================================

impl ServerHandler for BookshelfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "bookshelf-mcp".to_string(),
                title: Some("Bookshelf MCP — Reading List".to_string()),
                description: Some(
                    "Bookshelf split into finished / not finished. \
                     Every change is saved immediately."
                        .to_string(),
                ),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Manage a personal bookshelf.\n\
                 \n\
                 Tools: `shelf` to view, `book_submit` to add a book, \
                 `book_edit` → `book_submit` to change one, `book_toggle` to move it between \
                 finished and not finished, `book_delete`, `book_search` by title, `book_show`. \
                 Book IDs are shown in backticks in every listing."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool_ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(tool_ctx).await
    }
}

// =============================================================================
// Request types
// =============================================================================

fn parse_book_id(s: &str) -> Result<BookId, McpError> {
    s.trim_matches('`')
        .parse()
        .map_err(|_| McpError::invalid_params(format!("Invalid book_id: '{s}'"), None))
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookFormRequest {
    #[schemars(description = "Book title (surrounding whitespace is trimmed)")]
    pub title: String,
    #[schemars(description = "Author name (surrounding whitespace is trimmed)")]
    pub author: String,
    #[schemars(description = "Publication year, e.g. '1965'. Leading integer is used.")]
    pub year: String,
    #[schemars(description = "Already finished reading (default: false)")]
    #[serde(default)]
    pub is_complete: bool,
}

impl From<McpBookFormRequest> for BookForm {
    fn from(req: McpBookFormRequest) -> Self {
        Self {
            title: req.title,
            author: req.author,
            year: req.year,
            is_complete: req.is_complete,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpBookIdRequest {
    #[schemars(description = "Book ID as shown in `shelf` output (e.g. '1718000000123')")]
    pub book_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpSearchRequest {
    #[schemars(
        description = "Case-insensitive title substring. Omit or leave empty to list every book."
    )]
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct McpEmptyRequest {}

// =============================================================================
// Tool implementations
// =============================================================================

#[tool_router]
impl BookshelfServer {
    #[tool(
        name = "shelf",
        description = "Show the bookshelf: not finished and finished books, each with its ID.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn shelf(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.shelf_text()?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "book_submit",
        description = "Submit the book form. Adds a new book, or updates the book opened with `book_edit`.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_submit(
        &self,
        Parameters(req): Parameters<McpBookFormRequest>,
    ) -> Result<CallToolResult, McpError> {
        let form = BookForm::from(req);
        let text = self.submit_text(&form)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "book_edit",
        description = "Start editing a book. Returns its current fields; the next `book_submit` updates it.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_edit(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(&req.book_id)?;
        let text = self.edit_text(id)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "book_cancel_edit",
        description = "Leave edit mode without changing anything.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_cancel_edit(
        &self,
        #[allow(unused_variables)] Parameters(_req): Parameters<McpEmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.cancel_edit_text()?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "book_toggle",
        description = "Move a book between 'not finished' and 'finished'.",
        annotations(
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_toggle(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(&req.book_id)?;
        let text = self.toggle_text(id)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "book_delete",
        description = "Delete a book from the shelf.",
        annotations(
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn book_delete(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(&req.book_id)?;
        let text = self.delete_text(id)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "book_search",
        description = "Search books by title (case-insensitive substring). The shelf itself is not modified.",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_search(
        &self,
        Parameters(req): Parameters<McpSearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.search_text(req.query.as_deref().unwrap_or(""))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "book_show",
        description = "Show one book as stored (JSON).",
        annotations(
            read_only_hint = true,
            destructive_hint = false,
            open_world_hint = false
        )
    )]
    async fn book_show(
        &self,
        Parameters(req): Parameters<McpBookIdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let id = parse_book_id(&req.book_id)?;
        let text = self.show_text(id)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

// =============================================================================
// Tests
// =============================================================================
