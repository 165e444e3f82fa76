//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use crate::{
    config::get_config,
    mcp::{
        format::{health_payload, json_resource_contents, search_modes_payload},
        handlers::{
            interview::{handle_answer_interview, handle_start_interview},
            matches::{handle_list_matches, handle_match_jobs},
            reporting::{handle_tailor_resume, handle_usage},
            resume::handle_analyze_resume,
        },
        registry::{self, Registry},
        schemas,
    },
    service::CareerApi,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, JsonObject, ListResourcesResult,
        ListToolsResult, RawResource, ReadResourceRequestParam, ReadResourceResult,
        ServerCapabilities, ServerInfo, Tool, ToolAnnotations,
    },
};

const HEALTH_URI: &str = "mcp://health";
const SEARCH_MODES_URI: &str = "mcp://search-modes";

/// MCP server exposing CareerLens operations.
#[derive(Clone)]
pub struct CareerLensMcpServer {
    service: Arc<dyn CareerApi>,
    registry: Arc<Registry>,
}

impl CareerLensMcpServer {
    /// Create a new MCP server driving the supplied career service.
    pub fn new(service: Arc<dyn CareerApi>) -> Self {
        let mut registry = Registry::default();

        registry.register_resource(
            resource(
                HEALTH_URI,
                "health",
                "Embedding configuration plus database and Qdrant reachability",
            ),
            resource_health,
        );
        registry.register_resource(
            resource(
                SEARCH_MODES_URI,
                "search-modes",
                "Search depth presets with job counts and time estimates",
            ),
            resource_search_modes,
        );

        registry.register_tool(
            tool(
                "analyze-resume",
                "Analyze Resume",
                "Parse a resume (pasted text or a file path), detect role, seniority, and skills, and store the profile. Returns the job_seeker_id used by every other tool.",
                schemas::analyze_resume_input_schema(),
                ToolAnnotations::with_title("Analyze Resume")
                    .destructive(false)
                    .idempotent(true)
                    .open_world(true),
            ),
            tool_analyze_resume,
        );
        registry.register_tool(
            tool(
                "match-jobs",
                "Match Jobs",
                "Search the job board for a profile, index the postings, and rank them by semantic similarity and skill overlap.",
                schemas::match_jobs_input_schema(),
                ToolAnnotations::with_title("Match Jobs")
                    .destructive(false)
                    .idempotent(false)
                    .open_world(true),
            ),
            tool_match_jobs,
        );
        registry.register_tool(
            tool(
                "list-matches",
                "List Matches",
                "Return stored matches for a profile, best first, without calling the job board.",
                schemas::list_matches_input_schema(),
                ToolAnnotations::with_title("List Matches")
                    .read_only(true)
                    .idempotent(true)
                    .open_world(false),
            ),
            tool_list_matches,
        );
        registry.register_tool(
            tool(
                "start-interview",
                "Start Mock Interview",
                "Start a mock interview for a matched job or a recruiter posting and get the first question.",
                schemas::start_interview_input_schema(),
                ToolAnnotations::with_title("Start Mock Interview")
                    .destructive(false)
                    .idempotent(false)
                    .open_world(true),
            ),
            tool_start_interview,
        );
        registry.register_tool(
            tool(
                "answer-interview",
                "Answer Interview Question",
                "Answer the current question; returns a 0-10 evaluation and the next question, or the final summary.",
                schemas::answer_interview_input_schema(),
                ToolAnnotations::with_title("Answer Interview Question")
                    .destructive(false)
                    .idempotent(false)
                    .open_world(true),
            ),
            tool_answer_interview,
        );
        registry.register_tool(
            tool(
                "tailor-resume",
                "Tailor Resume",
                "Rewrite a profile's resume for one of its matched jobs without inventing experience.",
                schemas::tailor_resume_input_schema(),
                ToolAnnotations::with_title("Tailor Resume")
                    .destructive(false)
                    .idempotent(false)
                    .open_world(true),
            ),
            tool_tailor_resume,
        );
        registry.register_tool(
            tool(
                "usage",
                "Usage Snapshot",
                "Token usage, estimated spend, and platform counters.",
                schemas::empty_object_schema(),
                ToolAnnotations::with_title("Usage Snapshot")
                    .read_only(true)
                    .idempotent(true)
                    .open_world(false),
            ),
            tool_usage,
        );

        Self {
            service,
            registry: Arc::new(registry),
        }
    }
}

fn tool(
    name: &'static str,
    title: &str,
    description: &'static str,
    schema: JsonObject,
    annotations: ToolAnnotations,
) -> Tool {
    Tool {
        name: Cow::Borrowed(name),
        title: Some(title.to_string()),
        description: Some(Cow::Borrowed(description)),
        input_schema: Arc::new(schema),
        output_schema: None,
        annotations: Some(annotations),
        icons: None,
    }
}

fn resource(uri: &str, name: &str, description: &str) -> rmcp::model::Resource {
    let mut raw = RawResource::new(uri, name);
    raw.description = Some(description.into());
    raw.mime_type = Some(super::format::APPLICATION_JSON.into());
    raw.no_annotation()
}

fn resource_health(
    server: &CareerLensMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    let service = server.service.clone();
    Box::pin(async move {
        let config = get_config();
        let snapshot = service.health().await;
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(
                HEALTH_URI,
                health_payload(
                    config.embedding_provider,
                    &config.embedding_model,
                    config.embedding_dimension,
                    &config.qdrant_url,
                    &config.qdrant_collection_name,
                    &snapshot,
                ),
            )],
        })
    })
}

fn resource_search_modes(
    _server: &CareerLensMcpServer,
    _request: ReadResourceRequestParam,
) -> registry::ResourceFuture {
    Box::pin(async move {
        Ok(ReadResourceResult {
            contents: vec![json_resource_contents(
                SEARCH_MODES_URI,
                search_modes_payload(SEARCH_MODES_URI),
            )],
        })
    })
}

fn tool_analyze_resume(
    server: &CareerLensMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_analyze_resume(&service, request.arguments).await })
}

fn tool_match_jobs(
    server: &CareerLensMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_match_jobs(&service, request.arguments).await })
}

fn tool_list_matches(
    server: &CareerLensMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_list_matches(&service, request.arguments).await })
}

fn tool_start_interview(
    server: &CareerLensMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_start_interview(&service, request.arguments).await })
}

fn tool_answer_interview(
    server: &CareerLensMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_answer_interview(&service, request.arguments).await })
}

fn tool_tailor_resume(
    server: &CareerLensMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_tailor_resume(&service, request.arguments).await })
}

fn tool_usage(
    server: &CareerLensMcpServer,
    _request: CallToolRequestParam,
) -> registry::ToolFuture {
    let service = server.service.clone();
    Box::pin(async move { handle_usage(&service).await })
}

impl ServerHandler for CareerLensMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "careerlens".to_string();
        implementation.title = Some("CareerLens MCP".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: implementation,
            instructions: Some(
                "Use this server to help a job seeker: analyze-resume first to obtain a job_seeker_id, then match-jobs or list-matches, then start-interview/answer-interview or tailor-resume for a chosen job_id.".into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_resources(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = self.registry.resources();
        std::future::ready(Ok(ListResourcesResult::with_all_items(resources)))
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.registry.tools();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            match self.registry.resource(request.uri.as_str()) {
                Some(handler) => handler(self, request).await,
                None => Err(McpError::invalid_params(
                    format!("Unknown resource URI: {}", request.uri),
                    None,
                )),
            }
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match self.registry.tool(request.name.as_ref()) {
                Some(handler) => {
                    tracing::debug!(tool = %request.name, "Dispatching MCP tool");
                    handler(self, request).await
                }
                None => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", request.name),
                    None,
                )),
            }
        }
    }
}
