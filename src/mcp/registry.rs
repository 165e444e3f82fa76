//! Name-to-handler tables backing tool and resource dispatch.

use std::{collections::HashMap, future::Future, pin::Pin};

use rmcp::ErrorData as McpError;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ReadResourceRequestParam, ReadResourceResult, Resource,
    Tool,
};

use super::server::CareerLensMcpServer;

pub type ResourceFuture =
    Pin<Box<dyn Future<Output = Result<ReadResourceResult, McpError>> + Send>>;
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<CallToolResult, McpError>> + Send>>;

pub type ResourceHandler = fn(&CareerLensMcpServer, ReadResourceRequestParam) -> ResourceFuture;
pub type ToolHandler = fn(&CareerLensMcpServer, CallToolRequestParam) -> ToolFuture;

/// Tools and resources in registration order, each paired with its handler.
#[derive(Default)]
pub struct Registry {
    tools: Vec<Tool>,
    resources: Vec<Resource>,
    tool_handlers: HashMap<String, ToolHandler>,
    resource_handlers: HashMap<String, ResourceHandler>,
}

impl Registry {
    pub fn register_tool(&mut self, tool: Tool, handler: ToolHandler) {
        self.tool_handlers.insert(tool.name.to_string(), handler);
        self.tools.push(tool);
    }

    pub fn register_resource(&mut self, resource: Resource, handler: ResourceHandler) {
        self.resource_handlers.insert(resource.raw.uri.clone(), handler);
        self.resources.push(resource);
    }

    pub fn tool(&self, name: &str) -> Option<ToolHandler> {
        self.tool_handlers.get(name).copied()
    }

    pub fn resource(&self, uri: &str) -> Option<ResourceHandler> {
        self.resource_handlers.get(uri).copied()
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    pub fn resources(&self) -> Vec<Resource> {
        self.resources.clone()
    }
}
