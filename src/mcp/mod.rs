mod params;
mod server;

pub use server::McpServer;
