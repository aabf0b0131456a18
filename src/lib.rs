//! Music discovery server library
//!
//! LLM generated song recommendations enriched with metadata from public
//! music catalogs, plus trending content and the static mood/genre tables.

pub mod config;
pub mod llm;
pub mod moods;
pub mod providers;
pub mod recommendations;
pub mod server;
pub mod trending;

pub use config::{AppConfig, CliConfig, FileConfig};
pub use recommendations::{RecommendationService, RecommendationsResponse, SearchCriteria};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig, Services};
pub use trending::{TrendingResponse, TrendingService};
