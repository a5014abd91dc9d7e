use std::path::PathBuf;

use crate::error::Result;
use bookshelf_app::state::AppConfig;
pub use clap::Parser;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "REST service for managing a book collection")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 8000,
        env = "BOOKSHELF_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "BOOKSHELF_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "BOOKSHELF_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/bookshelf.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "BOOKSHELF_DATA_DIR",
        help = "Data directory for the default database, default is system default like ~/.local/share/bookshelf",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "BOOKSHELF_DEFAULT_PAGE_SIZE",
        default_value = "100",
        help = "Number of books listed when no limit is given"
    )]
    pub default_page_size: u32,

    #[arg(
        long,
        env = "BOOKSHELF_DEFAULT_SEARCH_SIZE",
        default_value = "50",
        help = "Number of search results when no limit is given"
    )]
    pub default_search_size: u32,

    #[arg(
        long,
        env = "BOOKSHELF_MAX_PAGE_SIZE",
        default_value = "1000",
        help = "Upper bound for limit, larger values are clamped"
    )]
    pub max_page_size: u32,

    #[arg(
        long,
        env = "BOOKSHELF_CORS_ORIGIN",
        default_value = "http://localhost:3000",
        help = "The single client origin allowed by CORS"
    )]
    pub cors_origin: String,

    #[arg(long, env = "BOOKSHELF_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("bookshelf"))
        .unwrap_or_else(|| PathBuf::from("bookshelf"))
        .to_string_lossy()
        .to_string()
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// True when the database lives in the data directory, which then has to exist.
    pub fn uses_default_database(&self) -> bool {
        self.database_url.is_none()
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/bookshelf.db", self.data_dir))
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            default_page_size: config.default_page_size,
            default_search_size: config.default_search_size,
            max_page_size: config.max_page_size,
        }
    }
}
