// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "PQViewer";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "pqviewer";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".pqviewer";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "pqviewer.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PQVIEWER_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "PQVIEWER_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PQVIEWER_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PQVIEWER_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PQVIEWER_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Default log filter when neither PQVIEWER_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,pqviewer=info";

// =============================================================================
// Environment Variables - Query
// =============================================================================

/// Environment variable for default page size
pub const ENV_DEFAULT_PER_PAGE: &str = "PQVIEWER_DEFAULT_PER_PAGE";

/// Environment variable for maximum page size
pub const ENV_MAX_PER_PAGE: &str = "PQVIEWER_MAX_PER_PAGE";

// =============================================================================
// Query Defaults
// =============================================================================

/// Rows fetched for the in-browser table preview
pub const DEFAULT_PREVIEW_PER_PAGE: u64 = 10_000;

/// Rows fetched per page when exporting to CSV
pub const DEFAULT_CSV_EXPORT_PER_PAGE: u64 = 1_000_000;

/// Default maximum page size (one CSV export page)
pub const DEFAULT_MAX_PER_PAGE: u64 = DEFAULT_CSV_EXPORT_PER_PAGE;

/// Default maximum page number
pub const DEFAULT_MAX_PAGE: u64 = 1_000_000;

/// Default maximum number of filters per request
pub const DEFAULT_MAX_FILTERS: usize = crate::data::filters::DEFAULT_MAX_FILTERS;

/// Default maximum size of the filters JSON (64 KB)
pub const DEFAULT_MAX_FILTER_JSON_BYTES: usize =
    crate::data::filters::DEFAULT_MAX_FILTER_JSON_BYTES;

// =============================================================================
// Request Body Limits
// =============================================================================

/// Default body limit for API requests (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;
