// =============================================================================
// GENERATION SERVICE
// =============================================================================

/// Default base URL of the interaction-node service
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Header carrying the user id
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// Artificial latency of the offline generator, so pending nodes are visible
pub const DEFAULT_OFFLINE_DELAY_MS: u64 = 600;

pub const ENV_API_URL: &str = "BRANCHFLOW_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "BRANCHFLOW_TIMEOUT_SECS";
pub const ENV_USER_HEADER: &str = "BRANCHFLOW_USER_HEADER";
pub const ENV_OFFLINE: &str = "BRANCHFLOW_OFFLINE";

// =============================================================================
// LOGGING
// =============================================================================

/// Directory for logs and panic reports
pub const STORE_DIR: &str = "./.branchflow";

/// Log file name inside `STORE_DIR/logs`
pub const LOG_FILE: &str = "branchflow.log";

pub const ENV_LOG: &str = "BRANCHFLOW_LOG";

// =============================================================================
// GRAPH VIEW
// =============================================================================

/// Graph units per terminal column
pub const UNITS_PER_COL: f64 = 5.0;

/// Graph units per terminal row
pub const UNITS_PER_ROW: f64 = 20.0;

/// Width of a node box in columns
pub const NODE_WIDTH: u16 = 32;

/// Height of an exchange box in rows
pub const EXCHANGE_HEIGHT: u16 = 9;

/// Height of the placeholder box in rows
pub const PLACEHOLDER_HEIGHT: u16 = 5;

/// Pan step for arrow keys, in graph units
pub const PAN_STEP: f64 = 80.0;

// =============================================================================
// EVENT LOOP
// =============================================================================

/// Poll interval while requests are in flight, in milliseconds
pub const EVENT_POLL_MS: u64 = 16;

/// Poll interval when idle
pub const IDLE_POLL_MS: u64 = 50;

/// Minimum time between renders (~28fps)
pub const RENDER_THROTTLE_MS: u64 = 36;

/// Spinner advance interval in milliseconds
pub const SPINNER_MS: u64 = 120;
