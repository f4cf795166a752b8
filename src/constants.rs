// UI Constants
pub const USER_LABEL: &str = "You";
pub const RECIPIENT_LABEL: &str = "Response";
pub const INPUT_PLACEHOLDER: &str = "Pozdrav";
pub const USER_INDENT: &str = "    ";
pub const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

// Event loop
pub const TICK_RATE_MS: u64 = 250;
pub const INPUT_POLL_MS: u64 = 100;

// API Constants
pub const PROMPT_PATH: &str = "prompt";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

// Environment
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";
pub const LEGACY_BACKEND_URL_ENV: &str = "VITE_BACKEND_URL";
pub const LOG_LEVEL_ENV: &str = "PARLEY_LOG_LEVEL";
pub const CONFIG_PATH_ENV: &str = "PARLEY_CONFIG";
