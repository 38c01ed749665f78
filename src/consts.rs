//! Project-wide constants.

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Header carrying the caller's Apify API token.
pub const TOKEN_HEADER: &str = "x-apify-token";

/// Upstream Apify REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.apify.com/v2";

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Page size for the actor listing. The relay never paginates further.
pub const ACTOR_PAGE_LIMIT: u32 = 100;

/// Seconds the upstream is asked to hold the submit call open.
pub const DEFAULT_WAIT_FOR_FINISH_SECS: u64 = 300;

/// Delay between run status polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Status polls attempted after the synchronous wait expires.
pub const DEFAULT_MAX_POLLS: u32 = 60;

/// Dataset rows returned alongside a succeeded run.
pub const DATASET_PREVIEW_LIMIT: u32 = 10;

/// Value of the `status` field on `/health`.
pub const HEALTH_OK: &str = "OK";
