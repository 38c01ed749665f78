//! Startup banner.

use crate::consts::{AUTHOR, HOMEPAGE, REPO};

/// Server configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub listen: &'a str,
    pub upstream: &'a str,
    pub wait_for_finish_secs: u64,
    pub poll_interval_secs: u64,
    pub max_polls: u32,
}

/// Render the startup banner.
pub fn render_banner(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║          A P I F Y   R E L A Y        ║
   ║    actors, forwarded on your behalf   ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   listen    {}
   upstream  {}
   runs      wait {}s, then poll every {}s (max {})
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.listen,
        info.upstream,
        info.wait_for_finish_secs,
        info.poll_interval_secs,
        info.max_polls,
    )
}

pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}
