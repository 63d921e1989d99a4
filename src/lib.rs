pub mod catalog;
pub mod config;
pub mod matching;
pub mod models;
pub mod red_flags;
pub mod text;

pub use catalog::{CatalogError, ComplaintCatalog, SearchHit};
pub use matching::{
    composite_match, find_best_match_index, fuzzy_match, is_quality_match, prefix_match,
    MatchError, MatchWeights,
};
pub use models::{DetectionResult, RedFlagAlert, RedFlagRule, Severity, SeverityGroups};
pub use red_flags::{
    detect_red_flags, format_alerts_for_display, group_alerts_by_severity, KnowledgeError,
    RedFlagKnowledgeBase,
};

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. Safe to call more than once.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} core v{}", config::APP_NAME, config::APP_VERSION);
    }
}
