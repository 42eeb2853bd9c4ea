pub mod audit;
pub mod chooser;
pub mod explore;
pub mod loader;
pub mod reports;
pub mod seeds;

pub use audit::MapAuditor;
pub use chooser::PromptChooser;
pub use explore::{
    DEFAULT_POWERS, STARTER_LOADOUT, generate_maps, odds_table, power_report, walk_run,
};
pub use loader::DirectoryLoader;
pub use reports::Report;
pub use seeds::{SeedInfo, resolve_seed_inputs, split_csv};
