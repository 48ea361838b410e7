//! Configuration: the reading-display record, the settings store that owns
//! the current record, engine settings, and the storage layout.

mod path;
mod record;
mod settings;
mod store;

pub use path::{
    AppPaths, BG_DIR_NAME, DEFAULT_ARCHIVE_NAME, FONT_DIR_NAME, STAGING_DIR_NAME, basename,
    expand_home, home_dir, reset_dir,
};
pub use record::{BG_TYPE_IMAGE, BgType, ConfigRecord, DisplayMode, is_valid_hex_color};
pub use settings::{EngineSettings, MissingAssetPolicy, default_settings_path};
pub use store::{ConfigEvent, ConfigStore, MIN_RECORD_COUNT};
