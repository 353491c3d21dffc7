mod settings;
mod validation;

pub use settings::{
    ApplicationSettings, ExplorerSettings, ProviderSettings, Settings, StorageSettings,
};
pub use validation::validate_settings;
