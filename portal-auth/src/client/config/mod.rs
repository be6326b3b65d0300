mod settings;

pub use settings::{load_config, Service, ServiceUrls, Settings};
