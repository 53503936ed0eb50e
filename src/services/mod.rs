pub mod extension_service;
pub mod grant_service;
pub mod scanner_service;
pub mod settings_service;
pub mod watch_service;
