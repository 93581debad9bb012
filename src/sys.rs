pub mod headless;
pub mod host;
pub mod timer;
