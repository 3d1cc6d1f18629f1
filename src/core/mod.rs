pub mod config;
pub mod constants;
pub mod constrain;
pub mod geo;
pub mod projection;
pub mod pyramid;
pub mod viewer;
