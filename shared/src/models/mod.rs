//! Domain models for the Sommelier analytics platform

mod analytics;
mod pricing;
mod restaurant;
mod sale;
mod upload;
mod wine;

pub use analytics::*;
pub use pricing::*;
pub use restaurant::*;
pub use sale::*;
pub use upload::*;
pub use wine::*;
