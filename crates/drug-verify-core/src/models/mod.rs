//! Domain models for the drug-verify system.

mod article;
mod history;
mod outcome;
mod record;
mod report;

pub use article::*;
pub use history::*;
pub use outcome::*;
pub use record::*;
pub use report::*;
