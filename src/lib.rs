//! # superstore-dash
//!
//! Loads a retail transactions table ("Superstore") and answers the
//! questions behind a sales dashboard:
//!
//! - **data**: typed records, loading (CSV / JSON / Parquet), filtering
//!   and aggregation as pure functions over an immutable [`data::model::Dataset`]
//! - **dashboard**: per-widget results for one filter state
//! - **report**: plain-text metric tables and narrative insights
//! - **ui** / **app**: the egui front end
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use superstore_dash::data::{aggregate, filter, loader, model::GroupKey};
//!
//! let dataset = loader::load_file(Path::new("Superstore.csv"))?;
//! let west = filter::apply(&dataset, &filter::FilterSpec::default().region("West"));
//! let by_category = aggregate::group_by(&west, GroupKey::Category);
//! println!("{:?} across {} categories", aggregate::metrics(&west), by_category.len());
//! # Ok::<(), superstore_dash::data::error::DataError>(())
//! ```

pub mod app;
pub mod color;
pub mod dashboard;
pub mod data;
pub mod fmt;
pub mod report;
pub mod state;
pub mod ui;
