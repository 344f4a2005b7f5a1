//! Cumulocity REST resource implementations.
//!
//! Each resource consists of a model struct implementing
//! [`C8yResource`](crate::rest::C8yResource), its filter and a collection
//! accessor type alias:
//!
//! | Resource | Filter | Accessor | Path |
//! |---|---|---|---|
//! | [`Event`] | [`EventFilter`] | [`Events`] | `/event/events` |
//! | [`Alarm`] | [`AlarmFilter`] | [`Alarms`] | `/alarm/alarms` |
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use c8y_api::rest::Filter;
//! use c8y_api::rest::resources::{EventFilter, Events};
//!
//! let events = Events::new(Arc::clone(&client));
//!
//! let mut pager = events.select(EventFilter::new().source("12345").limit(100))?;
//! while let Some(event) = pager.try_next().await? {
//!     println!("{:?} {:?}", event.time, event.text);
//! }
//! ```

mod alarm;
mod common;
mod event;

pub use alarm::{Alarm, AlarmFilter, AlarmSeverity, AlarmStatus, Alarms};
pub use common::SourceRef;
pub use event::{Event, EventBinary, Events, BINARY_FRAGMENT};

pub use crate::rest::EventFilter;
