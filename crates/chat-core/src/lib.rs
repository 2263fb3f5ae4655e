mod config;
mod decorator;
mod deferred;
mod dispatcher;
mod document;
mod entities;
mod error;
mod host;
mod key_binding;
mod markdown;
mod mention;
mod modifier;
mod paste;
mod raw;
mod reset;
mod rich_utils;
mod selection;
mod state;

pub use crate::config::*;
pub use crate::decorator::*;
pub use crate::deferred::*;
pub use crate::dispatcher::*;
pub use crate::document::*;
pub use crate::entities::*;
pub use crate::error::*;
pub use crate::host::*;
pub use crate::key_binding::*;
pub use crate::markdown::*;
pub use crate::mention::*;
pub use crate::modifier::*;
pub use crate::paste::*;
pub use crate::raw::*;
pub use crate::reset::*;
pub use crate::rich_utils::*;
pub use crate::selection::*;
pub use crate::state::*;
