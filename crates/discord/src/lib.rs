//! Discord event handling for the media pipeline.
//!
//! Inbound messages are matched for provider links; each match spawns an
//! independent pipeline task (resolve → download → deliver) with reaction
//! markers tracking progress on the originating message. A watched reaction
//! emoji replays the same chain on behalf of the reacting user.

pub mod bot;
pub mod config;
pub mod error;
pub mod outbound;

mod handler;
mod pipeline;
mod reactions;
mod state;
mod status;

pub use {
    bot::start,
    config::DiscordConfig,
    error::{Error, Result},
    outbound::DeliveryReport,
};
