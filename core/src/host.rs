use alloc::boxed::Box;
use alloc::string::String;
use trapgrid_protocol::{GuestMessage, HostMessage, TargetOrigin};

use crate::*;

/// Outbound side of the cross-context message channel, e.g. `window.parent.postMessage`.
pub trait HostChannel {
    fn post(&mut self, message: &GuestMessage, target: &TargetOrigin);
}

impl<F: FnMut(&GuestMessage, &TargetOrigin)> HostChannel for F {
    fn post(&mut self, message: &GuestMessage, target: &TargetOrigin) {
        self(message, target)
    }
}

/// What the host asked to do with the sanity pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SanityUpdate {
    /// Start the pool over at this value.
    Seed(CellCount),
    /// Replace what is left of the pool.
    Set(CellCount),
}

/// Handshake with an embedding page that owns the sanity pool.
pub struct HostLink {
    config: HostConfig,
    channel: Box<dyn HostChannel>,
    pinned_origin: Option<String>,
    initialized: bool,
    completed: bool,
}

fn clamp_sanity(sanity: u32) -> CellCount {
    sanity.try_into().unwrap_or(CellCount::MAX)
}

impl HostLink {
    pub fn new(config: HostConfig, channel: Box<dyn HostChannel>) -> Self {
        Self {
            config,
            channel,
            pinned_origin: None,
            initialized: false,
            completed: false,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn pinned_origin(&self) -> Option<&str> {
        self.pinned_origin.as_deref()
    }

    /// Starts the handshake. When embedded this announces readiness and waits for `INIT`,
    /// otherwise the game initializes itself with the default sanity.
    pub fn open(&mut self) -> Option<SanityUpdate> {
        if self.config.embedded {
            let ready = GuestMessage::ready(self.config.minigame_type.clone());
            self.channel.post(&ready, &TargetOrigin::Any);
            log::debug!("Sent READY, waiting for INIT");
            None
        } else {
            self.initialized = true;
            Some(SanityUpdate::Seed(self.config.default_sanity))
        }
    }

    /// Falls back to the default sanity when no `INIT` arrived in time.
    pub fn init_timed_out(&mut self) -> Option<SanityUpdate> {
        if self.initialized {
            return None;
        }
        log::info!(
            "No INIT received, using default sanity {}",
            self.config.default_sanity
        );
        self.initialized = true;
        Some(SanityUpdate::Seed(self.config.default_sanity))
    }

    /// Handles a raw message from `origin`; anything unknown or malformed is ignored.
    pub fn receive(&mut self, origin: &str, raw: &str) -> Option<SanityUpdate> {
        let message = match HostMessage::decode(raw) {
            Ok(Some(message)) => message,
            Ok(None) => {
                log::debug!("Ignoring unknown host message from {}", origin);
                return None;
            }
            Err(err) => {
                log::warn!("Ignoring host message from {}: {}", origin, err);
                return None;
            }
        };

        match message {
            HostMessage::Init(payload) => {
                match &self.pinned_origin {
                    Some(pinned) if pinned != origin => {
                        log::warn!("Ignoring INIT from {}, pinned to {}", origin, pinned);
                        return None;
                    }
                    Some(_) => {}
                    None => self.pinned_origin = Some(origin.into()),
                }
                self.initialized = true;
                let sanity = payload
                    .sanity
                    .filter(|&sanity| sanity > 0)
                    .map_or(self.config.default_sanity, clamp_sanity);
                log::debug!("INIT from {} with sanity {}", origin, sanity);
                Some(SanityUpdate::Seed(sanity))
            }
            HostMessage::UpdateSanity(payload) => {
                if self.config.enforce_origin_pin && self.pinned_origin.as_deref() != Some(origin) {
                    log::warn!("Ignoring UPDATE_SANITY from unpinned origin {}", origin);
                    return None;
                }
                Some(SanityUpdate::Set(clamp_sanity(payload.sanity)))
            }
        }
    }

    fn post_to_pinned(&mut self, message: GuestMessage) {
        if let Some(origin) = &self.pinned_origin {
            self.channel.post(&message, &TargetOrigin::Exact(origin.clone()));
        }
    }

    /// Reports a change of the pool to the host.
    pub fn budget_spent(&mut self, delta: i32) {
        self.post_to_pinned(GuestMessage::sanity_change(delta));
    }

    /// Forgets that the previous game was reported, so the next one can be.
    pub fn new_session(&mut self) {
        self.completed = false;
    }

    /// Tells the host how the game ended, at most once per game.
    pub fn complete(&mut self, success: bool, final_answer: Option<String>) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.post_to_pinned(GuestMessage::game_complete(success, final_answer));
    }
}
