// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! The daemon event loop.
//!
//! One cooperative loop handles service presence transitions, change
//! batches and shutdown. Claims and the initial read run inline when the
//! service appears; nothing else is processed while they are pending.

use std::future::Future;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::backend::DisplayBackend;
use crate::config::Settings;
use crate::dispatcher::ChangeDispatcher;
use crate::error::{AutorotateError, Result, SensorError};
use crate::sensor::{Presence, SensorConnector};
use crate::session::SensorSession;

/// Sensor session plus dispatcher, driven by `run`.
pub struct Daemon {
    session: SensorSession,
    dispatcher: ChangeDispatcher,
    apply_on_claim: bool,
}

impl Daemon {
    pub fn new(session: SensorSession, dispatcher: ChangeDispatcher) -> Self {
        Self {
            session,
            dispatcher,
            apply_on_claim: false,
        }
    }

    /// Build a daemon from settings.
    pub fn from_settings(
        connector: Arc<dyn SensorConnector>,
        backend: Arc<dyn DisplayBackend>,
        settings: &Settings,
    ) -> Self {
        let session = SensorSession::new(connector, &settings.sensor);
        let dispatcher = ChangeDispatcher::new(backend, &settings.display, &settings.backlight);
        Self::new(session, dispatcher).with_apply_on_claim(settings.display.apply_on_claim)
    }

    /// Apply current sensor values right after claiming.
    pub fn with_apply_on_claim(mut self, apply_on_claim: bool) -> Self {
        self.apply_on_claim = apply_on_claim;
        self
    }

    pub fn session(&self) -> &SensorSession {
        &self.session
    }

    /// Run until shutdown, a fatal claim failure, or the end of `presence`.
    ///
    /// A failed claim is logged and ends the loop like a shutdown.
    /// Pending change batches are handled before presence transitions, so
    /// everything the service sent before vanishing is applied.
    pub async fn run<P, F>(&mut self, mut presence: P, shutdown: F) -> Result<()>
    where
        P: Stream<Item = Presence> + Unpin,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutting down");
                    self.session.release().await;
                    return Ok(());
                }

                batch = self.session.next_batch() => {
                    let Some(batch) = batch else { continue };
                    let changes = self.session.apply(batch).await;
                    if !changes.is_empty() {
                        self.dispatcher.dispatch(&changes, self.session.snapshot()).await;
                    }
                }

                event = presence.next() => match event {
                    Some(Presence::Appeared) => {
                        let acquired = tokio::select! {
                            biased;
                            _ = &mut shutdown => Err(AutorotateError::from(SensorError::Cancelled)),
                            result = self.session.acquire() => result,
                        };

                        match acquired {
                            Ok(()) => {
                                if self.apply_on_claim {
                                    self.dispatcher.apply_snapshot(self.session.snapshot()).await;
                                }
                            }
                            Err(err) if err.is_cancelled() => {
                                debug!("Claim cancelled, shutting down");
                                self.session.release().await;
                                return Ok(());
                            }
                            Err(err) => {
                                warn!("{}", err);
                                self.session.release().await;
                                return Ok(());
                            }
                        }
                    }
                    Some(Presence::Vanished) => self.session.forget(),
                    None => {
                        info!("Stopped watching for iio-sensor-proxy");
                        self.session.release().await;
                        return Ok(());
                    }
                },
            }
        }
    }
}
