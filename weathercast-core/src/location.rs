//! Device location: authorization state and one-shot fixes.
//!
//! `LocationProvider` owns the authorization state machine
//! (`NotDetermined -> Authorized | Denied | Restricted`) and allows a single
//! outstanding request at a time. A second request while one is pending is
//! rejected with [`WeatherError::AlreadyInProgress`].
//!
//! When permission is denied or restricted the provider answers with
//! [`FALLBACK_COORDINATE`] and broadcasts [`LocationNotice::PermissionDenied`].
//! A failed fix while authorized is reported as
//! [`WeatherError::LocationUnavailable`]; substituting a coordinate for that
//! case is left to the caller.

use async_trait::async_trait;
use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::{broadcast, watch};

use crate::{Coordinate, FALLBACK_COORDINATE, WeatherError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

/// Informational events for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationNotice {
    /// Location access was refused; the fallback coordinate was used.
    PermissionDenied,
}

/// Platform location services.
#[async_trait]
pub trait DeviceLocation: Send + Sync + Debug {
    /// Current authorization as reported by the platform.
    fn authorization(&self) -> Authorization;

    /// Prompt the user and wait for their decision.
    async fn request_authorization(&self) -> Authorization;

    /// Request exactly one location fix.
    async fn request_fix(&self) -> Result<Coordinate, WeatherError>;
}

#[derive(Debug)]
pub struct LocationProvider {
    device: Arc<dyn DeviceLocation>,
    authorization: watch::Sender<Authorization>,
    notices: broadcast::Sender<LocationNotice>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the request finishes or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LocationProvider {
    pub fn new(device: Arc<dyn DeviceLocation>) -> Self {
        let (authorization, _) = watch::channel(device.authorization());
        let (notices, _) = broadcast::channel(16);

        Self { device, authorization, notices, in_flight: AtomicBool::new(false) }
    }

    pub fn authorization(&self) -> Authorization {
        *self.authorization.borrow()
    }

    /// Watch authorization transitions.
    pub fn subscribe_authorization(&self) -> watch::Receiver<Authorization> {
        self.authorization.subscribe()
    }

    /// Side channel carrying [`LocationNotice`]s.
    pub fn notices(&self) -> broadcast::Receiver<LocationNotice> {
        self.notices.subscribe()
    }

    /// Record an authorization change made outside a request (e.g. in system settings).
    pub fn authorization_changed(&self, status: Authorization) {
        self.authorization.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            tracing::info!(from = ?current, to = ?status, "location authorization changed");
            *current = status;
            true
        });
    }

    pub async fn request_one_shot_location(&self) -> Result<Coordinate, WeatherError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WeatherError::AlreadyInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        let mut status = self.authorization();
        if status == Authorization::NotDetermined {
            status = self.device.request_authorization().await;
            self.authorization_changed(status);
        }

        match status {
            Authorization::Authorized => {
                let coordinate = self.device.request_fix().await.map_err(|e| match e {
                    WeatherError::LocationUnavailable(_) => e,
                    other => WeatherError::LocationUnavailable(other.to_string()),
                })?;
                tracing::debug!(%coordinate, "received location fix");
                Ok(coordinate)
            }
            Authorization::Denied | Authorization::Restricted => {
                tracing::info!(?status, "location not permitted, using fallback coordinate");
                // No subscribers is fine; the notice is informational.
                let _ = self.notices.send(LocationNotice::PermissionDenied);
                Ok(FALLBACK_COORDINATE)
            }
            Authorization::NotDetermined => Err(WeatherError::LocationUnavailable(
                "authorization was not decided".to_string(),
            )),
        }
    }
}
