//! Bootstrap of the Naver Maps SDK script.
//!
//! The SDK is loaded at most once per page. The key id parameter is tried
//! first; when the SDK reports an authentication failure the load is retried
//! once with the legacy client id parameter.

use std::{cell::RefCell, rc::Rc};

use futures_util::{
    FutureExt,
    future::{LocalBoxFuture, Shared},
};
use thiserror::Error;

const SDK_URL: &str = "https://oapi.map.naver.com/openapi/v3/maps.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapLoadError {
    #[error("no map client id configured")]
    MissingCredential,
    #[error("map SDK rejected the client id")]
    AuthFailure,
    #[error("map SDK script could not be loaded")]
    LoadFailure,
}

impl MapLoadError {
    /// Text rendered in place of the map.
    pub fn explanation(self) -> &'static str {
        match self {
            MapLoadError::MissingCredential => {
                "No map key configured. Set NAVER_MAP_CLIENT_ID when building the client."
            }
            MapLoadError::AuthFailure => {
                "Map authentication failed. Check that Dynamic Map is enabled for the \
                 application and that this site's URL is registered as a web service URL."
            }
            MapLoadError::LoadFailure => {
                "The map script could not be loaded. Check your connection and try again later."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialParam {
    KeyId,
    ClientId,
}

impl CredentialParam {
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialParam::KeyId => "ncpKeyId",
            CredentialParam::ClientId => "ncpClientId",
        }
    }

    /// Global the SDK calls once it is ready.
    pub fn callback_name(self) -> String {
        format!("naverMapInit_{}", self.as_str())
    }
}

pub fn script_url(param: CredentialParam, client_id: &str) -> String {
    format!(
        "{SDK_URL}?{}={}&callback={}",
        param.as_str(),
        urlencoding::encode(client_id),
        param.callback_name()
    )
}

/// How a single script injection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptEvent {
    Ready,
    /// The SDK's global authentication failure hook fired.
    AuthFailure,
    /// The script element itself failed to load.
    LoadFailure,
}

/// Page capable of injecting the SDK script.
pub trait ScriptHost {
    /// The SDK is already present, e.g. loaded by another part of the page.
    fn sdk_present(&self) -> bool;

    fn inject(&self, url: String, callback: String) -> LocalBoxFuture<'_, ScriptEvent>;
}

type Attempt = Shared<LocalBoxFuture<'static, Result<(), MapLoadError>>>;

enum LoadState {
    Idle,
    Loading(Attempt),
    Ready,
}

/// Memoized SDK loader. Clones share the same state.
pub struct ScriptLoader<H> {
    host: Rc<H>,
    client_id: Option<String>,
    state: Rc<RefCell<LoadState>>,
}

impl<H> Clone for ScriptLoader<H> {
    fn clone(&self) -> Self {
        Self {
            host: Rc::clone(&self.host),
            client_id: self.client_id.clone(),
            state: Rc::clone(&self.state),
        }
    }
}

impl<H: ScriptHost + 'static> ScriptLoader<H> {
    pub fn new(host: H, client_id: Option<String>) -> Self {
        Self {
            host: Rc::new(host),
            client_id,
            state: Rc::new(RefCell::new(LoadState::Idle)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Ready)
    }

    /// Resolves once the SDK is usable. Callers arriving while a load is in
    /// flight wait on that same load. A failed load is forgotten so a later
    /// call can start over.
    pub async fn load(&self) -> Result<(), MapLoadError> {
        let Some(client_id) = self.client_id.clone() else {
            return Err(MapLoadError::MissingCredential);
        };

        let attempt = {
            let mut guard = self.state.borrow_mut();
            let state: &mut LoadState = &mut guard;
            match *state {
                LoadState::Ready => return Ok(()),
                LoadState::Loading(ref inflight) => inflight.clone(),
                LoadState::Idle if self.host.sdk_present() => {
                    *state = LoadState::Ready;
                    return Ok(());
                }
                LoadState::Idle => {
                    let host = Rc::clone(&self.host);
                    let attempt = async move { bootstrap(&*host, &client_id).await }
                        .boxed_local()
                        .shared();
                    *state = LoadState::Loading(attempt.clone());
                    attempt
                }
            }
        };

        let result = attempt.clone().await;
        let mut state = self.state.borrow_mut();
        // Only the attempt this caller awaited may settle the state; a newer
        // load may already be in flight.
        let settles = matches!(
            &*state,
            LoadState::Loading(inflight) if Shared::ptr_eq(inflight, &attempt)
        );
        if settles {
            *state = if result.is_ok() {
                LoadState::Ready
            } else {
                LoadState::Idle
            };
        }
        result
    }
}

async fn bootstrap<H: ScriptHost + ?Sized>(host: &H, client_id: &str) -> Result<(), MapLoadError> {
    match inject(host, CredentialParam::KeyId, client_id).await {
        ScriptEvent::Ready => Ok(()),
        ScriptEvent::LoadFailure => Err(MapLoadError::LoadFailure),
        ScriptEvent::AuthFailure => {
            tracing::warn!("map SDK rejected ncpKeyId, retrying with ncpClientId");
            match inject(host, CredentialParam::ClientId, client_id).await {
                ScriptEvent::Ready => Ok(()),
                ScriptEvent::AuthFailure => Err(MapLoadError::AuthFailure),
                ScriptEvent::LoadFailure => Err(MapLoadError::LoadFailure),
            }
        }
    }
}

async fn inject<H: ScriptHost + ?Sized>(
    host: &H,
    param: CredentialParam,
    client_id: &str,
) -> ScriptEvent {
    let event = host
        .inject(script_url(param, client_id), param.callback_name())
        .await;
    tracing::debug!(param = param.as_str(), ?event, "map SDK script attempt finished");
    event
}
