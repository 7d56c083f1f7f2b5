//! Auth session state and context for the frontend. The provider hydrates the
//! session once on mount using cookie-based API calls and exposes derived auth
//! signals for routes. Only non-sensitive profile data is stored in memory;
//! the session token stays in an `HttpOnly` cookie.

use crate::features::auth::{client, types::SessionUser};
use leptos::{prelude::*, task::spawn_local};

#[derive(Clone, Copy)]
/// Auth session context shared through Leptos.
pub struct AuthContext {
    pub session: RwSignal<Option<SessionUser>>,
    pub is_authenticated: Signal<bool>,
    pub is_staff: Signal<bool>,
}

impl AuthContext {
    fn new(session: RwSignal<Option<SessionUser>>) -> Self {
        let is_authenticated = Signal::derive(move || session.get().is_some());
        let is_staff = Signal::derive(move || {
            session.get().map(|user| user.is_staff()).unwrap_or(false)
        });
        Self {
            session,
            is_authenticated,
            is_staff,
        }
    }

    /// Updates the in-memory session after login or a profile change.
    pub fn set_session(&self, session: SessionUser) {
        self.session.set(Some(session));
    }

    /// Clears the in-memory session, typically on logout.
    pub fn clear_session(&self) {
        self.session.set(None);
    }
}

/// Provides auth context and hydrates the session once on mount.
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let session = RwSignal::new(None);
    let auth = AuthContext::new(session);
    provide_context(auth);

    spawn_local(async move {
        if let Ok(Some(session)) = client::fetch_session().await {
            auth.set_session(session);
        }
    });

    view! { {children()} }
}

/// Returns the current auth context or a fallback empty context.
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().unwrap_or_else(|| {
        let session = RwSignal::new(None);
        AuthContext::new(session)
    })
}
