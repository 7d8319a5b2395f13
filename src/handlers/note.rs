use actix_web::{cookie::Cookie, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::{
    errors::ServerError,
    models::note::Role,
    store::{session::PendingSession, Backend, NoteStore, SessionStores},
    utils, AppState,
};

pub mod mutate;
pub mod query;

pub const SESSION_COOKIE: &str = "NOTESESSID";

/// The store a request works on. Requests without a live session work on a
/// pending one, which is kept (and its cookie sent) only if it ends up holding
/// notes.
pub struct ScopedStore {
    pub store: Arc<dyn NoteStore>,
    pending: Option<(Arc<SessionStores>, PendingSession)>,
}

impl ScopedStore {
    pub fn resolve(state: &AppState, req: &HttpRequest) -> Self {
        match &state.backend {
            Backend::Shared(store) => ScopedStore {
                store: store.clone(),
                pending: None,
            },
            Backend::Session(sessions) => {
                let known = req
                    .cookie(SESSION_COOKIE)
                    .and_then(|cookie| sessions.lookup(cookie.value()));
                match known {
                    Some(store) => ScopedStore {
                        store,
                        pending: None,
                    },
                    None => {
                        let pending = sessions.pending();
                        ScopedStore {
                            store: pending.store.clone(),
                            pending: Some((sessions.clone(), pending)),
                        }
                    }
                }
            }
        }
    }

    pub fn finish(self, mut res: HttpResponse) -> HttpResponse {
        if let Some((sessions, pending)) = self.pending {
            let session_id = pending.id.clone();
            if sessions.register(pending) {
                let cookie = Cookie::build(SESSION_COOKIE, session_id)
                    .path("/")
                    .http_only(true)
                    .finish();
                if let Err(e) = res.add_cookie(&cookie) {
                    log::error!("{e}");
                }
            }
        }
        res
    }
}

pub fn role(state: &AppState, req: &HttpRequest) -> Role {
    utils::get_role(req, state.credentials.as_ref())
}

/// Absolute url of `GET /notes/{id}`.
pub fn note_location(req: &HttpRequest, id: u64) -> Result<String, ServerError> {
    Ok(req.url_for("get_note", [id.to_string()])?.to_string())
}
