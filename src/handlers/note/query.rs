use actix_web::{web, HttpRequest, HttpResponse};
use serde_derive::Deserialize;

use super::{role, ScopedStore};
use crate::{
    errors::ServerError,
    models::note::{NoteCollection, NoteForm, NoteView},
    store::NoteMap,
    AppState,
};

pub const DEFAULT_LIMIT: usize = 5;

#[derive(Deserialize)]
pub struct ListQuery {
    /// Last id seen on the previous page.
    pub offset: Option<u64>,
    pub limit: Option<usize>,
}

pub async fn list(
    req: HttpRequest,
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let scoped = ScopedStore::resolve(&state, &req);
    let ListQuery { offset, limit } = query.into_inner();
    let limit = limit.unwrap_or(DEFAULT_LIMIT);

    let notes = match offset {
        None => scoped.store.fetch(0, limit)?,
        Some(last_seen) => match last_seen.checked_add(1) {
            Some(start) => scoped.store.fetch(start, limit)?,
            None => NoteMap::new(),
        },
    };

    let collection = NoteCollection::shape(notes, offset, limit, role(&state, &req));
    Ok(scoped.finish(HttpResponse::Ok().json(collection)))
}

pub async fn get(
    req: HttpRequest,
    note_id: web::Path<u64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let scoped = ScopedStore::resolve(&state, &req);
    let note = scoped
        .store
        .get(note_id.into_inner())?
        .ok_or(ServerError::NotFound)?;

    let view = NoteView::shape(note, role(&state, &req));
    Ok(scoped.finish(HttpResponse::Ok().json(view)))
}

pub async fn new_form() -> HttpResponse {
    HttpResponse::Ok().json(NoteForm::describe())
}

pub async fn edit_form(
    req: HttpRequest,
    note_id: web::Path<u64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let scoped = ScopedStore::resolve(&state, &req);
    if scoped.store.get(note_id.into_inner())?.is_none() {
        return Err(ServerError::NotFound);
    }

    Ok(scoped.finish(HttpResponse::Ok().json(NoteForm::describe())))
}
