use actix_web::{http::header, web, HttpRequest, HttpResponse};

use super::{note_location, ScopedStore};
use crate::{
    errors::ServerError,
    models::note::{Note, NoteForm},
    AppState,
};

pub async fn new(
    req: HttpRequest,
    input: web::Json<NoteForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let message = input.into_inner().validate()?;
    let scoped = ScopedStore::resolve(&state, &req);

    let id = scoped.store.set(Note::new(message))?;
    let location = note_location(&req, id)?;

    Ok(scoped.finish(
        HttpResponse::Created()
            .insert_header((header::LOCATION, location))
            .finish(),
    ))
}

/// Updates the note at `id`, or creates it there when the id is free.
pub async fn put(
    req: HttpRequest,
    note_id: web::Path<u64>,
    input: web::Json<NoteForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let id = note_id.into_inner();
    let message = input.into_inner().validate()?;
    let scoped = ScopedStore::resolve(&state, &req);

    let mut res = if scoped.store.put_message(id, message)? {
        HttpResponse::Created()
    } else {
        HttpResponse::NoContent()
    };
    let location = note_location(&req, id)?;

    Ok(scoped.finish(res.insert_header((header::LOCATION, location)).finish()))
}

pub async fn del(
    req: HttpRequest,
    note_id: web::Path<u64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServerError> {
    let id = note_id.into_inner();
    let scoped = ScopedStore::resolve(&state, &req);

    // missing ids answer 204 as well, deletes are idempotent
    if !scoped.store.remove(id)? {
        log::debug!("note {} was already gone", id);
    }
    let location = req.url_for_static("get_notes")?.to_string();

    Ok(scoped.finish(
        HttpResponse::NoContent()
            .insert_header((header::LOCATION, location))
            .finish(),
    ))
}
