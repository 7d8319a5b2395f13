use actix_web::web;

use crate::errors::ServerError;

pub mod note;

pub async fn index() -> impl actix_web::Responder {
    actix_web::HttpResponse::Ok().finish()
}

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ServerError::BadRequest(err.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|_err, _req| ServerError::NotFound.into()))
    .route("/", web::get().to(index))
    .service(
        web::resource("/notes")
            .name("get_notes")
            .route(web::get().to(note::query::list))
            .route(web::head().to(note::query::list))
            .route(web::post().to(note::mutate::new)),
    )
    .service(web::resource("/notes/new").route(web::get().to(note::query::new_form)))
    .service(
        web::resource("/notes/{id}")
            .name("get_note")
            .route(web::get().to(note::query::get))
            .route(web::put().to(note::mutate::put))
            .route(web::delete().to(note::mutate::del)),
    )
    .service(web::resource("/notes/{id}/edit").route(web::get().to(note::query::edit_form)))
    .service(web::resource("/notes/{id}/remove").route(web::get().to(note::mutate::del)));
}
