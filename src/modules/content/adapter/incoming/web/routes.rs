use actix_web::web;

use super::handlers::{contents, files};

/// Registers every content-module HTTP route, collected in one place since
/// this module only has one HTTP surface to expose.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(files::init_file_upload)
        .service(files::complete_file_upload)
        .service(files::update_file)
        .service(files::get_files_bulk)
        .service(files::get_file)
        .service(contents::create_content)
        .service(contents::list_contents)
        .service(contents::get_content)
        .service(contents::update_content)
        .service(contents::delete_content)
        .service(contents::list_objects)
        .service(contents::download_content)
        .service(contents::list_derived)
        .service(contents::create_derived_relationship)
        .service(contents::upload_content)
        .service(contents::upload_derived_content);
}
