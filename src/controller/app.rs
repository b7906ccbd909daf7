//! `Application` is a top-level wrapper for the `Controller` that
//! implements the hyper `Service` trait and translates errors into
//! http responses

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::{Context, Error as FailureError};
use futures::future;
use futures::Future;
use hyper;
use hyper::header::{ContentLength, ContentType};
use hyper::server::{Request, Response, Service};
use hyper::StatusCode;
use r2d2::ManageConnection;
use serde_json;

use super::responses::ApiErrorResponse;
use super::ControllerImpl;
use errors::Error;
use repos::ReposFactory;

/// Application contains controller, metrics and error handlers
pub struct Application<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub controller: ControllerImpl<T, M, F>,
}

impl<T, M, F> Application<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub fn new(controller: ControllerImpl<T, M, F>) -> Self {
        Self { controller }
    }
}

impl<T, M, F> Service for Application<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    type Request = Request;
    type Response = Response;
    type Error = hyper::Error;
    type Future = Box<Future<Item = Response, Error = hyper::Error>>;

    fn call(&self, req: Request) -> Self::Future {
        debug!("Received request: {} {}", req.method(), req.path());

        Box::new(self.controller.call(req).then(|result| match result {
            Ok(response) => future::ok(build_response(StatusCode::Ok, response)),
            Err(e) => future::ok(response_from_error(&e)),
        }))
    }
}

/// Walks the error chain looking for the typed app error and picks the
/// matching status code; everything else becomes a generic 500 so no
/// internals leak to the caller.
fn response_from_error(error: &FailureError) -> Response {
    let app_error = error.iter_chain().filter_map(|cause| {
        cause
            .downcast_ref::<Context<Error>>()
            .map(|context| context.get_context())
            .or_else(|| cause.downcast_ref::<Error>())
    }).next();

    match app_error {
        Some(&Error::Validate(ref errors)) => {
            debug!("Request validation failed: {}", errors);
            let body = serialize_error(ApiErrorResponse::from_validation_errors(errors.clone()));
            build_response(StatusCode::BadRequest, body)
        }
        Some(app_error) => {
            debug!("Request finished with error: {}", app_error);
            let body = serialize_error(ApiErrorResponse::from_message(&app_error.to_string()));
            build_response(app_error.code(), body)
        }
        None => {
            error!("Internal server error: {:?}", error);
            let body = serialize_error(ApiErrorResponse::from_message("Internal server error"));
            build_response(StatusCode::InternalServerError, body)
        }
    }
}

fn serialize_error(response: ApiErrorResponse) -> String {
    serde_json::to_string(&response).unwrap_or_else(|_| r##"{"success":false,"error":"Internal server error"}"##.to_string())
}

fn build_response(status: StatusCode, body: String) -> Response {
    Response::new()
        .with_status(status)
        .with_header(ContentLength(body.len() as u64))
        .with_header(ContentType::json())
        .with_body(body)
}
