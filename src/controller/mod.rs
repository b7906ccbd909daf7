//! `Controller` is a top layer that handles all http-related
//! stuff like reading bodies, parsing params, forming a response.
//! Basically it provides inputs to `Service` layer and converts outputs
//! of `Service` layer to http responses

pub mod app;
pub mod context;
pub mod responses;
pub mod routes;
pub mod utils;

use std::sync::Arc;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure;
use failure::Error as FailureError;
use futures::future;
use futures::Future;
use hyper::server::Request;
use hyper::{Get, Post};
use r2d2::ManageConnection;
use serde_json;
use validator::Validate;

use self::context::{DynamicContext, StaticContext};
use self::responses::ApiResponse;
use self::routes::{Route, RouteParser};
use self::utils::parse_body;
use errors::Error;
use models::{ApplyDiscountPayload, DiscountResponse};
use repos::ReposFactory;
use services::discounts::DiscountsService;
use services::system::{SystemService, SystemServiceImpl};
use services::Service;

/// Controller layer Future
pub type ControllerFuture = Box<Future<Item = String, Error = FailureError>>;

macro_rules! serialize_future {
    ($e:expr) => {
        Box::new(
            $e.map_err(failure::Error::from)
                .and_then(|resp| serde_json::to_string(&ApiResponse::success(resp)).map_err(failure::Error::from)),
        )
    };
}

/// Controller handles route parsing and calling `Service` layer
pub struct ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub static_context: StaticContext<T, M, F>,
    pub route_parser: Arc<RouteParser>,
}

impl<T, M, F> ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    /// Create a new controller based on services
    pub fn new(static_context: StaticContext<T, M, F>) -> Self {
        let route_parser = Arc::new(routes::create_route_parser());
        Self {
            static_context,
            route_parser,
        }
    }

    /// Handle a request and get future response
    pub fn call(&self, req: Request) -> ControllerFuture {
        let correlation_token = req
            .headers()
            .get_raw("Correlation-Token")
            .and_then(|raw| raw.one())
            .map(|bytes| String::from_utf8_lossy(bytes).to_string());

        let dynamic_context = DynamicContext::new(correlation_token);
        let service = Service::new(self.static_context.clone(), dynamic_context);
        let system_service = SystemServiceImpl::default();

        match (req.method(), self.route_parser.test(req.path())) {
            // GET /healthcheck
            (&Get, Some(Route::Healthcheck)) => serialize_future!(system_service.healthcheck()),

            // POST /billing/apply-discount
            (&Post, Some(Route::ApplyDiscount)) => serialize_future!(
                parse_body::<ApplyDiscountPayload>(req.body())
                    .map_err(failure::Error::from)
                    .and_then(move |payload| -> Box<Future<Item = DiscountResponse, Error = FailureError>> {
                        if let Err(errors) = payload.validate().and_then(|_| payload.user.validate()) {
                            return Box::new(future::err(Error::Validate(errors).into()));
                        }

                        service.apply_discount(payload)
                    })
            ),

            // Fallback
            _ => Box::new(future::err(Error::NotFound.into())),
        }
    }
}
