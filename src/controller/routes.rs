//! Route parser for the app

use regex::Regex;

/// List of all routes with params for the app
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Healthcheck,
    ApplyDiscount,
}

/// Matches request paths against the registered route patterns
pub struct RouteParser {
    routes: Vec<(Regex, Route)>,
}

impl RouteParser {
    pub fn new() -> Self {
        Self { routes: vec![] }
    }

    pub fn add_route(&mut self, pattern: &str, route: Route) {
        let regex = Regex::new(pattern).expect("Route pattern must be a valid regex");
        self.routes.push((regex, route));
    }

    pub fn test(&self, path: &str) -> Option<Route> {
        self.routes
            .iter()
            .find(|entry| entry.0.is_match(path))
            .map(|entry| entry.1.clone())
    }
}

pub fn create_route_parser() -> RouteParser {
    let mut router = RouteParser::new();

    // Healthcheck
    router.add_route(r"^/healthcheck$", Route::Healthcheck);

    // POST /billing/apply-discount
    router.add_route(r"^/billing/apply-discount$", Route::ApplyDiscount);

    router
}
