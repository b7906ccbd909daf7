//! Billing is a microservice responsible for evaluating discount coupons.
//! This crate is for running the service from `billing_lib`. See `billing_lib` for details.

extern crate billing_lib;
extern crate env_logger;

fn main() {
    let config = billing_lib::config::Config::new().expect("Can't load app config!");

    // Prepare logger
    env_logger::init();

    billing_lib::start_server(config, &None, || ());
}
