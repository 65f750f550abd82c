//! Lambda entry point for the pre-signup decision pipeline.
//!
//! The runtime hands each pre-signup trigger event to the handler and
//! treats a returned error as "reject this registration" with the error
//! message as the reason. Startup fails hard when the policy document or
//! the verification provider cannot be constructed.

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use signup_gate_lib::config::Config;
use signup_gate_lib::event::RegistrationEvent;
use signup_gate_lib::handlers::PreSignupHandler;
use signup_gate_lib::logging;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env();
    logging::init(&config.log_level);

    let handler = match PreSignupHandler::new(config) {
        Ok(handler) => handler,
        Err(e) => {
            log::error!("failed to init handler: {e:#}");
            return Err(e.into_std_error());
        }
    };
    let handler = &handler;

    run(service_fn(move |request: LambdaEvent<RegistrationEvent>| async move {
        let (event, _context) = request.into_parts();
        handler.handle(event).await.map_err(|e| e.into_std_error())
    }))
    .await
}
