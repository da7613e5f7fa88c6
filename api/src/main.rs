use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;

use api::clients::{transport_from_config, MailchimpClient};
use api::config::ServiceConfig;
use api::dispatch::Dispatcher;
use api::observability::Observability;
use api::routes;
use api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let obs = Observability::init()?;
    let config = ServiceConfig::from_env()?;

    let mailing_list = Arc::new(MailchimpClient::new(&config.mailchimp, config.outbound_timeout));
    let transport = transport_from_config(&config.mail_relay, config.outbound_timeout);
    let dispatcher = Dispatcher::with_clients(config.forms.clone(), mailing_list, transport);

    let state = AppState::new(dispatcher, obs.registry);
    let app = routes::build_router(state, &config.server);

    let addr = config.server.bind_addr;
    tracing::info!("Form endpoint listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
