use std::{convert::Infallible, env, net::Ipv4Addr, time::Duration};

use hyper::{server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use tokio::{net::TcpListener, runtime::Runtime, signal, time};

/// How long a session may stay untouched before the sweeper drops it.
const SESSION_IDLE_LIMIT: Duration = Duration::from_secs(30 * 60);

/// Pause between sweeps over the session store.
const SWEEP_PERIOD: Duration = Duration::from_secs(5 * 60);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Parse environment variables
    let port = env::var("PORT")?.parse()?;
    let gemini_key = match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => Some(key),
        _ => None,
    };
    let places_key = match env::var("FOURSQUARE_API_KEY") {
        Ok(key) if !key.is_empty() => Some(key),
        _ => None,
    };

    // Initialize the service
    let app = api::App::new(gemini_key.as_deref(), places_key.as_deref());

    let runtime = Runtime::new()?;
    runtime.block_on(async {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        log::info!("listening on port {port}");

        // Sweep idle sessions in the background
        let sweeper = app.clone();
        tokio::spawn(async move {
            loop {
                time::sleep(SWEEP_PERIOD).await;
                let evicted = sweeper.sweep_sessions(SESSION_IDLE_LIMIT);
                if evicted > 0 {
                    log::info!("swept {evicted} idle sessions");
                }
            }
        });

        // Serve connections until interrupted
        let mut shutdown = core::pin::pin!(signal::ctrl_c());
        loop {
            let (stream, remote) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        log::error!("accept failed: {err}");
                        continue;
                    }
                },
                _ = &mut shutdown => break,
            };
            log::debug!("new connection from {remote}");

            let app = app.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let app = app.clone();
                    async move { Ok::<_, Infallible>(app.respond(req).await) }
                });
                if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                    log::error!("connection error: {err}");
                }
            });
        }

        log::info!("shutting down");
        anyhow::Ok(())
    })
}
