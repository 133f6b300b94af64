use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use anyhow::{Result, Context, anyhow};
use rouille::session::session;
use rouille::{Request, Response, Server};
use tracing::info;

use crate::dispatch::App;
use crate::session::SESSION_TIMEOUT_SECS;

pub const SESSION_COOKIE: &str = "sid";

/// Make a handler for Rouille's `Server::new`. Requests below
/// `/static/` are served from `static_dir`, everything else goes
/// through the dispatcher with the request's session.
pub fn server_handler(
    app: Arc<App>,
    static_dir: Option<PathBuf>,
) -> impl Fn(&Request) -> Response + Send + Sync + 'static {
    move |request: &Request| -> Response {
        if let (Some(dir), Some(assets)) = (&static_dir, request.remove_prefix("/static")) {
            let response = rouille::match_assets(&assets, dir);
            if response.is_success() {
                return response
            }
            return Response::empty_404()
        }
        session(request, SESSION_COOKIE, SESSION_TIMEOUT_SECS, |session| {
            app.dispatch(request, session.id())
        })
    }
}

/// Run a rouille server in a new thread. Returns once the server is
/// listening (or failed to bind).
pub fn run_server(
    thread_name: &str,
    addr: String,
    app: Arc<App>,
    static_dir: Option<PathBuf>,
) -> Result<JoinHandle<()>> {
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new().name(thread_name.into()).spawn(move || {
        match Server::new(addr.clone(), server_handler(app, static_dir)) {
            Ok(server) => {
                let _ = tx.send(Ok(server.server_addr()));
                server.run()
            }
            Err(e) => {
                let _ = tx.send(Err(anyhow!("starting server on {addr:?}: {e}")));
            }
        }
    })?;
    let bound = rx.recv().with_context(|| anyhow!("server thread exited early"))??;
    info!("listening on {bound}");
    Ok(handle)
}
