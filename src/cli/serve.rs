//! taskd serve command implementation

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use super::Context;
use crate::api;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct ServeReport {
    address: SocketAddr,
    data_dir: PathBuf,
}

pub fn run(ctx: &Context, options: ServeOptions) -> Result<()> {
    let mut server = ctx.config.server.clone();
    if let Some(host) = options.host {
        server.host = host;
    }
    if let Some(port) = options.port {
        server.port = port;
    }
    if options.static_dir.is_some() {
        server.static_dir = options.static_dir;
    }

    let storage = ctx.storage();
    if !storage.is_initialized() {
        for path in storage.init()? {
            tracing::info!(path = %path.display(), "created empty store");
        }
    }
    let service = Arc::new(ctx.service());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let address = runtime.block_on(api::serve(service, &server))?;

    let report = ServeReport {
        address,
        data_dir: storage.data_dir().to_path_buf(),
    };
    let mut human = HumanOutput::new("taskd serve: stopped");
    human.push_summary("address", address.to_string());
    human.push_summary("data dir", storage.data_dir().display().to_string());

    emit_success(ctx.output, "serve", &report, Some(&human))
}
