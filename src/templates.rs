use std::{path::Path, sync::Arc, time::Instant};

use anyhow::Context as _;
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use serde::Serialize;
use tracing as log;

use crate::{session::SessionUser, AppContext};

pub(crate) fn load(dir: &Path) -> anyhow::Result<tera::Tera> {
    let glob = dir.join("**").join("*.html");
    let glob = glob.to_str().context("templates directory isn't valid utf-8")?;
    tera::Tera::new(glob).with_context(|| format!("when loading templates from {dir:?}"))
}

/// Context shared by every page: the layout needs to know who's logged in.
pub(crate) fn page_context(user: Option<&SessionUser>) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("current_user", &user);
    ctx
}

/// Same as [`page_context`], with extra values merged from a serializable struct.
pub(crate) fn page_context_with(
    user: Option<&SessionUser>,
    extra: &impl Serialize,
) -> anyhow::Result<tera::Context> {
    let mut ctx = page_context(user);
    ctx.extend(tera::Context::from_serialize(extra)?);
    Ok(ctx)
}

pub(crate) fn render(ctx: &AppContext, name: &str, page: &tera::Context) -> anyhow::Result<String> {
    let templates = ctx
        .templates
        .read()
        .map_err(|_| anyhow::anyhow!("templates lock is poisoned"))?;
    Ok(templates.render(name, page)?)
}

/// Reloads all the templates every time something changes in the templates directory. The
/// returned watcher must be kept alive for as long as reloading is wanted.
pub(crate) fn watch(ctx: Arc<AppContext>) -> anyhow::Result<RecommendedWatcher> {
    let dir = ctx.config.templates_dir.clone();
    let watched = dir.clone();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let event = match res {
            Ok(event) => event,
            Err(err) => {
                log::error!("error when watching templates: {err}");
                return;
            }
        };

        if event.kind.is_access() {
            return;
        }

        log::debug!("templates changed ({:?}), reloading", event.paths);
        let timer = Instant::now();

        // A broken template keeps the previous set around.
        let reloaded = match load(&dir) {
            Ok(reloaded) => reloaded,
            Err(err) => {
                log::error!("unable to reload templates: {err:#}");
                return;
            }
        };

        match ctx.templates.write() {
            Ok(mut templates) => {
                *templates = reloaded;
                log::debug!(
                    "reloading templates took {}ms",
                    timer.elapsed().as_millis()
                );
            }
            Err(_) => log::error!("templates lock is poisoned, not reloading"),
        }
    })?;

    watcher
        .watch(&watched, RecursiveMode::Recursive)
        .with_context(|| format!("when watching {watched:?}"))?;

    log::info!("watching templates in {watched:?}");

    Ok(watcher)
}
