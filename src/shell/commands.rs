//! Built-in command set.

use futures::FutureExt;

use crate::api::{normalize_paths, BlogDraft};
use crate::util::pick_file;
use crate::{flog_debug, flog_warn, Result};

use super::registry::{CommandContext, CommandDescriptor, HandlerFuture, Registry};

const BANNER: &[&str] = &[
    "\x1b[38;5;208m  ___     _ _\x1b[0m",
    "\x1b[38;5;208m | __|__ | (_)___\x1b[0m",
    "\x1b[38;5;208m | _/ _ \\| | / _ \\\x1b[0m",
    "\x1b[38;5;208m |_|\\___/|_|_\\___/\x1b[0m",
    "",
];

pub const BUILTIN: &[CommandDescriptor] = &[
    CommandDescriptor::new("help", "Show this help message", help),
    CommandDescriptor::new("version", "Show the current server version", version),
    CommandDescriptor::new("clear", "Clear the terminal output", clear),
    CommandDescriptor::new("neofetch", "Show system info", neofetch),
    CommandDescriptor::new("neofetch | less", "Show system info, paged", neofetch_paged).hidden(),
    CommandDescriptor::new("help-elevated", "List privileged commands", help_elevated).elevated(),
    CommandDescriptor::new(
        "update-server",
        "Update the server to the latest available version",
        update_server,
    )
    .elevated(),
    CommandDescriptor::new(
        "authenticate",
        "Unlock the analytics dashboard",
        authenticate,
    )
    .elevated(),
    CommandDescriptor::new("purge-cache", "Purge selected paths from the CDN cache", purge_cache)
        .elevated(),
    CommandDescriptor::new("purge-all-cache", "Purge the whole CDN cache", purge_all_cache)
        .elevated(),
    CommandDescriptor::new("post-blog", "Publish a blog post from a markdown file", post_blog)
        .elevated(),
];

/// The registry shipped with the binary.
pub fn builtin_registry() -> Result<Registry> {
    Registry::new(BUILTIN.iter().copied())
}

fn help(ctx: CommandContext) -> HandlerFuture {
    async move {
        ctx.out.info("Usage:");
        for d in ctx.registry.listed(false) {
            ctx.out.info(format!("- {}: {}", d.name, d.summary));
        }
        ctx.out
            .info("Privileged commands run with 'elevate <command>'.");
        Ok(())
    }
    .boxed()
}

fn help_elevated(ctx: CommandContext) -> HandlerFuture {
    async move {
        ctx.out.info("Privileged commands:");
        for d in ctx.registry.listed(true) {
            ctx.out.info(format!("- {}: {}", d.name, d.summary));
        }
        Ok(())
    }
    .boxed()
}

fn version(ctx: CommandContext) -> HandlerFuture {
    async move {
        match ctx.api.version().await {
            Ok(v) => ctx.out.info(format!("Version: {v}")),
            Err(e) => {
                flog_warn!("version: {}", e);
                ctx.out.error("Failed to fetch version");
            }
        }
        Ok(())
    }
    .boxed()
}

fn clear(ctx: CommandContext) -> HandlerFuture {
    async move {
        ctx.out.clear();
        Ok(())
    }
    .boxed()
}

fn neofetch(ctx: CommandContext) -> HandlerFuture {
    async move {
        ctx.out
            .error("Error: Not enough screen real estate. Try piping to less.");
        Ok(())
    }
    .boxed()
}

fn neofetch_paged(ctx: CommandContext) -> HandlerFuture {
    async move {
        ctx.out.clear();
        for line in BANNER {
            ctx.out.raw(*line);
        }
        match ctx.config.qr_code_link.as_deref() {
            Some(link) => ctx.out.raw(format!("Portfolio QR code: {link}")),
            None => ctx.out.raw("QR Code not available"),
        }
        Ok(())
    }
    .boxed()
}

fn update_server(ctx: CommandContext) -> HandlerFuture {
    async move {
        let elevation = ctx.elevation()?;
        match ctx.api.update_server(elevation).await {
            Ok(()) => ctx.out.success("Server will be updated shortly..."),
            Err(e) => {
                flog_warn!("update-server: {}", e);
                ctx.out.error("Failed to schedule server update.");
            }
        }
        Ok(())
    }
    .boxed()
}

fn authenticate(ctx: CommandContext) -> HandlerFuture {
    async move {
        let elevation = ctx.elevation()?;
        match ctx.api.authenticate(elevation).await {
            Ok(token) => ctx.out.success(format!(
                "Analytics unlocked: {}/analytics?token={}",
                ctx.config.effective_api_base(),
                token
            )),
            Err(e) => {
                flog_warn!("authenticate: {}", e);
                ctx.out.error("Failed to authenticate.");
            }
        }
        Ok(())
    }
    .boxed()
}

fn purge_cache(ctx: CommandContext) -> HandlerFuture {
    async move {
        let elevation = ctx.elevation()?;
        let answer = ctx.ask("Paths to purge (space separated):").await?;
        let paths = normalize_paths(answer.split_whitespace());
        if paths.is_empty() {
            ctx.out.error("No paths given, nothing purged.");
            return Ok(());
        }

        flog_debug!("purge-cache: {} paths", paths.len());
        match ctx.api.purge_cache(elevation, &paths).await {
            Ok(()) => ctx
                .out
                .success(format!("Purged {} path(s) from the cache.", paths.len())),
            Err(e) => {
                flog_warn!("purge-cache: {}", e);
                ctx.out.error("Cache purge failed.");
            }
        }
        Ok(())
    }
    .boxed()
}

fn purge_all_cache(ctx: CommandContext) -> HandlerFuture {
    async move {
        let elevation = ctx.elevation()?;
        match ctx.api.purge_all_cache(elevation).await {
            Ok(()) => ctx.out.success("Entire cache purged."),
            Err(e) => {
                flog_warn!("purge-all-cache: {}", e);
                ctx.out.error("Cache purge failed.");
            }
        }
        Ok(())
    }
    .boxed()
}

fn post_blog(ctx: CommandContext) -> HandlerFuture {
    async move {
        let elevation = ctx.elevation()?;

        let title = ctx.ask("Title:").await?;
        if title.is_empty() {
            ctx.out.error("Blog title is required.");
            return Ok(());
        }
        let summary = ctx.ask("Summary:").await?;
        let path = ctx.ask("Markdown file:").await?;

        let content = match pick_file(path.as_str()).await {
            Ok(file) => file,
            Err(e) => {
                ctx.out.error(format!("Could not read {path}: {e}"));
                return Ok(());
            }
        };

        let draft = BlogDraft {
            title,
            summary,
            content,
        };
        match ctx.api.post_blog(elevation, draft).await {
            Ok(()) => ctx.out.success("Blog post published."),
            Err(e) => {
                flog_warn!("post-blog: {}", e);
                ctx.out.error("Failed to publish blog post.");
            }
        }
        Ok(())
    }
    .boxed()
}
