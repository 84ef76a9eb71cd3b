use std::io::Write;
use std::net::SocketAddr;

use anyhow::{bail, Context};
use colored::Colorize;
use vtfs_remote::{RemoteConfig, RemoteStore};
use vtfs_server::{ServerConfig, VtfsServer};
use vtfs_store::Backend;
use vtfs_types::{NodeKind, ObjectMeta};

use crate::cli::*;

const DEFAULT_FILE_MODE: u32 = 0o100644;
const DEFAULT_DIR_MODE: u32 = 0o040755;
const CAT_CHUNK: usize = 64 * 1024;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        endpoint,
        token,
        timeout_ms,
        ..
    } = cli;

    if let Command::Serve(args) = command {
        return cmd_serve(args, token);
    }

    let mut config = RemoteConfig::new(endpoint).with_timeout_ms(timeout_ms);
    config.token = token;
    tracing::debug!(endpoint = %config.endpoint, timeout_ms, "connecting to peer");
    let store = RemoteStore::connect(&config)
        .with_context(|| format!("connecting to {}", config.endpoint))?;
    store.initialize()?;
    let result = run_client(&store, command, &mut std::io::stdout().lock());
    store.shutdown();
    result
}

fn cmd_serve(args: ServeArgs, token: Option<String>) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    if token.is_some() {
        config.token = token;
    }

    println!(
        "{} vtfs peer on {}{}",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        if config.token.is_some() { " (token required)" } else { "" }
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(VtfsServer::new(config).serve())?;
    Ok(())
}

/// Run one client command against `store`, printing to `out`.
pub fn run_client(store: &dyn Backend, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Serve(_) => bail!("serve is not a client command"),
        Command::Ls(args) => cmd_ls(store, args, out),
        Command::Stat(args) => cmd_stat(store, &args.path, out),
        Command::Mkdir(args) => cmd_create(store, args, NodeKind::Directory, out),
        Command::Touch(args) => cmd_create(store, args, NodeKind::File, out),
        Command::Write(args) => cmd_write(store, args, out),
        Command::Cat(args) => cmd_cat(store, &args.path, out),
        Command::Rm(args) => {
            let (parent, name) = parent_and_name(store, &args.path)?;
            store.unlink(parent.id, name).with_context(|| format!("rm {}", args.path))?;
            writeln!(out, "{} removed {}", "✓".green(), args.path)?;
            Ok(())
        }
        Command::Rmdir(args) => {
            let (parent, name) = parent_and_name(store, &args.path)?;
            store
                .remove_dir(parent.id, name)
                .with_context(|| format!("rmdir {}", args.path))?;
            writeln!(out, "{} removed {}", "✓".green(), args.path)?;
            Ok(())
        }
        Command::Ln(args) => cmd_ln(store, args, out),
        Command::Truncate(args) => {
            let file = resolve(store, &args.path)?;
            store
                .truncate(file.id, args.size)
                .with_context(|| format!("truncate {}", args.path))?;
            writeln!(out, "{} {} is now {} bytes", "✓".green(), args.path, args.size)?;
            Ok(())
        }
    }
}

fn resolve(store: &dyn Backend, path: &str) -> anyhow::Result<ObjectMeta> {
    store.resolve(path).with_context(|| format!("resolving {path}"))
}

/// Split `path` into its parent directory and final component.
pub fn split_path(path: &str) -> anyhow::Result<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let (parent, name) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
    if name.is_empty() {
        bail!("{path:?} has no final component");
    }
    Ok((parent, name))
}

fn parent_and_name<'p>(store: &dyn Backend, path: &'p str) -> anyhow::Result<(ObjectMeta, &'p str)> {
    let (parent, name) = split_path(path)?;
    Ok((resolve(store, parent)?, name))
}

fn parse_mode(mode: Option<&str>, default: u32, kind: NodeKind) -> anyhow::Result<u32> {
    let Some(text) = mode else {
        return Ok(default);
    };
    let bits = u32::from_str_radix(text.trim_start_matches("0o"), 8)
        .with_context(|| format!("invalid octal mode {text:?}"))?;
    if bits > 0o7777 {
        bail!("mode {text:?} has bits outside 0o7777");
    }
    let file_type = match kind {
        NodeKind::Directory => 0o040000,
        NodeKind::File => 0o100000,
    };
    Ok(file_type | bits)
}

fn kind_label(kind: NodeKind) -> colored::ColoredString {
    match kind {
        NodeKind::Directory => "dir ".blue(),
        NodeKind::File => "file".normal(),
    }
}

fn cmd_ls(store: &dyn Backend, args: LsArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let dir = resolve(store, &args.path)?;
    let entries = store
        .read_dir(dir.id)
        .with_context(|| format!("listing {}", args.path))?;
    for entry in entries.iter().filter(|e| args.all || !e.is_dot()) {
        let name = match entry.kind {
            NodeKind::Directory => entry.name.blue().bold(),
            NodeKind::File => entry.name.normal(),
        };
        writeln!(
            out,
            "{} {:>6} {}",
            kind_label(entry.kind),
            entry.id.to_string().dimmed(),
            name
        )?;
    }
    Ok(())
}

fn cmd_stat(store: &dyn Backend, path: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let meta = resolve(store, path)?;
    writeln!(out, "{} {}", "path:".bold(), path)?;
    writeln!(out, "  id:     {}", meta.id.to_string().yellow())?;
    writeln!(out, "  parent: {}", meta.parent)?;
    writeln!(out, "  kind:   {}", kind_label(meta.kind))?;
    writeln!(out, "  mode:   {:o}", meta.mode)?;
    writeln!(out, "  size:   {}", meta.size)?;
    writeln!(out, "  links:  {}", meta.nlink)?;
    Ok(())
}

fn cmd_create(
    store: &dyn Backend,
    args: CreateArgs,
    kind: NodeKind,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let (parent, name) = parent_and_name(store, &args.path)?;
    let meta = match kind {
        NodeKind::Directory => {
            let mode = parse_mode(args.mode.as_deref(), DEFAULT_DIR_MODE, kind)?;
            store.make_dir(parent.id, name, mode)
        }
        NodeKind::File => {
            let mode = parse_mode(args.mode.as_deref(), DEFAULT_FILE_MODE, kind)?;
            store.create_file(parent.id, name, mode)
        }
    }
    .with_context(|| format!("creating {}", args.path))?;
    writeln!(
        out,
        "{} created {} {} (id {})",
        "✓".green(),
        kind,
        args.path.bold(),
        meta.id
    )?;
    Ok(())
}

fn cmd_write(store: &dyn Backend, args: WriteArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let file = resolve(store, &args.path)?;
    let outcome = store
        .write_file(file.id, args.offset, args.data.as_bytes())
        .with_context(|| format!("writing {}", args.path))?;
    writeln!(
        out,
        "{} wrote {} bytes, size {}",
        "✓".green(),
        outcome.bytes_written,
        outcome.new_size
    )?;
    Ok(())
}

fn cmd_cat(store: &dyn Backend, path: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let file = resolve(store, path)?;
    let mut offset = 0u64;
    loop {
        let chunk = store
            .read_file(file.id, offset, CAT_CHUNK)
            .with_context(|| format!("reading {path}"))?;
        if chunk.is_empty() {
            break;
        }
        out.write_all(&chunk)?;
        offset += chunk.len() as u64;
    }
    out.flush()?;
    Ok(())
}

fn cmd_ln(store: &dyn Backend, args: LnArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let target = resolve(store, &args.target)?;
    let (parent, name) = parent_and_name(store, &args.link)?;
    let meta = store
        .link(parent.id, name, target.id)
        .with_context(|| format!("linking {} to {}", args.link, args.target))?;
    writeln!(
        out,
        "{} {} → {} ({} links)",
        "✓".green(),
        args.link.bold(),
        args.target,
        meta.nlink
    )?;
    Ok(())
}
