use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use is_terminal::IsTerminal;
use serde_json::{Value as JsonValue, json};

mod api;
mod auth;
mod client;
mod commit;
mod diff;
mod enumerate;
mod logging;
mod preview;
mod replace;
mod rules;
mod session;

use api::VideoStore;
use client::YouTubeClient;
use commit::CommitResult;
use replace::ReplacementSet;
use session::{CommitOutcome, EditSession};

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq, Default)]
enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn should_color(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Replace(cmd) => handle_replace(cmd)?,
        Command::Channel(cmd) => handle_channel(cmd)?,
        Command::Playlists(cmd) => handle_playlists(cmd)?,
        Command::Videos(cmd) => handle_videos(cmd)?,
        Command::Log(cmd) => handle_log(cmd)?,
    }

    Ok(())
}

fn handle_replace(cmd: ReplaceCommand) -> Result<()> {
    let colorize = cmd.common.color.should_color();
    let (set, source) = resolve_replacement_set(&cmd)?;
    let store = cmd.common.store()?;
    print_replace_summary(&cmd, &set, &source);

    let video_ids = enumerate::video_ids(&store, cmd.playlist.as_deref())?;
    println!("resolved videos: {}", video_ids.len());

    let mut session = EditSession::new();
    let notices = session.preview(&store, &video_ids, &set)?;
    for notice in &notices {
        println!(
            "warning: could not preview video {}: {}",
            notice.video_id, notice.message
        );
        emit_event(
            cmd.common.json,
            &json!({
                "event": "preview-notice",
                "video_id": notice.video_id,
                "message": notice.message
            }),
        );
    }

    let total = session.entries().len();
    if total == 0 {
        println!("no descriptions change with the provided terms.");
        return Ok(());
    }
    println!("descriptions that change: {total}");
    for entry in session.entries().iter().take(cmd.show) {
        println!(
            "--- {} ({}, {}) ---",
            entry.title,
            entry.video_id,
            short_date(&entry.published_at)
        );
        diff::print_diff(
            &entry.original_description,
            &entry.new_description,
            cmd.context,
            colorize,
        );
    }
    if total > cmd.show {
        println!(
            "... {} more change(s) not shown; all {total} are applied on commit.",
            total - cmd.show
        );
    }
    if cmd.common.json {
        for entry in session.entries() {
            emit_event(true, &json!({ "event": "preview", "entry": entry }));
        }
    }

    if !cmd.apply {
        println!("dry-run: rerun with --apply to update these descriptions.");
        return Ok(());
    }
    if !cmd.auto_apply && !confirm_update(total)? {
        println!("update cancelled; no descriptions were changed.");
        return Ok(());
    }

    match session.commit(&store, &set) {
        CommitOutcome::NothingToCommit => println!("nothing to commit."),
        CommitOutcome::Completed(result) => report_commit(&cmd.common, &result),
    }
    Ok(())
}

fn handle_channel(cmd: ChannelCommand) -> Result<()> {
    let store = cmd.common.store()?;
    let info = store.channel_info()?;
    if cmd.common.json {
        println!("{}", serde_json::to_string(&info)?);
        return Ok(());
    }
    println!("channel: {}", info.title);
    println!("subscribers: {}", info.subscriber_count);
    println!("videos: {}", info.video_count);
    println!("uploads playlist: {}", info.uploads_playlist);
    Ok(())
}

fn handle_playlists(cmd: PlaylistsCommand) -> Result<()> {
    let store = cmd.common.store()?;
    let playlists = enumerate::owned_playlists(&store)?;
    if cmd.common.json {
        for playlist in &playlists {
            println!("{}", serde_json::to_string(playlist)?);
        }
        return Ok(());
    }
    if playlists.is_empty() {
        println!("no playlists found.");
        return Ok(());
    }
    for playlist in &playlists {
        println!("{}  {}", playlist.id, playlist.title);
    }
    println!("{} playlist(s)", playlists.len());
    Ok(())
}

fn handle_videos(cmd: VideosCommand) -> Result<()> {
    let store = cmd.common.store()?;
    let playlist = match &cmd.playlist {
        Some(id) => id.clone(),
        None => {
            store
                .channel_info()
                .context("resolving the channel's uploads playlist")?
                .uploads_playlist
        }
    };
    let videos = enumerate::playlist_videos(&store, &playlist)?;
    if cmd.common.json {
        for video in &videos {
            println!("{}", serde_json::to_string(video)?);
        }
        return Ok(());
    }
    if videos.is_empty() {
        println!("playlist {playlist} has no videos.");
        return Ok(());
    }
    for video in &videos {
        println!(
            "{} {} {}",
            short_date(&video.published_at),
            video.video_id,
            video.title
        );
    }
    println!("{} video(s) in {playlist}", videos.len());
    Ok(())
}

fn handle_log(cmd: LogCommand) -> Result<()> {
    let entries = logging::read_recent(cmd.tail)?;
    if entries.is_empty() {
        println!("change log is empty.");
        return Ok(());
    }
    for entry in entries {
        println!(
            "[{}] {:<8} {:<8} {:<12} {}",
            entry.timestamp, entry.command, entry.action, entry.video_id, entry.detail
        );
    }
    Ok(())
}

fn report_commit(common: &CommonArgs, result: &CommitResult) {
    for error in &result.errors {
        println!("failed to update video {}: {}", error.video_id, error.message);
        let _ = logging::record_change("replace", &error.video_id, "error", &error.message);
    }
    println!(
        "updated {} video description(s); {} failure(s).",
        result.updated_count,
        result.errors.len()
    );
    let _ = logging::record_change(
        "replace",
        "batch",
        "applied",
        &format!("{} updated, {} failed", result.updated_count, result.errors.len()),
    );
    emit_event(
        common.json,
        &json!({
            "event": "commit",
            "updated_count": result.updated_count,
            "errors": result.errors
        }),
    );
}

fn resolve_replacement_set(cmd: &ReplaceCommand) -> Result<(ReplacementSet, String)> {
    if let Some(path) = &cmd.rules {
        let set = rules::load_rules(path)?;
        return Ok((set, format!("rules file {}", path.display())));
    }
    let find = cmd.find.as_deref().unwrap_or_default();
    let (replacement, source) = if let Some(text) = &cmd.replacement {
        (text.clone(), "literal")
    } else if cmd.with_stdin {
        (read_replacement_from_stdin()?, "stdin")
    } else if let Some(tag) = &cmd.with_here {
        (read_heredoc_input(tag, "replacement text")?, "heredoc")
    } else {
        (String::new(), "empty (deletes the find text)")
    };
    let set = ReplacementSet::single(find, &replacement)?;
    Ok((set, source.to_string()))
}

fn read_replacement_from_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("reading replacement text from stdin")?;
    Ok(buf)
}

fn read_heredoc_input(tag: &str, description: &str) -> Result<String> {
    if tag.trim().is_empty() {
        bail!("heredoc terminator cannot be empty");
    }
    println!("Enter {description}; finish with a line containing only {tag}.");
    let mut buf = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = io::stdin()
            .read_line(&mut line)
            .context("reading heredoc input")?;
        if bytes == 0 {
            bail!("stdin closed before heredoc terminator '{tag}'");
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == tag {
            break;
        }
        buf.push_str(&line);
    }
    Ok(buf)
}

fn print_replace_summary(cmd: &ReplaceCommand, set: &ReplacementSet, source: &str) {
    println!("command: replace");
    println!(
        "mode: {}{}",
        if cmd.apply { "apply" } else { "dry-run" },
        if cmd.auto_apply { " (auto-approve)" } else { "" }
    );
    match &cmd.playlist {
        Some(id) => println!("playlist: {id}"),
        None => println!("playlist: (channel uploads)"),
    }
    println!("replacement source: {source}");
    println!("replacement pairs ({}):", set.len());
    for (find, with) in set.pairs().iter().take(10) {
        if with.is_empty() {
            println!("  - delete {find:?}");
        } else {
            println!("  - {find:?} -> {with:?}");
        }
    }
    if set.len() > 10 {
        println!("  ...");
    }
    println!("show limit: {}", cmd.show);
    println!("context lines: {}", cmd.context);
    println!("json output: {}", cmd.common.json);
    println!("---");
}

fn confirm_update(total: usize) -> Result<bool> {
    loop {
        print!("Update {total} video description(s)? [y]es/[n]o: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" | "" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {
                println!("Please enter y or n.");
            }
        }
    }
}

fn emit_event(json_mode: bool, event: &JsonValue) {
    if json_mode {
        println!("{event}");
    }
}

fn short_date(published_at: &str) -> &str {
    published_at.get(..10).unwrap_or(published_at)
}

#[derive(Debug, Parser)]
#[command(name = "tubedit", version, about = "Bulk video description editing companion")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Replace(ReplaceCommand),
    Channel(ChannelCommand),
    Playlists(PlaylistsCommand),
    Videos(VideosCommand),
    Log(LogCommand),
}

#[derive(Debug, Clone, Args)]
struct CommonArgs {
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,
    #[arg(long = "token-file", value_name = "FILE", value_hint = ValueHint::FilePath)]
    token_file: Option<PathBuf>,
    #[arg(long = "api-base", value_name = "URL", default_value = client::DEFAULT_API_BASE)]
    api_base: String,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    #[arg(long = "color", value_enum, default_value = "auto")]
    color: ColorChoice,
}

impl CommonArgs {
    fn store(&self) -> Result<YouTubeClient> {
        let token = auth::resolve_token(self.token.as_deref(), self.token_file.as_deref())?;
        Ok(YouTubeClient::new(token, self.api_base.clone()))
    }
}

#[derive(Debug, Args)]
struct ReplaceCommand {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(
        long,
        value_name = "TEXT",
        conflicts_with = "rules",
        required_unless_present = "rules"
    )]
    find: Option<String>,
    #[arg(
        long = "with",
        value_name = "TEXT",
        conflicts_with_all = ["with_stdin", "with_here", "rules"]
    )]
    replacement: Option<String>,
    #[arg(long = "with-stdin", action = ArgAction::SetTrue, conflicts_with_all = ["with_here", "rules"])]
    with_stdin: bool,
    #[arg(long = "with-here", value_name = "TAG", conflicts_with = "rules")]
    with_here: Option<String>,
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    rules: Option<PathBuf>,
    #[arg(long, value_name = "ID")]
    playlist: Option<String>,
    #[arg(long, action = ArgAction::SetTrue)]
    apply: bool,
    #[arg(long = "yes", action = ArgAction::SetTrue)]
    auto_apply: bool,
    #[arg(long, value_name = "N", default_value_t = 5)]
    show: usize,
    #[arg(long, default_value_t = 3)]
    context: usize,
}

#[derive(Debug, Args)]
struct ChannelCommand {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct PlaylistsCommand {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct VideosCommand {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, value_name = "ID")]
    playlist: Option<String>,
}

#[derive(Debug, Args)]
struct LogCommand {
    #[arg(long = "tail", default_value_t = 20)]
    tail: usize,
}
