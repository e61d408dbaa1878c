use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use skillsync::config::SyncConfig;
use skillsync::confirm::confirm;
use skillsync::credentials::resolve_token;
use skillsync::inventory::SkillsCli;
use skillsync::models::{BackupPayload, SkillRecord, SyncMode};
use skillsync::output::{format_text, SyncReport};
use skillsync::plan::{plan_auto, plan_merge, plan_pull, plan_push, PlanInput, SyncStrategy};
use skillsync::remote::RemoteStore;
use skillsync::retry::{with_retry, RetryPolicy};
use skillsync::source::partition_by_source;
use skillsync::timestamp::now_iso;
use skillsync::Result;

#[derive(Parser)]
#[command(
    name = "skillsync",
    version,
    about = "Sync agent skill collections with a remote backup"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show project information
    #[arg(long)]
    about: bool,
}

/// Output format for run reports.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON report object
    Json,
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Config directory (default: ~/.skillsync)
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Backup gist id (overrides the configured one)
    #[arg(long)]
    gist_id: Option<String>,
    /// Path to the skills binary
    #[arg(long)]
    skills_bin: Option<PathBuf>,
    /// Compute and print the plan without executing it
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile local and remote skills (two-way)
    Sync {
        /// Merge strategy: 'union' keeps both sides, 'latest' trusts the
        /// fresher side
        #[arg(long)]
        strategy: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Mirror the remote backup into the local collection (with removals)
    Pull {
        /// Skip the removal confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Mirror the local collection into the remote backup
    Push {
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Show the local/remote diff without changing anything
    Status {
        #[command(flatten)]
        common: CommonArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.about {
        print_about();
        return;
    }

    let code = match cli.command {
        Some(Commands::Sync { strategy, common }) => run_sync(strategy.as_deref(), &common),
        Some(Commands::Pull { yes, common }) => run_pull(yes, &common),
        Some(Commands::Push { common }) => run_push(&common),
        Some(Commands::Status { common }) => run_status(&common),
        None => {
            eprintln!("Usage: skillsync <command> [args]");
            eprintln!("Run `skillsync --help` for details.");
            1
        }
    };
    std::process::exit(code);
}

fn print_about() {
    println!(
        "skillsync: agent skill backup and sync\n\
         ├─ version:    {}\n\
         ├─ source:     {}\n\
         └─ licence:    {} https://opensource.org/licenses/{}",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_REPOSITORY"),
        env!("CARGO_PKG_LICENSE"),
        env!("CARGO_PKG_LICENSE"),
    );
}

/// Everything a run needs: loaded config, inventory and remote clients,
/// and both payload snapshots taken at session start.
struct Session {
    config: SyncConfig,
    skills: SkillsCli,
    remote: RemoteStore,
    retry: RetryPolicy,
    now: String,
    gist_id: Option<String>,
    local: BackupPayload,
    remote_payload: BackupPayload,
}

/// Load config, resolve credentials, snapshot the local inventory, and
/// fetch the remote backup. The two snapshots are what every plan builder
/// works from; nothing re-reads them mid-run.
fn open_session(common: &CommonArgs) -> Result<Session> {
    let config_dir = common
        .config_dir
        .clone()
        .unwrap_or_else(SyncConfig::default_dir);
    let mut config = SyncConfig::load(&config_dir)?;
    if let Some(gist_id) = &common.gist_id {
        config.gist_id = Some(gist_id.clone());
    }

    let mut skills = match &common.skills_bin {
        Some(path) => SkillsCli::with_path(path.clone()),
        None => SkillsCli::new(),
    };

    let token = resolve_token(&config)?;
    let remote = RemoteStore::new(token, config.gist_id.clone());
    let retry = RetryPolicy::default();
    let now = now_iso();

    let local_records = skills.list(&config.default_source)?;
    let local = BackupPayload::from_records(&local_records, &now);

    let fetched = with_retry(&retry, || remote.fetch())?;
    let (gist_id, remote_payload) = match fetched {
        Some((id, payload)) => (Some(id), payload),
        // No backup yet (or the configured gist is gone): the next
        // upload creates a fresh one.
        None => (None, BackupPayload::default()),
    };

    Ok(Session {
        config,
        skills,
        remote,
        retry,
        now,
        gist_id,
        local,
        remote_payload,
    })
}

fn plan_input<'a>(session: &'a Session) -> PlanInput<'a> {
    let mut input = PlanInput::new(&session.local, &session.remote_payload, &session.now)
        .with_default_source(&session.config.default_source);
    if let Some(last_sync_at) = session.config.last_sync_at.as_deref() {
        input = input.with_last_sync_at(last_sync_at);
    }
    input
}

fn run_sync(strategy: Option<&str>, common: &CommonArgs) -> i32 {
    // Strategy validation happens before any I/O: an explicitly-wrong
    // value must fail even when credentials or network would too.
    let strategy = match SyncStrategy::parse(strategy) {
        Ok(strategy) => strategy,
        Err(error) => {
            eprintln!("skillsync sync: {error}");
            return 1;
        }
    };
    match execute_sync(strategy, common) {
        Ok(report) => finish(&report, common),
        Err(error) => {
            eprintln!("skillsync sync: {error}");
            1
        }
    }
}

fn execute_sync(strategy: SyncStrategy, common: &CommonArgs) -> Result<SyncReport> {
    let mut session = open_session(common)?;
    match strategy {
        SyncStrategy::Merge => {
            let plan = plan_merge(&plan_input(&session));
            let mut report = SyncReport::new(SyncMode::Merge);
            report.dry_run = common.dry_run;
            if common.dry_run {
                report.installed = plan.install_candidates;
                report.uploaded = plan.upload.is_some();
                return Ok(report);
            }
            install_candidates(&mut session, plan.install_candidates, &mut report);
            apply_upload(&mut session, plan.upload, &mut report)?;
            finish_session(session, &report)?;
            Ok(report)
        }
        SyncStrategy::Auto => {
            let plan = plan_auto(&plan_input(&session));
            let mut report = SyncReport::new(SyncMode::Auto);
            report.dry_run = common.dry_run;
            report.remote_newer = plan.remote_newer;
            if common.dry_run {
                report.installed = plan.install_candidates;
                report.uploaded = plan.upload.is_some();
                return Ok(report);
            }
            install_candidates(&mut session, plan.install_candidates, &mut report);
            apply_upload(&mut session, plan.upload, &mut report)?;
            finish_session(session, &report)?;
            Ok(report)
        }
    }
}

fn run_pull(yes: bool, common: &CommonArgs) -> i32 {
    match execute_pull(yes, common) {
        Ok(Some(report)) => finish(&report, common),
        Ok(None) => {
            eprintln!("Aborted.");
            1
        }
        Err(error) => {
            eprintln!("skillsync pull: {error}");
            1
        }
    }
}

/// Returns `Ok(None)` when the user declined the removal confirmation.
fn execute_pull(yes: bool, common: &CommonArgs) -> Result<Option<SyncReport>> {
    let mut session = open_session(common)?;
    let plan = plan_pull(&plan_input(&session));
    let mut report = SyncReport::new(SyncMode::Pull);
    report.dry_run = common.dry_run;

    if common.dry_run {
        report.installed = plan.install_candidates;
        report.removed = plan.remove_candidates;
        return Ok(Some(report));
    }

    if !plan.remove_candidates.is_empty() && !yes {
        let prompt = format!(
            "Remove {} skill(s) no longer in the backup?",
            plan.remove_candidates.len()
        );
        let mut stdin = io::stdin().lock();
        let mut stderr = io::stderr();
        if !confirm(&prompt, &mut stdin, &mut stderr)? {
            return Ok(None);
        }
    }

    install_candidates(&mut session, plan.install_candidates, &mut report);
    remove_candidates(&mut session, plan.remove_candidates, &mut report);
    finish_session(session, &report)?;
    Ok(Some(report))
}

fn run_push(common: &CommonArgs) -> i32 {
    match execute_push(common) {
        Ok(report) => finish(&report, common),
        Err(error) => {
            eprintln!("skillsync push: {error}");
            1
        }
    }
}

fn execute_push(common: &CommonArgs) -> Result<SyncReport> {
    let mut session = open_session(common)?;
    let plan = plan_push(&plan_input(&session));
    let mut report = SyncReport::new(SyncMode::Push);
    report.dry_run = common.dry_run;
    if common.dry_run {
        report.uploaded = plan.upload.is_some();
        return Ok(report);
    }
    apply_upload(&mut session, plan.upload, &mut report)?;
    finish_session(session, &report)?;
    Ok(report)
}

/// Local/remote diff, computed without mutating anything.
#[derive(Debug, Serialize)]
struct StatusView {
    gist_id: Option<String>,
    remote_updated_at: String,
    last_sync_at: Option<String>,
    missing_locally: Vec<SkillRecord>,
    missing_remotely: Vec<SkillRecord>,
}

fn run_status(common: &CommonArgs) -> i32 {
    match execute_status(common) {
        Ok(view) => {
            match common.format {
                Format::Text => print!("{}", format_status(&view)),
                Format::Json => {
                    println!("{}", serde_json::to_string_pretty(&view).unwrap());
                }
            }
            0
        }
        Err(error) => {
            eprintln!("skillsync status: {error}");
            1
        }
    }
}

fn execute_status(common: &CommonArgs) -> Result<StatusView> {
    let session = open_session(common)?;
    let plan = plan_pull(&plan_input(&session));
    Ok(StatusView {
        gist_id: session.gist_id,
        remote_updated_at: session.remote_payload.updated_at,
        last_sync_at: session.config.last_sync_at,
        missing_locally: plan.install_candidates,
        missing_remotely: plan.remove_candidates,
    })
}

fn format_status(view: &StatusView) -> String {
    let mut out = String::new();
    match &view.gist_id {
        Some(id) if !view.remote_updated_at.is_empty() => {
            out.push_str(&format!(
                "Backup gist {id} (updated {})\n",
                view.remote_updated_at
            ));
        }
        Some(id) => out.push_str(&format!("Backup gist {id} (never written)\n")),
        None => out.push_str("No backup gist found.\n"),
    }
    if let Some(last) = &view.last_sync_at {
        out.push_str(&format!("Last clean sync: {last}\n"));
    }
    for record in &view.missing_locally {
        out.push_str(&format!("remote only: {record}\n"));
    }
    for record in &view.missing_remotely {
        out.push_str(&format!("local only: {record}\n"));
    }
    if view.missing_locally.is_empty() && view.missing_remotely.is_empty() {
        out.push_str("Local collection and backup are in sync.\n");
    }
    out
}

/// Validate sources, then install what passes; everything else becomes a
/// failure entry with its reason.
fn install_candidates(
    session: &mut Session,
    candidates: Vec<SkillRecord>,
    report: &mut SyncReport,
) {
    let (valid, invalid) = partition_by_source(candidates);
    for record in invalid {
        let reason = format!("invalid source '{}'", record.source);
        report.record_failure(record, reason);
    }
    for record in valid {
        match session.skills.install(&record) {
            Ok(()) => report.installed.push(record),
            Err(error) => report.record_failure(record, error.to_string()),
        }
    }
}

fn remove_candidates(
    session: &mut Session,
    candidates: Vec<SkillRecord>,
    report: &mut SyncReport,
) {
    for record in candidates {
        match session.skills.remove(&record) {
            Ok(()) => report.removed.push(record),
            Err(error) => report.record_failure(record, error.to_string()),
        }
    }
}

fn apply_upload(
    session: &mut Session,
    upload: Option<BackupPayload>,
    report: &mut SyncReport,
) -> Result<()> {
    let Some(payload) = upload else {
        return Ok(());
    };
    let gist_id = with_retry(&session.retry, || {
        session.remote.upload(session.gist_id.as_deref(), &payload)
    })?;
    session.gist_id = Some(gist_id);
    report.uploaded = true;
    Ok(())
}

/// Persist session outcomes: remember the gist id, and advance the
/// last-sync baseline only after a fully-clean run.
fn finish_session(mut session: Session, report: &SyncReport) -> Result<()> {
    session.config.gist_id = session.gist_id.clone();
    if report.is_clean() {
        session.config.last_sync_at = Some(session.now.clone());
    }
    session.config.save()
}

fn finish(report: &SyncReport, common: &CommonArgs) -> i32 {
    match common.format {
        Format::Text => print!("{}", format_text(report)),
        Format::Json => println!("{}", serde_json::to_string_pretty(report).unwrap()),
    }
    i32::from(!report.is_clean())
}
