//! StudyGate CLI - Main entry point for CLI binary
//!
//! This binary provides the `studygate` tool for inspecting the policy
//! catalog, checking decisions, and serving the decision API.

use studygate_lib::engine::{
    api::{self, ApiState},
    audit::{AuditEntry, AuditLog},
    cli::{formatter::{pad, CliFormatter}, Cli, Commands, OutputFormat},
    config::{Config, CONFIG_FILE},
    rbac::{permissions_for, Claims, Decision, Enforcer, OwnableResource, ResourceRef, Role},
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("studygate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        CliFormatter::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = cli.get_config_dir();
    let json_output = cli.format == OutputFormat::Json;

    match cli.command {
        Commands::Init { force } => {
            cmd_init(&config_dir, force, json_output)?;
        }
        Commands::Policies => {
            cmd_policies(&config_dir, json_output)?;
        }
        Commands::Permissions { role } => {
            cmd_permissions(&role, json_output)?;
        }
        Commands::Check { policy, role, user_id, owner_id, created_by, resource } => {
            let target = if owner_id.is_some() || created_by.is_some() || resource {
                Some(ResourceRef { owner_id, created_by })
            } else {
                None
            };
            let decision = cmd_check(
                &config_dir,
                &policy,
                role.as_deref(),
                user_id.as_deref(),
                target,
                json_output,
            )?;
            if !decision.is_allowed() {
                std::process::exit(2);
            }
        }
        Commands::Serve { port, host } => {
            cmd_serve(&config_dir, host, port)?;
        }
        Commands::Audit { policy, denied } => {
            cmd_audit(&config_dir, policy.as_deref(), denied, json_output)?;
        }
    }

    Ok(())
}

fn cmd_init(config_dir: &Path, force: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(format!("Config already exists: {}", config_path.display()).into());
    }

    std::fs::create_dir_all(config_dir)?;
    Config::default().save(config_dir)?;

    if json {
        println!("{}", serde_json::json!({
            "success": true,
            "config": config_path.display().to_string(),
        }));
    } else {
        CliFormatter::success(&format!("Wrote {}", config_path.display()));
    }
    Ok(())
}

fn cmd_policies(config_dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config_dir)?;
    let enforcer = Enforcer::from_config(&config)?;
    let registry = enforcer.registry();

    if json {
        let policies: Vec<_> = registry
            .iter()
            .map(|(name, req)| serde_json::json!({ "name": name, "requirement": req }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&policies)?);
    } else {
        CliFormatter::header(&format!("Policies ({})", registry.len()));
        let width = registry.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, requirement) in registry.iter() {
            CliFormatter::item(&format!("{}  {}", pad(name, width), requirement));
        }
    }
    Ok(())
}

fn cmd_permissions(role: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let role: Role = role.parse()?;
    let permissions = permissions_for(role);

    if json {
        println!("{}", serde_json::json!({
            "role": role,
            "permissions": permissions,
        }));
    } else {
        CliFormatter::header(&format!("{} ({} permissions)", role, permissions.len()));
        CliFormatter::table_header(&["Permission", "Group"]);
        for permission in permissions {
            let group = serde_json::to_value(permission.group())?;
            let name = pad(permission.name(), 24);
            CliFormatter::table_row(&[name.as_str(), group.as_str().unwrap_or_default()]);
        }
    }
    Ok(())
}

fn cmd_check(
    config_dir: &Path,
    policy: &str,
    role: Option<&str>,
    user_id: Option<&str>,
    resource: Option<ResourceRef>,
    json: bool,
) -> Result<Decision, Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config_dir)?;
    let enforcer = Enforcer::from_config(&config)?;

    let keys = enforcer.claim_keys();
    let mut claims = Claims::new();
    if let Some(user_id) = user_id {
        claims = claims.with(&keys.identity_key, user_id);
    }
    if let Some(role) = role {
        claims = claims.with(&keys.role_key, role);
    }

    let target = resource.as_ref().map(|r| r as &dyn OwnableResource);
    let decision = enforcer.evaluate_with_resource(&claims, policy, target)?;

    if config.audit.enabled {
        let log = AuditLog::new(&config.audit_dir(config_dir))?;
        let mut entry = AuditEntry::new(policy, decision).with_claims(&claims, keys);
        if let Some(resource) = &resource {
            entry = entry.with_resource(serde_json::to_value(resource)?);
        }
        log.append(&entry)?;
    }

    if json {
        println!("{}", serde_json::json!({
            "policy": policy,
            "allowed": decision.is_allowed(),
            "decision": decision,
        }));
    } else {
        CliFormatter::decision(policy, &decision);
    }
    Ok(decision)
}

#[tokio::main]
async fn cmd_serve(
    config_dir: &PathBuf,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config_dir)?;
    let enforcer = Enforcer::from_config(&config)?;

    let mut state = ApiState::new(enforcer);
    if config.audit.enabled {
        state = state.with_audit(AuditLog::new(&config.audit_dir(config_dir))?);
    }

    let host = host.unwrap_or(config.api.host.clone());
    let port = port.unwrap_or(config.api.port);

    CliFormatter::header("StudyGate Decision API");
    CliFormatter::kv("Listening", &format!("http://{}:{}", host, port));
    CliFormatter::kv(
        "Unowned resources",
        &format!("{:?}", config.enforcement.unowned_resource),
    );
    CliFormatter::info("Press Ctrl+C to stop");

    api::serve(state, &host, port).await?;
    Ok(())
}

fn cmd_audit(
    config_dir: &Path,
    policy: Option<&str>,
    denied: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config_dir)?;
    let log = AuditLog::new(&config.audit_dir(config_dir))?;

    let entries: Vec<AuditEntry> = match (policy, denied) {
        (Some(policy), true) => log
            .query_denied()?
            .into_iter()
            .filter(|e| e.policy == policy)
            .collect(),
        (Some(policy), false) => log.query_by_policy(policy)?,
        (None, true) => log.query_denied()?,
        (None, false) => log.query_all()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        CliFormatter::info(&format!("No recorded decisions in {}", log.path().display()));
        return Ok(());
    }

    CliFormatter::header(&format!("Decisions ({})", entries.len()));
    CliFormatter::table_header(&["Time", "Actor", "Role", "Policy", "Decision"]);
    for entry in &entries {
        let time = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let decision = entry.decision.to_string();
        CliFormatter::table_row(&[
            time.as_str(),
            entry.actor.as_deref().unwrap_or("-"),
            entry.role.as_deref().unwrap_or("-"),
            entry.policy.as_str(),
            decision.as_str(),
        ]);
    }
    Ok(())
}
