use anyhow::{anyhow, bail, Context};
use clap::ArgMatches;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use wfs_engine::{CatalogManifest, Lifecycle, LoadedCatalog, StatusEngine, TypeCatalog, WorkItem};
use wfs_model::{EntityType, Role, Status, WorkItemCategory};

/// Work item assembled from command line arguments
struct CliItem {
    category: WorkItemCategory,
    lifecycle: Lifecycle,
}

impl WorkItem for CliItem {
    fn category(&self) -> WorkItemCategory {
        self.category
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }
}

#[derive(Debug, Serialize)]
struct CheckReport {
    company: Option<String>,
    statuses: usize,
    workflows: Vec<WorkflowSummary>,
    problems: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WorkflowSummary {
    name: String,
    rules: usize,
    initial: Vec<String>,
    terminal: Vec<String>,
}

#[derive(Debug, Serialize)]
struct InitReport<'a> {
    entity_type: &'a str,
    status: &'a Status,
}

fn load(args: &ArgMatches) -> anyhow::Result<(CatalogManifest, LoadedCatalog)> {
    let path = args
        .get_one::<PathBuf>("manifest")
        .ok_or_else(|| anyhow!("missing manifest path"))?;
    let manifest = CatalogManifest::load(path)?;
    let loaded = manifest
        .into_registry()
        .with_context(|| format!("invalid catalog manifest {}", path.display()))?;
    Ok((manifest, loaded))
}

fn category(args: &ArgMatches) -> anyhow::Result<WorkItemCategory> {
    let raw = args.get_one::<String>("category").map_or("issue", String::as_str);
    Ok(raw.parse()?)
}

fn role(args: &ArgMatches) -> Option<Role> {
    args.get_one::<String>("role").map(|r| Role::new(r.as_str()))
}

fn entity_type(args: &ArgMatches, catalog: &LoadedCatalog) -> anyhow::Result<EntityType> {
    let category = category(args)?;
    match args.get_one::<String>("type") {
        Some(name) => catalog
            .registry
            .find_entity_type(catalog.company, category, name)
            .ok_or_else(|| anyhow!("no {category} type named '{name}'")),
        None => catalog
            .registry
            .list_types_for_company(catalog.company, category)
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no {category} types configured")),
    }
}

fn status(catalog: &LoadedCatalog, name: &str) -> anyhow::Result<Status> {
    catalog
        .registry
        .find_status(catalog.company, name)
        .ok_or_else(|| anyhow!("unknown status '{name}'"))
}

/// Item of the requested type, in `current` or uninitialized
fn item(args: &ArgMatches, catalog: &LoadedCatalog, current: Option<&String>) -> anyhow::Result<CliItem> {
    let entity_type = entity_type(args, catalog)?;
    let mut lifecycle = Lifecycle::new();
    if let Some(name) = current {
        lifecycle.set_status(Some(status(catalog, name)?))?;
    }
    lifecycle.set_entity_type(entity_type);
    Ok(CliItem {
        category: category(args)?,
        lifecycle,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn check(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let (manifest, loaded) = load(args)?;
    let workflows = loaded.registry.workflows_for_company(loaded.company);

    let mut problems = Vec::new();
    let mut summaries = Vec::with_capacity(workflows.len());
    for workflow in &workflows {
        if let Err(e) = workflow.validate() {
            problems.push(e.to_string());
        }
        summaries.push(WorkflowSummary {
            name: workflow.name().to_string(),
            rules: workflow.len(),
            initial: workflow.initial_rules().map(|r| r.to.name.clone()).collect(),
            terminal: workflow.terminal_statuses().iter().map(|s| s.name.clone()).collect(),
        });
    }

    let statuses = loaded.registry.statuses_for_company(loaded.company);
    for status in &statuses {
        if !workflows.iter().any(|w| w.references_status(status.id)) {
            tracing::warn!(status = %status.name, "status is not used by any workflow");
        }
    }

    let report = CheckReport {
        company: manifest.company,
        statuses: statuses.len(),
        workflows: summaries,
        problems,
    };

    if args.get_flag("json") {
        print_json(&report)?;
    } else {
        for summary in &report.workflows {
            println!(
                "{}: {} rules, initial [{}], terminal [{}]",
                summary.name,
                summary.rules,
                summary.initial.join(", "),
                summary.terminal.join(", ")
            );
        }
        for problem in &report.problems {
            println!("problem: {problem}");
        }
        if report.problems.is_empty() {
            println!("OK");
        }
    }

    Ok(if report.problems.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub(crate) fn init(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let (_, loaded) = load(args)?;
    let engine = StatusEngine::new().with_config(loaded.engine);
    let mut item = CliItem {
        category: category(args)?,
        lifecycle: Lifecycle::new(),
    };

    let status = engine.initialize(&mut item, loaded.company, &loaded.registry)?;
    let entity_type = item
        .entity_type()
        .map_or("", |t| t.name.as_str());

    if args.get_flag("json") {
        print_json(&InitReport {
            entity_type,
            status: &status,
        })?;
    } else {
        println!("{entity_type}: {}", status.name);
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn next(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let (_, loaded) = load(args)?;
    let engine = StatusEngine::new().with_config(loaded.engine);
    let item = item(args, &loaded, args.get_one::<String>("status"))?;
    let role = role(args);

    let statuses = if args.get_flag("picker") {
        engine.selectable_statuses(&item, role.as_ref())?
    } else {
        engine.valid_next_statuses(&item, role.as_ref())?
    };

    if args.get_flag("json") {
        print_json(&statuses)?;
    } else {
        for status in &statuses {
            println!("{}", status.name);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn transition(args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let (_, loaded) = load(args)?;
    let engine = StatusEngine::new().with_config(loaded.engine);
    let item = item(args, &loaded, args.get_one::<String>("from"))?;
    let Some(to) = args.get_one::<String>("to") else {
        bail!("missing target status");
    };
    let requested = status(&loaded, to)?;

    if engine.validate_transition(&item, &requested, role(args).as_ref())? {
        println!("allowed");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("denied");
        Ok(ExitCode::FAILURE)
    }
}
