use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use fhirmap_cli::{AnalysisReport, DiscoveryService};
use fhirmap_map::ConfigurationRepository;
use fhirmap_model::{
    DiscoveryThresholds, EngineOptions, IssueSeverity, MappingConfiguration, MappingReport,
    PathPolicy, Resource, SourceRecord,
};
use fhirmap_standards::{pattern_resource_types, patterns_for};
use serde_json::{Map, Value};
use tracing::{info, info_span, warn};

use crate::cli::{
    AnalyzeArgs, ApplyArgs, ConfigArgs, ConfigureArgs, EngineArgs, GenerateArgs, MapperArgs,
    PatternsArgs, PreviewArgs, ValidateArgs,
};
use crate::summary::{
    issues_table, mappings_table, outcomes_table, patterns_table, stored_table,
    suggestions_table, totals_line, value_hints_table,
};

/// Builds the service from the engine flags, opening the configuration
/// directory when one is given.
pub fn build_service(args: &EngineArgs) -> Result<DiscoveryService> {
    let mut thresholds = DiscoveryThresholds::default();
    if let Some(confidence) = args.unknown_confidence {
        ensure_score("--unknown-confidence", confidence)?;
        thresholds = thresholds.with_unknown_confidence(confidence);
    }
    if let Some(cutoff) = args.noise_cutoff {
        ensure_score("--noise-cutoff", cutoff)?;
        thresholds = thresholds.with_noise_cutoff(cutoff);
    }
    let policy = if args.strict_paths {
        PathPolicy::Strict
    } else {
        PathPolicy::Lenient
    };
    let options = EngineOptions::new()
        .with_path_policy(policy)
        .with_thresholds(thresholds);

    let mut service = DiscoveryService::with_options(options);
    if let Some(dir) = &args.config_dir {
        service = service.with_repository(ConfigurationRepository::new(dir)?);
    }
    Ok(service)
}

fn ensure_score(flag: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        bail!("{flag} must be between 0 and 1, got {value}");
    }
    Ok(())
}

pub fn run_analyze(service: &DiscoveryService, args: &AnalyzeArgs) -> Result<bool> {
    let resource_type = args.record.resource_type.as_str();
    let record = first_record(&args.record.input)?;
    let analysis = service.analyze(&record, resource_type);

    if args.json {
        println!("{}", analysis.to_json()?);
        return Ok(true);
    }

    println!("Resource type: {resource_type}");
    println!("{}", mappings_table(&analysis.mappings));
    if !analysis.value_mappings.is_empty() {
        println!();
        println!("Value mappings:");
        println!("{}", value_hints_table(&analysis.value_mappings));
    }
    Ok(true)
}

pub fn run_generate(service: &DiscoveryService, args: &GenerateArgs) -> Result<bool> {
    let resource_type = args.record.resource_type.as_str();
    let record = first_record(&args.record.input)?;
    let configuration =
        service.generate_configuration(&record, resource_type, args.profile.as_deref());
    emit_configuration(service, &configuration, args.output.as_deref(), args.save)
}

pub fn run_configure(service: &DiscoveryService, args: &ConfigureArgs) -> Result<bool> {
    let text = read_input(&args.input)?;
    let analysis = AnalysisReport::from_json(&text)
        .with_context(|| format!("parse analysis from {}", args.input.display()))?;
    let configuration = service.configuration_from_analysis(
        &analysis,
        args.resource_type.as_deref(),
        args.profile.as_deref(),
    )?;
    emit_configuration(service, &configuration, args.output.as_deref(), args.save)
}

pub fn run_save(service: &DiscoveryService, args: &ConfigArgs) -> Result<bool> {
    if service.repository().is_none() {
        bail!("--config-dir is required to store configurations");
    }
    let configuration = read_configuration(&args.config)?;
    let path = service.save_configuration(&configuration)?;
    println!(
        "Saved {} configuration: {}",
        configuration.resource_type,
        path.display()
    );
    Ok(true)
}

/// Writes a built configuration, optionally stores it, and reports gaps.
fn emit_configuration(
    service: &DiscoveryService,
    configuration: &MappingConfiguration,
    output: Option<&Path>,
    save: bool,
) -> Result<bool> {
    if save {
        let path = service.save_configuration(configuration)?;
        eprintln!("Saved configuration: {}", path.display());
    }
    write_output(output, &configuration.to_json()?)?;

    let suggestions = service.suggest_improvements(configuration);
    if !suggestions.is_empty() {
        eprintln!("{}", suggestions_table(&suggestions));
    }
    Ok(true)
}

pub fn run_apply(service: &DiscoveryService, args: &ApplyArgs) -> Result<bool> {
    let records = read_records(&args.record.input)?;
    let mut resource_type = args.record.resource_type.clone();

    if let Some(path) = &args.config {
        let configuration = read_configuration(path)?;
        if configuration.resource_type != resource_type {
            warn!(
                requested = %resource_type,
                configured = %configuration.resource_type,
                "mapping to the configuration's resource type"
            );
            resource_type.clone_from(&configuration.resource_type);
        }
        service.register_configuration(configuration)?;
    } else if service.repository().is_some()
        && service.load_configuration(&resource_type)?.is_some()
    {
        info!(resource_type = %resource_type, "using stored configuration");
    }

    let span = info_span!("apply", resource_type = %resource_type, records = records.len());
    let _guard = span.enter();
    let reports = records
        .iter()
        .map(|record| service.map_to_fhir(record, &resource_type))
        .collect::<Result<Vec<_>>>()?;

    let (mut applied, mut skipped, mut failed) = (0, 0, 0);
    for report in &reports {
        applied += report.applied_count();
        skipped += report.skipped_count();
        failed += report.failed_count();
    }
    if let [report] = reports.as_slice() {
        eprintln!("{}", outcomes_table(&report.outcomes));
    }
    eprintln!("{}", totals_line(applied, skipped, failed));

    write_output(args.output.as_deref(), &resources_json(&reports)?)?;
    Ok(failed == 0)
}

pub fn run_preview(service: &DiscoveryService, args: &PreviewArgs) -> Result<bool> {
    let record = first_record(&args.input)?;
    let configuration = read_configuration(&args.config)?;
    let preview = service.preview(&record, &configuration)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(preview.validation.is_valid);
    }

    println!("{}", outcomes_table(&preview.outcomes));
    if preview.validation.issues.is_empty() {
        println!("Validation: passed");
    } else {
        println!("Validation:");
        println!("{}", issues_table(&preview.validation.issues));
    }
    println!("{}", preview.resource.to_json_pretty()?);
    Ok(preview.validation.is_valid)
}

pub fn run_validate(service: &DiscoveryService, args: &ValidateArgs) -> Result<bool> {
    let text = read_input(&args.input)?;
    let resource: Resource = serde_json::from_str(&text)
        .with_context(|| format!("parse resource from {}", args.input.display()))?;
    let result = service.validate_resource(&resource);
    if result.issues.is_empty() {
        println!("{}: valid", resource.resource_type());
    } else {
        println!("{}", issues_table(&result.issues));
    }
    Ok(result.is_valid)
}

pub fn run_suggest(service: &DiscoveryService, args: &ConfigArgs) -> Result<bool> {
    let configuration = read_configuration(&args.config)?;
    let suggestions = service.suggest_improvements(&configuration);
    if suggestions.is_empty() {
        println!(
            "{}: every checklist target is mapped",
            configuration.resource_type
        );
        return Ok(true);
    }
    println!("{}", suggestions_table(&suggestions));
    Ok(!suggestions
        .iter()
        .any(|suggestion| suggestion.severity == IssueSeverity::Error))
}

pub fn run_mapper(service: &DiscoveryService, args: &MapperArgs) -> Result<bool> {
    let configuration = read_configuration(&args.config.config)?;
    let source = service.generate_mapper_class(&configuration)?;
    write_output(args.output.as_deref(), &source)?;
    Ok(true)
}

pub fn run_patterns(args: &PatternsArgs) -> Result<bool> {
    let resource_types: Vec<&str> = match &args.resource_type {
        Some(requested) => {
            let Some(known) = pattern_resource_types()
                .iter()
                .find(|name| **name == requested.as_str())
            else {
                bail!(
                    "no patterns for {requested}; known resource types: {}",
                    pattern_resource_types().join(", ")
                );
            };
            vec![*known]
        }
        None => pattern_resource_types().to_vec(),
    };
    let rules: Vec<_> = resource_types
        .iter()
        .flat_map(|resource_type| {
            patterns_for(resource_type)
                .iter()
                .map(move |rule| (*resource_type, rule))
        })
        .collect();
    println!("{}", patterns_table(&rules));
    Ok(true)
}

pub fn run_configs(service: &DiscoveryService) -> Result<bool> {
    let Some(repository) = service.repository() else {
        bail!("--config-dir is required to list stored configurations");
    };
    let stored = repository.list()?;
    if stored.is_empty() {
        println!(
            "No configurations in {}",
            repository.base_dir().display()
        );
    } else {
        println!("{}", stored_table(&stored));
    }
    Ok(true)
}

/// Reads a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Records from a JSON object or an array of JSON objects.
pub fn read_records(path: &Path) -> Result<Vec<SourceRecord>> {
    let text = read_input(path)?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("parse records from {}", path.display()))?;
    match value {
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item)
                    .with_context(|| format!("record {index} in {} is not an object", path.display()))
            })
            .collect(),
        _ => bail!(
            "{} must hold a JSON object or an array of objects",
            path.display()
        ),
    }
}

fn first_record(path: &Path) -> Result<SourceRecord> {
    read_records(path)?
        .into_iter()
        .next()
        .with_context(|| format!("no records in {}", path.display()))
}

fn read_configuration(path: &Path) -> Result<MappingConfiguration> {
    let text = read_input(path)?;
    MappingConfiguration::from_json(&text)
        .with_context(|| format!("parse configuration from {}", path.display()))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// One resource as is; several as a `collection` Bundle.
fn resources_json(reports: &[MappingReport]) -> Result<String> {
    if let [report] = reports {
        return Ok(report.resource.to_json_pretty()?);
    }
    let entries = reports
        .iter()
        .map(|report| {
            let mut entry = Map::new();
            entry.insert("resource".to_string(), report.resource.to_json()?);
            Ok(Value::Object(entry))
        })
        .collect::<serde_json::Result<Vec<_>>>()?;
    let mut bundle = Map::new();
    bundle.insert("resourceType".to_string(), Value::from("Bundle"));
    bundle.insert("type".to_string(), Value::from("collection"));
    bundle.insert("entry".to_string(), Value::Array(entries));
    Ok(serde_json::to_string_pretty(&bundle)?)
}
