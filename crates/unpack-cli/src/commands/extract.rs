//! Extract command implementation.

use crate::cli::Cli;
use crate::error::add_source_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use log::debug;
use unpack_core::ExtractionOptions;
use unpack_core::SourceResolver;
use unpack_core::unpack;

pub fn execute(args: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let resolver = build_resolver(args);
    let options = build_options(args);
    debug!("extracting {} into {}", args.source, args.dest.display());

    let report = add_source_context(
        unpack(
            &args.source,
            args.from_bundle.as_deref(),
            &resolver,
            &args.dest,
            &options,
        ),
        &args.source,
    )?;

    formatter.format_extraction_result(&report)?;

    if report.unsupported_entries > 0 {
        formatter.format_warning(&format!(
            "{} entries of an unsupported kind (links, devices) were not extracted",
            report.unsupported_entries
        ));
    }

    Ok(())
}

fn build_resolver(args: &Cli) -> SourceResolver {
    let resolver = args
        .cache_dir
        .as_ref()
        .map_or_else(SourceResolver::default, SourceResolver::new);

    args.bundles
        .iter()
        .fold(resolver, |resolver, (name, root)| {
            resolver.with_bundle(name.clone(), root.clone())
        })
}

fn build_options(args: &Cli) -> ExtractionOptions {
    ExtractionOptions::default()
        .with_owner(args.owner.clone())
        .with_group(args.group.clone())
        .with_file_mode(args.mode)
        .with_dir_mode(args.dir_mode)
        .with_includes(args.include.clone())
        .with_excludes(args.exclude.clone())
        .with_strip_components(args.strip)
        .with_same_owner(!args.no_same_owner)
}
