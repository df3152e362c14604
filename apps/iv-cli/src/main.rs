use clap::{Parser, Subcommand};
use iv_dataset::{Layout, RawTable, SweepTable};
use iv_extract::{DeviceModel, ExtractionEngine, FetDevice, FetModel, TlmModel};
use iv_project::ExtractionConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iv-cli")]
#[command(about = "IV sweep parameter extraction for field-effect transistors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an extraction config file
    Validate {
        /// Path to the config YAML or JSON file
        config_path: PathBuf,
    },
    /// Show how a table's headers resolve to column roles
    Columns {
        /// Comma or tab delimited table
        table_path: PathBuf,
        /// Dataset layout: idvg, idvd or tlm
        #[arg(long, default_value = "idvg")]
        layout: Layout,
    },
    /// Extract FET parameters from a transfer table
    Fet {
        /// Path to the config YAML or JSON file
        config_path: PathBuf,
        /// IdVg table
        idvg: PathBuf,
        /// Optional IdVd table
        #[arg(long)]
        idvd: Option<PathBuf>,
        /// Directory for CSV results (defaults to the config's output.csv_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract contact and sheet resistance from one IdVg table per length
    Tlm {
        /// Path to the config YAML or JSON file
        config_path: PathBuf,
        /// IdVg tables, in the order of tlm.lengths_um
        #[arg(required = true, num_args = 2..)]
        tables: Vec<PathBuf>,
        /// Directory for CSV results (defaults to the config's output.csv_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

type CliResult<T> = Result<T, CliError>;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] iv_project::ProjectError),

    #[error(transparent)]
    Dataset(#[from] iv_dataset::DatasetError),

    #[error(transparent)]
    Extract(#[from] iv_extract::ExtractError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{what}")]
    Usage { what: String },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Columns { table_path, layout } => cmd_columns(&table_path, layout),
        Commands::Fet {
            config_path,
            idvg,
            idvd,
            output,
        } => cmd_fet(&config_path, &idvg, idvd.as_deref(), output.as_deref()),
        Commands::Tlm {
            config_path,
            tables,
            output,
        } => cmd_tlm(&config_path, &tables, output.as_deref()),
    }
}

fn cmd_validate(config_path: &Path) -> CliResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = iv_project::load(config_path)?;
    config.fet_device()?;
    println!("✓ Config is valid");
    Ok(())
}

fn cmd_columns(table_path: &Path, layout: Layout) -> CliResult<()> {
    let raw = RawTable::read_delimited(table_path)?;
    let table = SweepTable::from_raw(layout, &raw)?;

    println!("{} table: {}", layout, table_path.display());
    for &role in layout.roles() {
        match table.binding(role) {
            Some(binding) => println!(
                "  {:<16} '{}' -> {}",
                role.to_string(),
                binding.matched_name,
                binding.headers.join(", ")
            ),
            None => println!("  {:<16} (none)", role.to_string()),
        }
    }
    println!(
        "  {} sets, {} samples, {} sweep direction(s)",
        table.num_sets(),
        table.samples(),
        table.sweep_count()
    );
    let secondary: Vec<String> = table
        .get_secondary_indep_values()
        .iter()
        .map(|q| q.to_string())
        .collect();
    println!("  {}: {}", layout.secondary_independent(), secondary.join(", "));
    for warning in table.warnings() {
        println!("  ! {warning}");
    }
    Ok(())
}

fn cmd_fet(
    config_path: &Path,
    idvg_path: &Path,
    idvd_path: Option<&Path>,
    output: Option<&Path>,
) -> CliResult<()> {
    let config = iv_project::load(config_path)?;
    let device = config.fet_device()?;
    let idvg = read_table(&config, idvg_path, Layout::IdVg)?;
    let idvd = idvd_path
        .map(|path| read_table(&config, path, Layout::IdVd))
        .transpose()?;

    let engine = ExtractionEngine::new(config.extraction_options());
    let results = engine.extract_fet(&device, idvg, idvd)?;

    let out_dir = output_dir(&config, output);
    for result in &results {
        print_fet(&result.model);
        for warning in &result.warnings {
            println!("  ! {warning}");
        }
        if let Some(dir) = &out_dir {
            let path = result.model.write_csv(dir)?;
            println!("✓ Wrote {}", path.display());
        }
    }
    Ok(())
}

fn cmd_tlm(config_path: &Path, table_paths: &[PathBuf], output: Option<&Path>) -> CliResult<()> {
    let config = iv_project::load(config_path)?;
    let devices = tlm_devices(&config, table_paths)?;

    let engine = ExtractionEngine::new(config.extraction_options());
    let result = engine.extract_tlm(&config.name, devices)?;

    for device in &result.devices {
        print_fet(&device.model);
    }
    print_tlm(&result.model);
    for warning in &result.warnings {
        println!("  ! {warning}");
    }

    if let Some(dir) = output_dir(&config, output) {
        for device in &result.devices {
            device.model.write_csv(&dir)?;
        }
        let path = result.model.write_csv(&dir)?;
        println!("✓ Wrote {} and {} device files", path.display(), result.devices.len());
    }
    Ok(())
}

/// Pair each table with the configured length at the same position.
fn tlm_devices(
    config: &ExtractionConfig,
    table_paths: &[PathBuf],
) -> CliResult<Vec<(FetDevice, SweepTable)>> {
    let tlm = config.tlm.as_ref().ok_or_else(|| CliError::Usage {
        what: "config has no tlm section".to_string(),
    })?;
    if tlm.lengths_um.len() != table_paths.len() {
        return Err(CliError::Usage {
            what: format!(
                "{} tables given for {} TLM lengths",
                table_paths.len(),
                tlm.lengths_um.len()
            ),
        });
    }

    tlm.lengths_um
        .iter()
        .zip(table_paths)
        .map(|(&length, path)| {
            let name = format!("{}_L{}", config.name, length);
            let device = config.fet_device_with_length(&name, length)?;
            let table = read_table(config, path, Layout::IdVg)?;
            Ok((device, table))
        })
        .collect()
}

fn read_table(config: &ExtractionConfig, path: &Path, layout: Layout) -> CliResult<SweepTable> {
    info!(path = %path.display(), %layout, "reading table");
    let raw = RawTable::read_delimited(path)?;
    Ok(config.table_builder(layout).build(&raw)?)
}

fn output_dir(config: &ExtractionConfig, output: Option<&Path>) -> Option<PathBuf> {
    output
        .map(Path::to_path_buf)
        .or_else(|| config.output.as_ref().map(|o| o.csv_dir.clone()))
}

fn print_fet(model: &FetModel) {
    println!("\n{} ({}-type):", model.name, model.polarity);
    for prop in model.properties() {
        println!("  {prop}");
    }
}

fn print_tlm(model: &TlmModel) {
    println!("\nTLM {} at Vd = {}:", model.name, model.drain_voltage);
    println!("  {}", model.contact_resistance);
    println!("  {}", model.sheet_resistance);
    println!("  {} matched points", model.points.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use iv_project::{DeviceDef, OxideDef, PolarityDef, TlmDef};

    fn config(tlm: Option<TlmDef>) -> ExtractionConfig {
        ExtractionConfig {
            version: 1,
            name: "chip".to_string(),
            device: DeviceDef {
                polarity: PolarityDef::N,
                length_um: 1.0,
                width_um: 1.0,
                oxide: OxideDef {
                    relative_permittivity: 3.9,
                    thickness_nm: 90.0,
                },
            },
            columns: Default::default(),
            secondary_values: None,
            tlm,
            output: None,
        }
    }

    #[test]
    fn tlm_requires_section_and_matching_count() {
        let paths = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];
        assert!(matches!(
            tlm_devices(&config(None), &paths),
            Err(CliError::Usage { .. })
        ));

        let tlm = TlmDef {
            lengths_um: vec![1.0, 2.0, 4.0],
            drain_voltage: None,
            max_density_spread: 0.1,
        };
        assert!(matches!(
            tlm_devices(&config(Some(tlm)), &paths),
            Err(CliError::Usage { .. })
        ));
    }

    #[test]
    fn output_flag_overrides_config() {
        let mut cfg = config(None);
        assert_eq!(output_dir(&cfg, None), None);
        cfg.output = Some(iv_project::OutputDef {
            csv_dir: PathBuf::from("cfg_out"),
        });
        assert_eq!(output_dir(&cfg, None), Some(PathBuf::from("cfg_out")));
        assert_eq!(
            output_dir(&cfg, Some(Path::new("cli_out"))),
            Some(PathBuf::from("cli_out"))
        );
    }

    #[test]
    fn cli_parses_tlm_tables() {
        let cli = Cli::parse_from(["iv-cli", "tlm", "cfg.yaml", "a.csv", "b.csv", "-o", "out"]);
        match cli.command {
            Commands::Tlm { tables, output, .. } => {
                assert_eq!(tables.len(), 2);
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected tlm command"),
        }
    }
}
